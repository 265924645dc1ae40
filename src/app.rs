use crate::config;
use crate::push as push_service;
use crate::state;
use crate::types::push::{
    ALERT_PATH, FLUSH_PATH, PREFS_PATH, PUBLIC_KEY_PATH, SEND_TEST_PATH, SUBSCRIBE_PATH,
};

use axum::Router;
use axum::routing::get;
use axum::routing::post;

mod alerts;
mod push;

pub fn app(config: config::AppConfig) -> Router {
    match push_service::load_vapid_config(&config) {
        push_service::VapidConfigStatus::Ready(_) => {}
        push_service::VapidConfigStatus::Incomplete => {
            tracing::warn!("push notifications disabled: incomplete VAPID configuration");
        }
        push_service::VapidConfigStatus::Missing => {
            tracing::warn!("push notifications disabled: no VAPID configuration");
        }
    }
    router(state::AppState::new(config))
}

pub(crate) fn router(state: state::AppState) -> Router {
    Router::new()
        .route(PUBLIC_KEY_PATH, get(push::push_public_key))
        .route(SUBSCRIBE_PATH, post(push::push_subscribe))
        .route(SEND_TEST_PATH, post(push::push_send_test))
        .route(ALERT_PATH, post(alerts::push_alert))
        .route(FLUSH_PATH, post(alerts::push_flush))
        .route(PREFS_PATH, get(alerts::get_prefs).post(alerts::set_prefs))
        .route("/health", get(health))
        .with_state(state)
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
