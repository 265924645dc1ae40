use crate::adapters::WebPushSender;
use crate::push as push_service;
use crate::state;
use crate::types::push::{
    PublicKeyResponse, PushSubscription, SendTestResponse, SubscribeResponse, SubscriptionKeys,
};

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: &'static str,
}

pub(super) type HandlerError = (StatusCode, Json<ErrorResponse>);

pub(super) fn error(status: StatusCode, message: &'static str) -> HandlerError {
    (status, Json(ErrorResponse { error: message }))
}

pub(super) fn not_configured() -> HandlerError {
    error(
        StatusCode::SERVICE_UNAVAILABLE,
        "Push notifications are not configured.",
    )
}

pub(crate) async fn push_public_key(
    State(state): State<state::AppState>,
) -> Result<Json<PublicKeyResponse>, HandlerError> {
    let push_service::VapidConfigStatus::Ready(vapid) =
        push_service::load_vapid_config(&state.config)
    else {
        return Err(not_configured());
    };

    Ok(Json(PublicKeyResponse {
        vapid_public_key: vapid.public_key,
    }))
}

/// Browser subscription JSON with every field optional, so incomplete
/// payloads get a 400 instead of a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscribeRequest {
    #[serde(default)]
    pub(crate) endpoint: String,
    #[serde(default)]
    pub(crate) expiration_time: Option<u64>,
    #[serde(default)]
    pub(crate) keys: Option<SubscribeKeys>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SubscribeKeys {
    #[serde(default)]
    pub(crate) p256dh: String,
    #[serde(default)]
    pub(crate) auth: String,
}

impl SubscribeRequest {
    fn into_subscription(self) -> Option<PushSubscription> {
        let keys = self.keys?;
        let endpoint = self.endpoint.trim();
        let p256dh = keys.p256dh.trim();
        let auth = keys.auth.trim();
        if endpoint.is_empty() || p256dh.is_empty() || auth.is_empty() {
            return None;
        }
        Some(PushSubscription {
            endpoint: endpoint.to_string(),
            expiration_time: self.expiration_time,
            keys: SubscriptionKeys {
                p256dh: p256dh.to_string(),
                auth: auth.to_string(),
            },
        })
    }
}

pub(crate) async fn push_subscribe(
    State(state): State<state::AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<SubscribeResponse>, HandlerError> {
    let subscription = request.into_subscription().ok_or_else(|| {
        error(
            StatusCode::BAD_REQUEST,
            "endpoint, keys.p256dh, and keys.auth are required.",
        )
    })?;

    let endpoint = subscription.endpoint.clone();
    let outcome = state
        .subscriptions
        .lock()
        .expect("subscriptions lock")
        .register(subscription, OffsetDateTime::now_utc());
    tracing::info!(%endpoint, ?outcome, "push subscription received");

    Ok(Json(SubscribeResponse { ok: true }))
}

pub(crate) async fn push_send_test(
    State(state): State<state::AppState>,
) -> Result<Json<SendTestResponse>, HandlerError> {
    let push_service::VapidConfigStatus::Ready(vapid) =
        push_service::load_vapid_config(&state.config)
    else {
        return Err(not_configured());
    };

    let subscription = state
        .subscriptions
        .lock()
        .expect("subscriptions lock")
        .latest()
        .map(|stored| stored.subscription.clone())
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "No subscription registered."))?;

    let sender = WebPushSender::new(vapid).map_err(|err| {
        tracing::error!(%err, "failed to init web-push");
        error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to initialize push sender.",
        )
    })?;

    let payload = push_service::test_payload(&state.config.app_name);
    let sent = push_service::send_payload(&sender, &subscription, &payload).await;
    Ok(Json(SendTestResponse { sent }))
}
