use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::push::{HandlerError, error, not_configured};
use crate::adapters::{UtcTimeProvider, WebPushSender};
use crate::config::{DEFAULT_COOLDOWN_MINUTES, DispatchPolicy, QuietHours};
use crate::push as push_service;
use crate::state;
use crate::types::push::{DispatchPrefs, PushPayload};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AlertRequest {
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) body: String,
    #[serde(default)]
    pub(crate) url: Option<String>,
}

impl AlertRequest {
    fn into_payload(self) -> Option<PushPayload> {
        let title = self.title.trim();
        let body = self.body.trim();
        if title.is_empty() || body.is_empty() {
            return None;
        }
        let url = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(push_service::DEFAULT_ALERT_URL);
        Some(PushPayload {
            title: Some(title.to_string()),
            body: Some(body.to_string()),
            url: Some(url.to_string()),
        })
    }
}

fn dispatcher(
    state: &state::AppState,
) -> Result<push_service::Dispatcher<UtcTimeProvider, WebPushSender>, HandlerError> {
    let push_service::VapidConfigStatus::Ready(vapid) =
        push_service::load_vapid_config(&state.config)
    else {
        return Err(not_configured());
    };
    let sender = WebPushSender::new(vapid).map_err(|err| {
        tracing::error!(%err, "failed to init web-push");
        error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to initialize push sender.",
        )
    })?;
    Ok(push_service::Dispatcher::new(
        UtcTimeProvider,
        sender,
        state.config.app_name.clone(),
    ))
}

pub(crate) async fn push_alert(
    State(state): State<state::AppState>,
    Json(request): Json<AlertRequest>,
) -> Result<Json<push_service::DispatchReport>, HandlerError> {
    let alert = request
        .into_payload()
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "title and body are required."))?;
    let dispatcher = dispatcher(&state)?;
    let policy = state.policy();
    let report = dispatcher
        .queue_or_push(&state.subscriptions, &policy, alert)
        .await;
    tracing::info!(?report, "alert dispatched");
    Ok(Json(report))
}

pub(crate) async fn push_flush(
    State(state): State<state::AppState>,
) -> Result<Json<push_service::DispatchReport>, HandlerError> {
    let dispatcher = dispatcher(&state)?;
    let policy = state.policy();
    let report = dispatcher.flush_if_needed(&state.subscriptions, &policy).await;
    tracing::info!(?report, "alert queue flushed");
    Ok(Json(report))
}

fn prefs_of(policy: &DispatchPolicy) -> DispatchPrefs {
    DispatchPrefs {
        cooldown_min: policy.cooldown.as_secs() / 60,
        quiet_hours: policy
            .quiet_hours
            .map(|quiet| quiet.to_string())
            .unwrap_or_default(),
        push_enabled: policy.enabled,
    }
}

pub(crate) async fn get_prefs(State(state): State<state::AppState>) -> Json<DispatchPrefs> {
    Json(prefs_of(&state.policy()))
}

fn default_cooldown() -> i64 {
    DEFAULT_COOLDOWN_MINUTES as i64
}

fn default_enabled() -> bool {
    true
}

/// Omitted fields reset to their defaults. Negative cooldowns count as zero.
#[derive(Debug, Deserialize)]
pub(crate) struct PrefsRequest {
    #[serde(default = "default_cooldown")]
    pub(crate) cooldown_min: i64,
    #[serde(default)]
    pub(crate) quiet_hours: String,
    #[serde(default = "default_enabled")]
    pub(crate) push_enabled: bool,
}

impl PrefsRequest {
    fn into_policy(self) -> Option<DispatchPolicy> {
        let quiet = self.quiet_hours.trim();
        let quiet_hours = if quiet.is_empty() {
            None
        } else {
            Some(QuietHours::parse(quiet)?)
        };
        let minutes = u64::try_from(self.cooldown_min).unwrap_or(0);
        Some(DispatchPolicy {
            enabled: self.push_enabled,
            cooldown: Duration::from_secs(minutes.saturating_mul(60)),
            quiet_hours,
        })
    }
}

pub(crate) async fn set_prefs(
    State(state): State<state::AppState>,
    Json(request): Json<PrefsRequest>,
) -> Result<Json<DispatchPrefs>, HandlerError> {
    let policy = request.into_policy().ok_or_else(|| {
        error(
            StatusCode::BAD_REQUEST,
            "quiet_hours must be two hours like 22-7.",
        )
    })?;
    let prefs = prefs_of(&policy);
    *state.policy.lock().expect("policy lock") = policy;
    tracing::info!(?prefs, "dispatch preferences updated");
    Ok(Json(prefs))
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[test]
    fn into_payload__should_require_title_and_body() {
        // Given
        let missing_body = AlertRequest {
            title: "Phishing".to_string(),
            ..Default::default()
        };
        let without_url = AlertRequest {
            title: " Phishing ".to_string(),
            body: "Suspicious sender".to_string(),
            url: Some(" ".to_string()),
        };

        // Then
        assert!(missing_body.into_payload().is_none());
        let payload = without_url.into_payload().expect("payload");
        assert_eq!(payload.title.as_deref(), Some("Phishing"));
        assert_eq!(payload.url.as_deref(), Some(push_service::DEFAULT_ALERT_URL));
    }

    #[test]
    fn into_policy__should_clamp_cooldown_and_parse_quiet_hours() {
        // Given
        let request: PrefsRequest =
            serde_json::from_str(r#"{"cooldown_min":-5,"quiet_hours":"22-7"}"#).expect("parse");

        // When
        let policy = request.into_policy().expect("policy");

        // Then
        assert_eq!(policy.cooldown, Duration::ZERO);
        assert_eq!(policy.quiet_hours, Some(QuietHours { start: 22, end: 7 }));
        assert!(policy.enabled);
    }

    #[test]
    fn into_policy__should_reject_malformed_quiet_hours() {
        // Given
        let request: PrefsRequest =
            serde_json::from_str(r#"{"quiet_hours":"late"}"#).expect("parse");

        // Then
        assert!(request.into_policy().is_none());
    }
}
