//! Page-side orchestration: turns "the user wants notifications" into a
//! subscription recorded by the server.

use crate::config::ClientConfig;
use crate::ports::PlatformError;
use crate::ports::page::{Alerts, Permission, PushRuntime, SubscribeOptions};
use crate::ports::server_api::{PushServerApi, ServerApiError};
use crate::types::push::PushSubscription;

pub mod key;

use key::{KeyError, decode_application_server_key};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnablePushError {
    #[error("push notifications are not supported in this environment")]
    Unsupported,
    #[error("notification permission not granted ({0:?})")]
    PermissionDenied(Permission),
    #[error("failed to request notification permission: {0}")]
    PermissionRequest(PlatformError),
    #[error("failed to register worker script: {0}")]
    Registration(PlatformError),
    #[error(transparent)]
    Server(#[from] ServerApiError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("push subscription rejected: {0}")]
    Subscribe(PlatformError),
}

pub struct SubscriptionClient<R, S, A> {
    config: ClientConfig,
    runtime: R,
    server: S,
    alerts: A,
}

impl<R, S, A> SubscriptionClient<R, S, A>
where
    R: PushRuntime,
    S: PushServerApi,
    A: Alerts,
{
    pub fn new(config: ClientConfig, runtime: R, server: S, alerts: A) -> Self {
        Self {
            config,
            runtime,
            server,
            alerts,
        }
    }

    /// Runs the subscription handshake. Each step must succeed before the
    /// next one starts; the first failure ends the call.
    ///
    /// Only the unsupported and permission outcomes are shown to the user.
    pub async fn enable_push(&self) -> Result<PushSubscription, EnablePushError> {
        let capabilities = self.runtime.capabilities();
        if !capabilities.supports_push() {
            tracing::info!(?capabilities, "push notifications unsupported");
            self.alerts.alert(&self.config.messages.unsupported);
            return Err(EnablePushError::Unsupported);
        }

        let permission = self
            .runtime
            .request_permission()
            .await
            .map_err(EnablePushError::PermissionRequest)?;
        if permission != Permission::Granted {
            tracing::info!(?permission, "notification permission not granted");
            self.alerts.alert(&self.config.messages.permission_denied);
            return Err(EnablePushError::PermissionDenied(permission));
        }

        let registration = self
            .runtime
            .register_worker(&self.config.worker_script)
            .await
            .map_err(EnablePushError::Registration)?;

        let public_key = self.server.fetch_public_key().await?;
        let key = decode_application_server_key(&public_key.vapid_public_key)?;
        if !key.is_uncompressed_p256() {
            tracing::warn!(
                len = key.as_bytes().len(),
                "application server key is not an uncompressed P-256 point"
            );
        }

        let options = SubscribeOptions::new(key);
        let subscription = self
            .runtime
            .subscribe(&registration, &options)
            .await
            .map_err(EnablePushError::Subscribe)?;

        self.server.submit_subscription(&subscription).await?;
        tracing::info!(endpoint = %subscription.endpoint, "push subscription submitted");
        self.alerts.alert(&self.config.messages.enabled);
        Ok(subscription)
    }

    /// Asks the server to push a test message and reports whether it was
    /// dispatched. Transport and parse errors are returned, not shown.
    pub async fn test_push(&self) -> Result<bool, ServerApiError> {
        let response = self.server.send_test().await?;
        let message = if response.sent {
            &self.config.messages.test_sent
        } else {
            &self.config.messages.test_failed
        };
        self.alerts.alert(message);
        Ok(response.sent)
    }
}
