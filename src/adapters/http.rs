use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use url::Url;

use crate::ports::server_api::{PushServerApi, ServerApiError};
use crate::types::push::{
    PUBLIC_KEY_PATH, PublicKeyResponse, PushSubscription, SEND_TEST_PATH, SUBSCRIBE_PATH,
    SendTestResponse,
};

/// Server API over HTTP, relative to the page origin.
#[derive(Debug, Clone)]
pub struct HttpPushServer {
    origin: Url,
    client: reqwest::Client,
}

impl HttpPushServer {
    pub fn new(origin: &str) -> Result<Self, ServerApiError> {
        let origin = Url::parse(origin)
            .map_err(|err| ServerApiError::InvalidUrl(format!("{origin}: {err}")))?;
        Ok(Self {
            origin,
            client: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &'static str) -> Result<Url, ServerApiError> {
        self.origin
            .join(path)
            .map_err(|err| ServerApiError::InvalidUrl(format!("{path}: {err}")))
    }
}

fn transport_error(path: &'static str) -> impl FnOnce(reqwest::Error) -> ServerApiError {
    move |err| ServerApiError::Transport {
        path,
        message: err.to_string(),
    }
}

async fn read_json<T: DeserializeOwned>(
    path: &'static str,
    response: reqwest::Response,
) -> Result<T, ServerApiError> {
    response
        .json::<T>()
        .await
        .map_err(|err| ServerApiError::Decode {
            path,
            message: err.to_string(),
        })
}

impl PushServerApi for HttpPushServer {
    fn fetch_public_key(&self) -> LocalBoxFuture<'_, Result<PublicKeyResponse, ServerApiError>> {
        Box::pin(async move {
            let url = self.endpoint(PUBLIC_KEY_PATH)?;
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(transport_error(PUBLIC_KEY_PATH))?;
            read_json(PUBLIC_KEY_PATH, response).await
        })
    }

    fn submit_subscription<'a>(
        &'a self,
        subscription: &'a PushSubscription,
    ) -> LocalBoxFuture<'a, Result<(), ServerApiError>> {
        Box::pin(async move {
            let url = self.endpoint(SUBSCRIBE_PATH)?;
            let response = self
                .client
                .post(url)
                .json(subscription)
                .send()
                .await
                .map_err(transport_error(SUBSCRIBE_PATH))?;
            if !response.status().is_success() {
                tracing::warn!(status = %response.status(), "server did not accept subscription");
            }
            Ok(())
        })
    }

    fn send_test(&self) -> LocalBoxFuture<'_, Result<SendTestResponse, ServerApiError>> {
        Box::pin(async move {
            let url = self.endpoint(SEND_TEST_PATH)?;
            let response = self
                .client
                .post(url)
                .send()
                .await
                .map_err(transport_error(SEND_TEST_PATH))?;
            read_json(SEND_TEST_PATH, response).await
        })
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::app;
    use crate::client::SubscriptionClient;
    use crate::config::{AppConfig, ClientConfig};
    use crate::state::AppState;
    use crate::testing::{CallLog, TEST_VAPID_PUBLIC_KEY, TestAlerts, TestBrowser};

    const TEST_VAPID_PRIVATE_KEY: &str = "9pKJeIXAyyCj5M0QagsVvDYHlPF-cymJCbB5iHPsdEE";

    async fn spawn_server(state: AppState) -> HttpPushServer {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let router = app::router(state);
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        HttpPushServer::new(&format!("http://{addr}")).expect("server api")
    }

    fn configured_state() -> AppState {
        AppState::new(AppConfig {
            vapid_private_key: Some(TEST_VAPID_PRIVATE_KEY.to_string()),
            vapid_public_key: Some(TEST_VAPID_PUBLIC_KEY.to_string()),
            vapid_subject: Some("mailto:ops@example.com".to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn new__should_reject_invalid_origin() {
        assert!(matches!(
            HttpPushServer::new("not a url"),
            Err(ServerApiError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn fetch_public_key__should_return_configured_key() {
        // Given
        let server = spawn_server(configured_state()).await;

        // When
        let response = server.fetch_public_key().await.expect("fetch key");

        // Then
        assert_eq!(response.vapid_public_key, TEST_VAPID_PUBLIC_KEY);
    }

    #[tokio::test]
    async fn fetch_public_key__should_fail_to_decode_unconfigured_response() {
        // Given
        let server = spawn_server(AppState::new(AppConfig::default())).await;

        // When
        let result = server.fetch_public_key().await;

        // Then
        assert!(matches!(
            result,
            Err(ServerApiError::Decode {
                path: PUBLIC_KEY_PATH,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn enable_push__should_record_subscription_on_server() {
        // Given
        let state = configured_state();
        let server = spawn_server(state.clone()).await;
        let calls = CallLog::default();
        let client = SubscriptionClient::new(
            ClientConfig::default(),
            TestBrowser::new(calls),
            server,
            TestAlerts::default(),
        );

        // When
        let subscription = client.enable_push().await.expect("enable push");

        // Then
        let registry = state.subscriptions.lock().expect("subscriptions lock");
        let latest = registry.latest().expect("stored subscription");
        assert_eq!(latest.subscription, subscription);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn send_test__should_report_not_sent_without_subscription() {
        // Given
        let server = spawn_server(configured_state()).await;

        // When
        let response = server.send_test().await.expect("send test");

        // Then
        assert!(!response.sent);
    }
}
