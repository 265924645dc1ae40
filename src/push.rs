use crate::ports::push::PushSender;
use crate::types::push::{PushPayload, PushSubscription};

pub(crate) mod dispatch;
pub(crate) mod registry;
pub(crate) mod vapid;

pub use dispatch::DispatchReport;
pub(crate) use dispatch::Dispatcher;
pub use registry::{StoredSubscription, SubscriptionRegistry};
pub(crate) use vapid::{VapidConfigStatus, load_vapid_config};

pub(crate) const TEST_NOTIFICATION_BODY: &str = "Test notification";
pub(crate) const DEFAULT_ALERT_URL: &str = "/dashboard";

pub(crate) fn test_payload(app_name: &str) -> PushPayload {
    PushPayload {
        title: Some(format!("{app_name} PRO")),
        body: Some(TEST_NOTIFICATION_BODY.to_string()),
        url: Some(DEFAULT_ALERT_URL.to_string()),
    }
}

/// Delivers `payload` to one subscription. Returns whether the push service
/// accepted it.
pub(crate) async fn send_payload<S: PushSender>(
    sender: &S,
    subscription: &PushSubscription,
    payload: &PushPayload,
) -> bool {
    let message = match serde_json::to_string(payload) {
        Ok(message) => message,
        Err(err) => {
            tracing::error!(%err, "failed to encode push payload");
            return false;
        }
    };

    match sender.send(subscription, &message).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(%err, endpoint = %subscription.endpoint, "push delivery error");
            false
        }
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::types::push::SubscriptionKeys;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct TestSendError;

    impl std::fmt::Display for TestSendError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("push service returned 410 Gone")
        }
    }

    #[derive(Clone, Default)]
    struct TestSender {
        fail: bool,
        sent: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl PushSender for TestSender {
        type Error = TestSendError;
        type Fut<'a>
            = Pin<Box<dyn Future<Output = Result<(), Self::Error>> + Send + 'a>>
        where
            Self: 'a;

        fn send<'a>(&'a self, subscription: &'a PushSubscription, message: &'a str) -> Self::Fut<'a> {
            let sent = Arc::clone(&self.sent);
            let endpoint = subscription.endpoint.clone();
            let message = message.to_string();
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    return Err(TestSendError);
                }
                sent.lock().expect("sent lock").push((endpoint, message));
                Ok(())
            })
        }
    }

    fn subscription() -> PushSubscription {
        PushSubscription {
            endpoint: "https://push.example/123".to_string(),
            expiration_time: None,
            keys: SubscriptionKeys {
                p256dh: "p256".to_string(),
                auth: "auth".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn send_payload__should_send_json_payload() {
        // Given
        let sender = TestSender::default();
        let payload = test_payload("AlertTrail");

        // When
        let sent = send_payload(&sender, &subscription(), &payload).await;

        // Then
        assert!(sent);
        let deliveries = sender.sent.lock().expect("sent lock").clone();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "https://push.example/123");
        let delivered: PushPayload = serde_json::from_str(&deliveries[0].1).expect("parse");
        assert_eq!(delivered.title.as_deref(), Some("AlertTrail PRO"));
        assert_eq!(delivered.body.as_deref(), Some(TEST_NOTIFICATION_BODY));
        assert_eq!(delivered.url.as_deref(), Some(DEFAULT_ALERT_URL));
    }

    #[tokio::test]
    async fn send_payload__should_report_failure() {
        // Given
        let sender = TestSender {
            fail: true,
            ..Default::default()
        };

        // When
        let sent = send_payload(&sender, &subscription(), &test_payload("AlertTrail")).await;

        // Then
        assert!(!sent);
        assert!(sender.sent.lock().expect("sent lock").is_empty());
    }
}
