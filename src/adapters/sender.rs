use std::pin::Pin;
use std::sync::Arc;

use web_push::{
    ContentEncoding, SubscriptionInfo, SubscriptionKeys, URL_SAFE_NO_PAD, VapidSignatureBuilder,
    WebPushClient, WebPushError, WebPushMessage, WebPushMessageBuilder,
};

use crate::ports;
use crate::types::push::{PushSubscription, VapidConfig};

/// Seconds a push service keeps an undelivered alert. Alerts older than a
/// day are stale.
pub(crate) const PUSH_TTL_SECONDS: u32 = 24 * 60 * 60;

fn subscription_info(subscription: &PushSubscription) -> SubscriptionInfo {
    SubscriptionInfo {
        endpoint: subscription.endpoint.clone(),
        keys: SubscriptionKeys {
            p256dh: subscription.keys.p256dh.clone(),
            auth: subscription.keys.auth.clone(),
        },
    }
}

/// Encrypts `payload` for `subscription` (aes128gcm) and signs the request
/// for the subscription's push service.
pub(crate) fn build_message(
    vapid: &VapidConfig,
    subscription: &PushSubscription,
    payload: &[u8],
) -> Result<WebPushMessage, WebPushError> {
    let info = subscription_info(subscription);

    let mut signature = VapidSignatureBuilder::from_base64(&vapid.private_key, URL_SAFE_NO_PAD, &info)?;
    signature.add_claim("sub", vapid.subject.as_str());

    let mut message = WebPushMessageBuilder::new(&info)?;
    message.set_ttl(PUSH_TTL_SECONDS);
    message.set_payload(ContentEncoding::Aes128Gcm, payload);
    message.set_vapid_signature(signature.build()?);
    message.build()
}

#[derive(Clone)]
pub struct WebPushSender {
    vapid: Arc<VapidConfig>,
    client: Arc<WebPushClient>,
}

impl WebPushSender {
    pub fn new(vapid: VapidConfig) -> Result<Self, WebPushError> {
        Ok(Self {
            vapid: Arc::new(vapid),
            client: Arc::new(WebPushClient::new()?),
        })
    }
}

impl ports::push::PushSender for WebPushSender {
    type Error = WebPushError;
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<(), Self::Error>> + Send + 'a>>
    where
        Self: 'a;

    fn send<'a>(&'a self, subscription: &'a PushSubscription, message: &'a str) -> Self::Fut<'a> {
        Box::pin(async move {
            let message = build_message(&self.vapid, subscription, message.as_bytes())?;
            tracing::debug!(endpoint = %subscription.endpoint, "sending web push");
            self.client.send(message).await
        })
    }
}
