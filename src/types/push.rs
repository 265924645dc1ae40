use serde::{Deserialize, Serialize};

pub const PUBLIC_KEY_PATH: &str = "/push/pubkey";
pub const SUBSCRIBE_PATH: &str = "/push/subscribe";
pub const SEND_TEST_PATH: &str = "/push/send-test";
pub const ALERT_PATH: &str = "/push/alert";
pub const FLUSH_PATH: &str = "/push/flush";
pub const PREFS_PATH: &str = "/push/prefs";

/// Message the server hands to the push service. Every field is optional on
/// the receiving side; the worker fills gaps from its defaults table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDescriptor {
    pub title: String,
    pub options: NotificationOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub tag: String,
    pub renotify: bool,
    pub data: NotificationData,
}

/// Data attached to a displayed notification. Always an object so the click
/// handler can look fields up instead of interpolating a raw string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub url: String,
}

/// Serialized form of a platform push subscription, as produced by
/// `PushSubscription.toJSON()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    #[serde(default)]
    pub expiration_time: Option<u64>,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyResponse {
    pub vapid_public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTestResponse {
    #[serde(default)]
    pub sent: bool,
}

/// Dispatch preferences as exchanged with the prefs endpoint. An empty
/// `quiet_hours` means none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchPrefs {
    pub cooldown_min: u64,
    pub quiet_hours: String,
    pub push_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct VapidConfig {
    pub private_key: String,
    pub public_key: String,
    pub subject: String,
}
