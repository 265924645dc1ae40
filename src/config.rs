use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_APP_NAME: &str = "AlertTrail";
pub const DEFAULT_COOLDOWN_MINUTES: u64 = 10;
pub const WORKER_SCRIPT_PATH: &str = "/static/sw.js";
pub const SITE_ROOT: &str = "/";

#[derive(Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub app_name: String,
    pub vapid_private_key: Option<String>,
    pub vapid_public_key: Option<String>,
    pub vapid_subject: Option<String>,
    pub dispatch: DispatchPolicy,
}

#[cfg(test)]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 0)),
            app_name: DEFAULT_APP_NAME.to_string(),
            vapid_private_key: None,
            vapid_public_key: None,
            vapid_subject: None,
            dispatch: DispatchPolicy::default(),
        }
    }
}

/// Hours of the UTC day during which alerts are held back. A window whose
/// start is after its end wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietHours {
    pub start: u8,
    pub end: u8,
}

impl QuietHours {
    /// Parses `"<start>-<end>"`, e.g. `"22-7"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (start, end) = raw.trim().split_once('-')?;
        let start: u8 = start.trim().parse().ok()?;
        let end: u8 = end.trim().parse().ok()?;
        (start < 24 && end < 24).then_some(Self { start, end })
    }

    pub fn contains(&self, hour: u8) -> bool {
        if self.start <= self.end {
            self.start <= hour && hour < self.end
        } else {
            hour >= self.start || hour < self.end
        }
    }
}

impl fmt::Display for QuietHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// When alerts go out immediately and when they wait in the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPolicy {
    pub enabled: bool,
    /// Minimum time between two pushes to the same subscription.
    pub cooldown: Duration,
    pub quiet_hours: Option<QuietHours>,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            cooldown: Duration::from_secs(DEFAULT_COOLDOWN_MINUTES * 60),
            quiet_hours: None,
        }
    }
}

/// Fields of a push payload that fall back to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadField {
    Title,
    Body,
    Url,
}

impl PayloadField {
    pub const ALL: [PayloadField; 3] = [PayloadField::Title, PayloadField::Body, PayloadField::Url];
}

/// Defaults table for push payload fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDefaults {
    pub title: String,
    pub body: String,
    pub url: String,
}

impl NotificationDefaults {
    pub fn get(&self, field: PayloadField) -> &str {
        match field {
            PayloadField::Title => &self.title,
            PayloadField::Body => &self.body,
            PayloadField::Url => &self.url,
        }
    }
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            title: DEFAULT_APP_NAME.to_string(),
            body: "New alert received".to_string(),
            url: "/dashboard".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub defaults: NotificationDefaults,
    pub icon: String,
    pub badge: String,
    pub tag: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            defaults: NotificationDefaults::default(),
            icon: "/static/icons/icon-192.png".to_string(),
            badge: "/static/icons/badge-72.png".to_string(),
            tag: "alerttrail".to_string(),
        }
    }
}

/// User-visible alert texts shown by the subscription client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMessages {
    pub unsupported: String,
    pub permission_denied: String,
    pub enabled: String,
    pub test_sent: String,
    pub test_failed: String,
}

impl Default for ClientMessages {
    fn default() -> Self {
        Self {
            unsupported: "Push notifications are not supported in this browser".to_string(),
            permission_denied: "Notification permission denied".to_string(),
            enabled: "Notifications enabled".to_string(),
            test_sent: "Test sent (check the notification)".to_string(),
            test_failed: "Test push failed".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub worker_script: String,
    pub messages: ClientMessages,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            worker_script: WORKER_SCRIPT_PATH.to_string(),
            messages: ClientMessages::default(),
        }
    }
}
