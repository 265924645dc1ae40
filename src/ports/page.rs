use futures::future::LocalBoxFuture;

use crate::client::key::ApplicationServerKey;
use crate::ports::PlatformError;
use crate::types::push::PushSubscription;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub service_worker: bool,
    pub push_manager: bool,
}

impl Capabilities {
    pub fn supports_push(&self) -> bool {
        self.service_worker && self.push_manager
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    Default,
}

impl Permission {
    /// Unknown values are treated as a dismissed prompt.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "granted" => Permission::Granted,
            "denied" => Permission::Denied,
            _ => Permission::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOptions {
    user_visible_only: bool,
    application_server_key: ApplicationServerKey,
}

impl SubscribeOptions {
    /// Every push must surface a visible notification, so `userVisibleOnly`
    /// is always set.
    pub fn new(application_server_key: ApplicationServerKey) -> Self {
        Self {
            user_visible_only: true,
            application_server_key,
        }
    }

    pub fn user_visible_only(&self) -> bool {
        self.user_visible_only
    }

    pub fn application_server_key(&self) -> &ApplicationServerKey {
        &self.application_server_key
    }
}

pub trait PushRuntime {
    type Registration: Clone;

    fn capabilities(&self) -> Capabilities;
    fn request_permission(&self) -> LocalBoxFuture<'_, Result<Permission, PlatformError>>;
    /// Registers `script` at the default scope.
    ///
    /// Registering the same script at the same scope again must resolve to
    /// the existing registration rather than fail or create a second one.
    fn register_worker<'a>(
        &'a self,
        script: &'a str,
    ) -> LocalBoxFuture<'a, Result<Self::Registration, PlatformError>>;
    fn subscribe<'a>(
        &'a self,
        registration: &'a Self::Registration,
        options: &'a SubscribeOptions,
    ) -> LocalBoxFuture<'a, Result<PushSubscription, PlatformError>>;
}

pub trait Alerts {
    fn alert(&self, message: &str);
}
