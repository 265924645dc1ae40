use futures::future::LocalBoxFuture;

use crate::ports::PlatformError;
use crate::types::push::{NotificationData, NotificationDescriptor};

pub trait NotificationDisplay: Clone + 'static {
    /// Resolves once the platform has rendered the notification.
    fn show<'a>(
        &'a self,
        descriptor: &'a NotificationDescriptor,
    ) -> LocalBoxFuture<'a, Result<(), PlatformError>>;
}

/// A notification the user interacted with.
pub trait DisplayedNotification {
    fn close(&self);
    /// `None` when the notification carries no `{url}` object.
    fn data(&self) -> Option<NotificationData>;
}

/// A lookup of the origin's window clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientQuery {
    pub include_uncontrolled: bool,
}

impl ClientQuery {
    /// Every window of the origin, including ones another worker version
    /// controls.
    pub fn all_windows() -> Self {
        Self {
            include_uncontrolled: true,
        }
    }
}

pub trait WindowClients: Clone + 'static {
    type Client;

    fn match_all<'a>(
        &'a self,
        query: &'a ClientQuery,
    ) -> LocalBoxFuture<'a, Result<Vec<Self::Client>, PlatformError>>;
    fn focus(&self, client: Self::Client) -> LocalBoxFuture<'_, Result<(), PlatformError>>;
    fn can_open_window(&self) -> bool;
    fn open_window<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<(), PlatformError>>;
}

/// An event whose lifetime can be extended past the handler's return.
pub trait ExtendableEvent {
    /// Keeps the event in flight until `work` completes.
    fn wait_until(&self, work: LocalBoxFuture<'static, ()>);
}
