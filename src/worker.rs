//! Background worker: turns push events into notifications and routes
//! clicks on them back to a window.

use futures::future::LocalBoxFuture;

use crate::config::WorkerConfig;
use crate::ports::PlatformError;
use crate::ports::worker::{
    DisplayedNotification, ExtendableEvent, NotificationDisplay, WindowClients,
};
use crate::types::push::NotificationDescriptor;

mod click;
pub mod lifetime;
pub mod payload;

pub use click::ClickOutcome;
pub use lifetime::{EventPhase, InFlight};
pub use payload::DecodedPayload;

#[derive(Clone)]
pub struct Worker<D, C> {
    config: WorkerConfig,
    display: D,
    clients: C,
}

impl<D, C> Worker<D, C>
where
    D: NotificationDisplay,
    C: WindowClients,
{
    pub fn new(config: WorkerConfig, display: D, clients: C) -> Self {
        Self {
            config,
            display,
            clients,
        }
    }

    pub fn descriptor_for(&self, data: Option<&[u8]>) -> NotificationDescriptor {
        DecodedPayload::decode(data).to_descriptor(&self.config)
    }

    /// Builds the notification for `data` and returns the display operation.
    pub fn on_push(&self, data: Option<&[u8]>) -> LocalBoxFuture<'static, Result<(), PlatformError>> {
        let descriptor = self.descriptor_for(data);
        let display = self.display.clone();
        Box::pin(async move { display.show(&descriptor).await })
    }

    /// Closes `notification` right away and returns the routing operation.
    pub fn on_notification_click<N>(&self, notification: &N) -> LocalBoxFuture<'static, ClickOutcome>
    where
        N: DisplayedNotification + ?Sized,
    {
        notification.close();
        let url = click::target_url(notification);
        let clients = self.clients.clone();
        Box::pin(async move { click::route(&clients, &url).await })
    }

    /// Handles a push event: the display operation keeps `event` in flight
    /// until it settles. Display failures are logged and never escape.
    pub fn handle_push<E>(&self, event: &E, data: Option<&[u8]>) -> InFlight
    where
        E: ExtendableEvent + ?Sized,
    {
        let display = self.on_push(data);
        lifetime::extend(event, async move {
            if let Err(err) = display.await {
                tracing::debug!(%err, "failed to display notification");
            }
        })
    }

    /// Handles a notification click, keeping `event` in flight until the
    /// routing operation settles.
    pub fn handle_click<E, N>(&self, event: &E, notification: &N) -> InFlight
    where
        E: ExtendableEvent + ?Sized,
        N: DisplayedNotification + ?Sized,
    {
        let routing = self.on_notification_click(notification);
        lifetime::extend(event, async move {
            let outcome = routing.await;
            tracing::debug!(?outcome, "notification click handled");
        })
    }
}
