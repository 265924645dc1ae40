//! Browser implementations of the page and worker ports.

use std::cell::RefCell;

use futures::future::LocalBoxFuture;
use js_sys::{Array, JSON, Object, Promise, Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::{
    Clients, ServiceWorkerGlobalScope, ServiceWorkerRegistration, Window, WindowClient,
};

use crate::ports::PlatformError;
use crate::ports::page::{Alerts, Capabilities, Permission, PushRuntime, SubscribeOptions};
use crate::ports::worker::{
    ClientQuery, DisplayedNotification, ExtendableEvent, NotificationDisplay, WindowClients,
};
use crate::types::push::{NotificationData, NotificationDescriptor, PushSubscription};

pub(crate) fn platform_error(value: JsValue) -> PlatformError {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return PlatformError::new(String::from(err.message()));
    }
    PlatformError::new(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

fn has_property(target: &JsValue, name: &str) -> bool {
    Reflect::has(target, &JsValue::from_str(name)).unwrap_or(false)
}

fn set_property(target: &Object, name: &str, value: &JsValue) -> Result<(), PlatformError> {
    Reflect::set(target, &JsValue::from_str(name), value)
        .map(|_| ())
        .map_err(platform_error)
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, PlatformError> {
    let json = serde_json::to_string(value).map_err(|err| PlatformError::new(err.to_string()))?;
    JSON::parse(&json).map_err(platform_error)
}

fn from_js<T: serde::de::DeserializeOwned>(value: &JsValue) -> Result<T, PlatformError> {
    let json: String = JSON::stringify(value).map_err(platform_error)?.into();
    serde_json::from_str(&json).map_err(|err| PlatformError::new(err.to_string()))
}

/// The page's window: feature detection, permission, registration and
/// subscription.
#[derive(Clone)]
pub struct BrowserPage {
    window: Window,
}

impl BrowserPage {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    pub fn current() -> Result<Self, PlatformError> {
        web_sys::window()
            .map(Self::new)
            .ok_or_else(|| PlatformError::new("no window in this context"))
    }

    pub fn origin(&self) -> Result<String, PlatformError> {
        self.window.location().origin().map_err(platform_error)
    }
}

impl PushRuntime for BrowserPage {
    type Registration = ServiceWorkerRegistration;

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            service_worker: has_property(&self.window.navigator(), "serviceWorker"),
            push_manager: has_property(&self.window, "PushManager"),
        }
    }

    fn request_permission(&self) -> LocalBoxFuture<'_, Result<Permission, PlatformError>> {
        Box::pin(async move {
            let promise = web_sys::Notification::request_permission().map_err(platform_error)?;
            let result = JsFuture::from(promise).await.map_err(platform_error)?;
            Ok(Permission::parse(&result.as_string().unwrap_or_default()))
        })
    }

    fn register_worker<'a>(
        &'a self,
        script: &'a str,
    ) -> LocalBoxFuture<'a, Result<Self::Registration, PlatformError>> {
        Box::pin(async move {
            let container = self.window.navigator().service_worker();
            let registration = JsFuture::from(container.register(script))
                .await
                .map_err(platform_error)?;
            Ok(registration.unchecked_into())
        })
    }

    fn subscribe<'a>(
        &'a self,
        registration: &'a Self::Registration,
        options: &'a SubscribeOptions,
    ) -> LocalBoxFuture<'a, Result<PushSubscription, PlatformError>> {
        Box::pin(async move {
            let init = Object::new();
            set_property(
                &init,
                "userVisibleOnly",
                &JsValue::from_bool(options.user_visible_only()),
            )?;
            let key = Uint8Array::from(options.application_server_key().as_bytes());
            set_property(&init, "applicationServerKey", &key)?;

            let push_manager = registration.push_manager().map_err(platform_error)?;
            let promise = push_manager
                .subscribe_with_options(init.unchecked_ref())
                .map_err(platform_error)?;
            let subscription = JsFuture::from(promise).await.map_err(platform_error)?;
            from_js(&subscription)
        })
    }
}

impl Alerts for BrowserPage {
    fn alert(&self, message: &str) {
        if let Err(err) = self.window.alert_with_message(message) {
            tracing::debug!(err = %platform_error(err), "alert failed");
        }
    }
}

/// Shows notifications through the worker's own registration.
#[derive(Clone)]
pub struct BrowserDisplay {
    scope: ServiceWorkerGlobalScope,
}

impl BrowserDisplay {
    pub fn new(scope: ServiceWorkerGlobalScope) -> Self {
        Self { scope }
    }
}

impl NotificationDisplay for BrowserDisplay {
    fn show<'a>(
        &'a self,
        descriptor: &'a NotificationDescriptor,
    ) -> LocalBoxFuture<'a, Result<(), PlatformError>> {
        Box::pin(async move {
            let options = to_js(&descriptor.options)?;
            let promise = self
                .scope
                .registration()
                .show_notification_with_options(&descriptor.title, options.unchecked_ref())
                .map_err(platform_error)?;
            JsFuture::from(promise).await.map_err(platform_error)?;
            Ok(())
        })
    }
}

#[derive(Clone)]
pub struct BrowserClients {
    clients: Clients,
}

impl BrowserClients {
    pub fn new(scope: &ServiceWorkerGlobalScope) -> Self {
        Self {
            clients: scope.clients(),
        }
    }
}

impl WindowClients for BrowserClients {
    type Client = WindowClient;

    fn match_all<'a>(
        &'a self,
        query: &'a ClientQuery,
    ) -> LocalBoxFuture<'a, Result<Vec<Self::Client>, PlatformError>> {
        Box::pin(async move {
            let options = Object::new();
            set_property(&options, "type", &JsValue::from_str("window"))?;
            set_property(
                &options,
                "includeUncontrolled",
                &JsValue::from_bool(query.include_uncontrolled),
            )?;
            let matched = JsFuture::from(self.clients.match_all_with_options(options.unchecked_ref()))
                .await
                .map_err(platform_error)?;
            Ok(Array::from(&matched)
                .iter()
                .map(|client| client.unchecked_into::<WindowClient>())
                .collect())
        })
    }

    fn focus(&self, client: Self::Client) -> LocalBoxFuture<'_, Result<(), PlatformError>> {
        Box::pin(async move {
            let promise = client.focus().map_err(platform_error)?;
            JsFuture::from(promise).await.map_err(platform_error)?;
            Ok(())
        })
    }

    fn can_open_window(&self) -> bool {
        has_property(&self.clients, "openWindow")
    }

    fn open_window<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<(), PlatformError>> {
        Box::pin(async move {
            JsFuture::from(self.clients.open_window(url))
                .await
                .map_err(platform_error)?;
            Ok(())
        })
    }
}

pub struct BrowserNotification(pub web_sys::Notification);

impl DisplayedNotification for BrowserNotification {
    fn close(&self) {
        self.0.close();
    }

    fn data(&self) -> Option<NotificationData> {
        notification_data(&self.0.data())
    }
}

fn notification_data(data: &JsValue) -> Option<NotificationData> {
    if data.is_null() || !data.is_object() {
        return None;
    }
    from_js(data).ok()
}

/// Collects the work a handler extends its event with. The caller hands
/// the resulting promise to the platform event, which may already be
/// extended by the script that forwarded it.
#[derive(Default)]
pub struct DeferredEvent {
    pending: RefCell<Vec<Promise>>,
}

impl DeferredEvent {
    /// Resolves once every extension settled.
    pub fn into_promise(self) -> Promise {
        let mut pending = self.pending.into_inner();
        match pending.len() {
            0 => Promise::resolve(&JsValue::UNDEFINED),
            1 => pending.remove(0),
            _ => Promise::all(&pending.into_iter().collect::<Array>()),
        }
    }
}

impl ExtendableEvent for DeferredEvent {
    fn wait_until(&self, work: LocalBoxFuture<'static, ()>) {
        let promise = future_to_promise(async move {
            work.await;
            Ok(JsValue::UNDEFINED)
        });
        self.pending.borrow_mut().push(promise);
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::config::WorkerConfig;
    use crate::worker::{DecodedPayload, lifetime};
    use wasm_bindgen_test::*;

    fn get(target: &JsValue, name: &str) -> JsValue {
        Reflect::get(target, &JsValue::from_str(name)).expect("property")
    }

    #[wasm_bindgen_test]
    fn to_js__should_build_notification_options_object() {
        // Given
        let descriptor = DecodedPayload::decode(Some(br#"{"url":"/alerts/9"}"#.as_slice()))
            .to_descriptor(&WorkerConfig::default());

        // When
        let options = to_js(&descriptor.options).expect("options");

        // Then
        let data = get(&options, "data");
        assert!(data.is_object());
        assert_eq!(get(&data, "url").as_string().as_deref(), Some("/alerts/9"));
        assert_eq!(get(&options, "renotify").as_bool(), Some(true));
        assert_eq!(get(&options, "tag").as_string().as_deref(), Some("alerttrail"));
        assert_eq!(
            get(&options, "icon").as_string().as_deref(),
            Some("/static/icons/icon-192.png")
        );
    }

    #[wasm_bindgen_test]
    fn notification_data__should_ignore_values_without_url_object() {
        // Given
        let without_url = JSON::parse(r#"{"path":"/alerts/1"}"#).expect("parse");
        let with_url = JSON::parse(r#"{"url":"/alerts/1"}"#).expect("parse");

        // Then
        assert_eq!(notification_data(&JsValue::from_str("/alerts/1")), None);
        assert_eq!(notification_data(&JsValue::UNDEFINED), None);
        assert_eq!(notification_data(&JsValue::NULL), None);
        assert_eq!(notification_data(&without_url), None);
        assert_eq!(
            notification_data(&with_url),
            Some(NotificationData {
                url: "/alerts/1".to_string()
            })
        );
    }

    #[wasm_bindgen_test]
    fn from_js__should_read_serialized_push_subscription() {
        // Given
        let value = JSON::parse(
            r#"{
                "endpoint": "https://fcm.googleapis.com/fcm/send/abc",
                "expirationTime": null,
                "keys": { "p256dh": "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQ", "auth": "tBHItJI5svbpez7KI4CCXg" }
            }"#,
        )
        .expect("parse");

        // When
        let subscription: PushSubscription = from_js(&value).expect("subscription");

        // Then
        assert_eq!(subscription.endpoint, "https://fcm.googleapis.com/fcm/send/abc");
        assert_eq!(subscription.expiration_time, None);
        assert_eq!(subscription.keys.auth, "tBHItJI5svbpez7KI4CCXg");
    }

    #[wasm_bindgen_test]
    async fn deferred_event__should_resolve_after_extended_work() {
        // Given
        let event = DeferredEvent::default();
        let in_flight = lifetime::extend(&event, async {});

        // When
        JsFuture::from(event.into_promise()).await.expect("promise");

        // Then
        assert!(in_flight.is_settled());
    }

    #[wasm_bindgen_test]
    async fn deferred_event__should_resolve_without_work() {
        // When
        let result = JsFuture::from(DeferredEvent::default().into_promise()).await;

        // Then
        assert!(result.is_ok());
    }
}
