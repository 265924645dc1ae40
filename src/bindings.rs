//! JavaScript entry points for the page and the worker script.
//!
//! Built with `wasm-pack build --target no-modules`, which exposes the
//! exports on a global `wasm_bindgen` that both a page `<script>` and a
//! worker's `importScripts` can load.
//!
//! The worker script must add its listeners synchronously during its first
//! evaluation, or a push that wakes a stopped worker finds no listener:
//!
//! ```javascript
//! // /static/sw.js
//! importScripts('/static/pkg/alerttrail_push.js');
//! const ready = wasm_bindgen('/static/pkg/alerttrail_push_bg.wasm');
//!
//! self.addEventListener('push', (event) => {
//!   event.waitUntil(ready.then(() => wasm_bindgen.handlePush(event)));
//! });
//! self.addEventListener('notificationclick', (event) => {
//!   event.waitUntil(ready.then(() => wasm_bindgen.handleNotificationClick(event)));
//! });
//! ```
//!
//! ```html
//! <script src="/static/pkg/alerttrail_push.js"></script>
//! <script>
//!   const ready = wasm_bindgen('/static/pkg/alerttrail_push_bg.wasm');
//!   enableButton.onclick = () => ready.then(() => wasm_bindgen.enablePush());
//!   testButton.onclick = () => ready.then(() => wasm_bindgen.testPush());
//! </script>
//! ```

use std::sync::Once;

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use web_sys::{NotificationEvent, PushEvent, ServiceWorkerGlobalScope};

use crate::adapters::browser::{
    BrowserClients, BrowserDisplay, BrowserNotification, BrowserPage, DeferredEvent,
};
use crate::adapters::http::HttpPushServer;
use crate::client::{EnablePushError, SubscriptionClient};
use crate::config::{ClientConfig, WorkerConfig};
use crate::worker::Worker;

type PageClient = SubscriptionClient<BrowserPage, HttpPushServer, BrowserPage>;
type BrowserWorker = Worker<BrowserDisplay, BrowserClients>;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        let config = tracing_wasm::WASMLayerConfigBuilder::new()
            .set_report_logs_in_timings(false)
            .set_max_level(tracing::Level::DEBUG)
            .build();
        tracing_wasm::set_as_global_default_with_config(config);
    });
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn page_client() -> Result<PageClient, JsValue> {
    init_logging();
    let page = BrowserPage::current().map_err(js_error)?;
    let origin = page.origin().map_err(js_error)?;
    let server = HttpPushServer::new(&origin).map_err(js_error)?;
    Ok(SubscriptionClient::new(
        ClientConfig::default(),
        page.clone(),
        server,
        page,
    ))
}

fn worker() -> Result<BrowserWorker, JsValue> {
    init_logging();
    let scope: ServiceWorkerGlobalScope = js_sys::global().dyn_into()?;
    Ok(Worker::new(
        WorkerConfig::default(),
        BrowserDisplay::new(scope.clone()),
        BrowserClients::new(&scope),
    ))
}

/// Resolves to `true` once the subscription was submitted, `false` when the
/// browser cannot or may not show notifications. Rejects on other failures.
#[wasm_bindgen(js_name = enablePush)]
pub async fn enable_push() -> Result<bool, JsValue> {
    match page_client()?.enable_push().await {
        Ok(_) => Ok(true),
        Err(EnablePushError::Unsupported | EnablePushError::PermissionDenied(_)) => Ok(false),
        Err(err) => {
            tracing::warn!(%err, "enabling push failed");
            Err(js_error(err))
        }
    }
}

/// Resolves to whether the server dispatched a test push.
#[wasm_bindgen(js_name = testPush)]
pub async fn test_push() -> Result<bool, JsValue> {
    page_client()?.test_push().await.map_err(|err| {
        tracing::warn!(%err, "test push request failed");
        js_error(err)
    })
}

/// Shows the notification for `event`. The returned promise settles once
/// the display operation did.
#[wasm_bindgen(js_name = handlePush)]
pub fn handle_push(event: PushEvent) -> Result<Promise, JsValue> {
    let worker = worker()?;
    let data = event.data().map(|data| data.text().into_bytes());
    let deferred = DeferredEvent::default();
    worker.handle_push(&deferred, data.as_deref());
    Ok(deferred.into_promise())
}

/// Closes the clicked notification and brings a window forward.
#[wasm_bindgen(js_name = handleNotificationClick)]
pub fn handle_notification_click(event: NotificationEvent) -> Result<Promise, JsValue> {
    let worker = worker()?;
    let notification = BrowserNotification(event.notification());
    let deferred = DeferredEvent::default();
    worker.handle_click(&deferred, &notification);
    Ok(deferred.into_promise())
}
