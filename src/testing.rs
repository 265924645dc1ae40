use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::config::SITE_ROOT;
use crate::ports::PlatformError;
use crate::ports::page::{Alerts, Capabilities, Permission, PushRuntime, SubscribeOptions};
use crate::ports::server_api::{PushServerApi, ServerApiError};
use crate::types::push::{
    PUBLIC_KEY_PATH, PublicKeyResponse, PushSubscription, SEND_TEST_PATH, SendTestResponse,
    SubscriptionKeys,
};

pub(crate) const TEST_VAPID_PUBLIC_KEY: &str =
    "BCRweRf_U5iQM4pKNucGRzM6OuLp8Hisa8yX0N2ePIf1oxKitvFT6qvuGgYoTxlMatMDaytXbZR3rVClc2w_p6U";

pub(crate) type CallLog = Rc<RefCell<Vec<&'static str>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TestRegistration {
    pub(crate) id: u32,
    pub(crate) script: String,
    pub(crate) scope: String,
}

/// In-memory page context: capability flags, a scripted permission answer,
/// and a registry that keeps one registration per scope.
#[derive(Clone)]
pub(crate) struct TestBrowser {
    pub(crate) capabilities: Capabilities,
    pub(crate) permission: Permission,
    pub(crate) reject_subscribe: bool,
    pub(crate) calls: CallLog,
    pub(crate) registrations: Rc<RefCell<HashMap<String, TestRegistration>>>,
    pub(crate) subscribe_options: Rc<RefCell<Vec<SubscribeOptions>>>,
    next_id: Rc<Cell<u32>>,
}

impl TestBrowser {
    pub(crate) fn new(calls: CallLog) -> Self {
        Self {
            capabilities: Capabilities {
                service_worker: true,
                push_manager: true,
            },
            permission: Permission::Granted,
            reject_subscribe: false,
            calls,
            registrations: Rc::new(RefCell::new(HashMap::new())),
            subscribe_options: Rc::new(RefCell::new(Vec::new())),
            next_id: Rc::new(Cell::new(1)),
        }
    }
}

impl PushRuntime for TestBrowser {
    type Registration = TestRegistration;

    fn capabilities(&self) -> Capabilities {
        self.calls.borrow_mut().push("capabilities");
        self.capabilities
    }

    fn request_permission(&self) -> LocalBoxFuture<'_, Result<Permission, PlatformError>> {
        self.calls.borrow_mut().push("request_permission");
        Box::pin(std::future::ready(Ok(self.permission)))
    }

    fn register_worker<'a>(
        &'a self,
        script: &'a str,
    ) -> LocalBoxFuture<'a, Result<TestRegistration, PlatformError>> {
        self.calls.borrow_mut().push("register_worker");
        let mut registrations = self.registrations.borrow_mut();
        let existing = registrations
            .get(SITE_ROOT)
            .filter(|registration| registration.script == script)
            .cloned();
        let registration = match existing {
            Some(existing) => existing,
            None => {
                let id = self.next_id.get();
                self.next_id.set(id + 1);
                let registration = TestRegistration {
                    id,
                    script: script.to_string(),
                    scope: SITE_ROOT.to_string(),
                };
                registrations.insert(SITE_ROOT.to_string(), registration.clone());
                registration
            }
        };
        Box::pin(std::future::ready(Ok(registration)))
    }

    fn subscribe<'a>(
        &'a self,
        registration: &'a TestRegistration,
        options: &'a SubscribeOptions,
    ) -> LocalBoxFuture<'a, Result<PushSubscription, PlatformError>> {
        self.calls.borrow_mut().push("subscribe");
        self.subscribe_options.borrow_mut().push(options.clone());
        if self.reject_subscribe {
            return Box::pin(std::future::ready(Err(PlatformError::new(
                "AbortError: push service unavailable",
            ))));
        }
        let subscription = PushSubscription {
            endpoint: format!("https://push.example/send/{}", registration.id),
            expiration_time: None,
            keys: SubscriptionKeys {
                p256dh: "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQ".to_string(),
                auth: "tBHItJI5svbpez7KI4CCXg".to_string(),
            },
        };
        Box::pin(std::future::ready(Ok(subscription)))
    }
}

#[derive(Clone)]
pub(crate) struct TestServer {
    pub(crate) public_key: String,
    pub(crate) sent: bool,
    pub(crate) offline: bool,
    pub(crate) calls: CallLog,
    pub(crate) submitted: Rc<RefCell<Vec<PushSubscription>>>,
}

impl TestServer {
    pub(crate) fn new(calls: CallLog) -> Self {
        Self {
            public_key: TEST_VAPID_PUBLIC_KEY.to_string(),
            sent: true,
            offline: false,
            calls,
            submitted: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl PushServerApi for TestServer {
    fn fetch_public_key(&self) -> LocalBoxFuture<'_, Result<PublicKeyResponse, ServerApiError>> {
        self.calls.borrow_mut().push("fetch_public_key");
        let result = if self.offline {
            Err(ServerApiError::Transport {
                path: PUBLIC_KEY_PATH,
                message: "connection refused".to_string(),
            })
        } else {
            Ok(PublicKeyResponse {
                vapid_public_key: self.public_key.clone(),
            })
        };
        Box::pin(std::future::ready(result))
    }

    fn submit_subscription<'a>(
        &'a self,
        subscription: &'a PushSubscription,
    ) -> LocalBoxFuture<'a, Result<(), ServerApiError>> {
        self.calls.borrow_mut().push("submit_subscription");
        self.submitted.borrow_mut().push(subscription.clone());
        Box::pin(std::future::ready(Ok(())))
    }

    fn send_test(&self) -> LocalBoxFuture<'_, Result<SendTestResponse, ServerApiError>> {
        self.calls.borrow_mut().push("send_test");
        let result = if self.offline {
            Err(ServerApiError::Transport {
                path: SEND_TEST_PATH,
                message: "connection refused".to_string(),
            })
        } else {
            Ok(SendTestResponse { sent: self.sent })
        };
        Box::pin(std::future::ready(result))
    }
}

#[derive(Clone, Default)]
pub(crate) struct TestAlerts {
    pub(crate) messages: Rc<RefCell<Vec<String>>>,
}

impl Alerts for TestAlerts {
    fn alert(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}
