use crate::config::{AppConfig, DispatchPolicy};
use crate::push::SubscriptionRegistry;

use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub subscriptions: Arc<Mutex<SubscriptionRegistry>>,
    /// Starts from `config.dispatch`; changed through the prefs endpoint.
    pub policy: Arc<Mutex<DispatchPolicy>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let policy = config.dispatch.clone();
        Self {
            config,
            subscriptions: Arc::new(Mutex::new(SubscriptionRegistry::default())),
            policy: Arc::new(Mutex::new(policy)),
        }
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy.lock().expect("policy lock").clone()
    }
}
