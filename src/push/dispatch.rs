use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;

use crate::config::DispatchPolicy;
use crate::ports::push::PushSender;
use crate::ports::time::TimeProvider;
use crate::push::{SubscriptionRegistry, send_payload};
use crate::types::push::{PushPayload, PushSubscription};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub queued: usize,
    pub sent: usize,
    pub failed: usize,
}

struct Delivery {
    subscription: PushSubscription,
    payload: PushPayload,
    /// Queued alerts folded into `payload`, restored if delivery fails.
    held: Vec<PushPayload>,
}

pub(crate) fn in_quiet_hours(policy: &DispatchPolicy, now: OffsetDateTime) -> bool {
    policy
        .quiet_hours
        .is_some_and(|quiet| quiet.contains(now.hour()))
}

fn cooling_down(last_push_at: Option<OffsetDateTime>, now: OffsetDateTime, cooldown: Duration) -> bool {
    last_push_at.is_some_and(|last| now - last < cooldown)
}

/// Folds alerts into one push. A single alert goes out as is; several
/// become a count summary pointing at the latest alert's url.
pub(crate) fn group(alerts: &[PushPayload], app_name: &str) -> Option<PushPayload> {
    let latest = alerts.last()?;
    if alerts.len() == 1 {
        return Some(latest.clone());
    }
    Some(PushPayload {
        title: Some(format!("{app_name} PRO")),
        body: Some(format!("{} new detections", alerts.len())),
        url: latest.url.clone(),
    })
}

/// Applies the dispatch policy to alerts for every stored subscription.
#[derive(Debug, Clone)]
pub(crate) struct Dispatcher<T, S> {
    time: T,
    sender: S,
    app_name: String,
}

impl<T, S> Dispatcher<T, S>
where
    T: TimeProvider,
    S: PushSender,
{
    pub(crate) fn new(time: T, sender: S, app_name: impl Into<String>) -> Self {
        Self {
            time,
            sender,
            app_name: app_name.into(),
        }
    }

    /// Pushes `alert` together with anything queued, or queues it during
    /// quiet hours and while the subscription is cooling down.
    pub(crate) async fn queue_or_push(
        &self,
        registry: &Mutex<SubscriptionRegistry>,
        policy: &DispatchPolicy,
        alert: PushPayload,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        if !policy.enabled {
            return report;
        }

        let now = self.time.now();
        let quiet = in_quiet_hours(policy, now);
        let deliveries = {
            let mut registry = registry.lock().expect("subscriptions lock");
            let mut deliveries = Vec::new();
            for entry in registry.entries_mut() {
                if quiet || cooling_down(entry.last_push_at, now, policy.cooldown) {
                    entry.pending.push(alert.clone());
                    report.queued += 1;
                    continue;
                }
                let held = std::mem::take(&mut entry.pending);
                let mut alerts = held.clone();
                alerts.push(alert.clone());
                if let Some(payload) = group(&alerts, &self.app_name) {
                    deliveries.push(Delivery {
                        subscription: entry.subscription.clone(),
                        payload,
                        held,
                    });
                }
            }
            deliveries
        };

        self.deliver(registry, deliveries, &mut report).await;
        report
    }

    /// Sends every non-empty queue as one grouped push, unless it is quiet
    /// time. The cooldown does not apply.
    pub(crate) async fn flush_if_needed(
        &self,
        registry: &Mutex<SubscriptionRegistry>,
        policy: &DispatchPolicy,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        if in_quiet_hours(policy, self.time.now()) {
            return report;
        }

        let deliveries = {
            let mut registry = registry.lock().expect("subscriptions lock");
            registry
                .entries_mut()
                .filter(|entry| !entry.pending.is_empty())
                .filter_map(|entry| {
                    let held = std::mem::take(&mut entry.pending);
                    let payload = group(&held, &self.app_name)?;
                    Some(Delivery {
                        subscription: entry.subscription.clone(),
                        payload,
                        held,
                    })
                })
                .collect::<Vec<_>>()
        };

        self.deliver(registry, deliveries, &mut report).await;
        report
    }

    async fn deliver(
        &self,
        registry: &Mutex<SubscriptionRegistry>,
        deliveries: Vec<Delivery>,
        report: &mut DispatchReport,
    ) {
        for delivery in deliveries {
            let endpoint = delivery.subscription.endpoint.as_str();
            if send_payload(&self.sender, &delivery.subscription, &delivery.payload).await {
                let now = self.time.now();
                registry
                    .lock()
                    .expect("subscriptions lock")
                    .mark_pushed(endpoint, now);
                report.sent += 1;
            } else {
                tracing::warn!(endpoint, held = delivery.held.len(), "grouped push not delivered");
                registry
                    .lock()
                    .expect("subscriptions lock")
                    .requeue(endpoint, delivery.held);
                report.failed += 1;
            }
        }
    }
}
