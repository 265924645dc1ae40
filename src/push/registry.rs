use time::OffsetDateTime;

use crate::types::push::{PushPayload, PushSubscription};

#[derive(Debug, Clone)]
pub struct StoredSubscription {
    pub subscription: PushSubscription,
    pub created_at: OffsetDateTime,
    pub last_push_at: Option<OffsetDateTime>,
    /// Alerts held back by the dispatch policy, oldest first.
    pub pending: Vec<PushPayload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Added,
    AlreadyKnown,
}

/// In-memory subscription store, one entry per push endpoint.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    entries: Vec<StoredSubscription>,
}

impl SubscriptionRegistry {
    pub fn register(&mut self, subscription: PushSubscription, now: OffsetDateTime) -> RegisterOutcome {
        if self
            .entries
            .iter()
            .any(|entry| entry.subscription.endpoint == subscription.endpoint)
        {
            return RegisterOutcome::AlreadyKnown;
        }
        self.entries.push(StoredSubscription {
            subscription,
            created_at: now,
            last_push_at: None,
            pending: Vec::new(),
        });
        RegisterOutcome::Added
    }

    /// The most recently added subscription.
    pub fn latest(&self) -> Option<&StoredSubscription> {
        self.entries.last()
    }

    pub fn get(&self, endpoint: &str) -> Option<&StoredSubscription> {
        self.entries
            .iter()
            .find(|entry| entry.subscription.endpoint == endpoint)
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut StoredSubscription> {
        self.entries.iter_mut()
    }

    pub(crate) fn mark_pushed(&mut self, endpoint: &str, at: OffsetDateTime) {
        if let Some(entry) = self.get_mut(endpoint) {
            entry.last_push_at = Some(at);
        }
    }

    /// Puts `alerts` back in front of anything queued since they were taken.
    pub(crate) fn requeue(&mut self, endpoint: &str, alerts: Vec<PushPayload>) {
        if let Some(entry) = self.get_mut(endpoint) {
            entry.pending.splice(0..0, alerts);
        }
    }

    fn get_mut(&mut self, endpoint: &str) -> Option<&mut StoredSubscription> {
        self.entries
            .iter_mut()
            .find(|entry| entry.subscription.endpoint == endpoint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
