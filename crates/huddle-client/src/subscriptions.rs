//! Subscription registry.
//!
//! Tracks which inbound event names currently have a handler registered on
//! the transport. Registration replaces rather than stacks: re-subscribing
//! first releases every registered name, so a reconnect never leaves two
//! handlers for the same event.

use std::collections::BTreeSet;

use huddle_core::EventName;

/// Registry of event names with a live transport handler.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionRegistry {
    active: BTreeSet<EventName>,
}

/// Transport-level changes needed to reach the new registry state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionChanges {
    /// Names whose handler must be released, applied first.
    pub released: Vec<EventName>,
    /// Names that need a handler registered.
    pub registered: Vec<EventName>,
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `names`, releasing everything registered before.
    pub fn resubscribe(&mut self, names: &[EventName]) -> SubscriptionChanges {
        let released = self.release_all();
        self.active.extend(names.iter().copied());
        SubscriptionChanges { released, registered: self.active.iter().copied().collect() }
    }

    /// Release every registered name. Returns what was released.
    pub fn release_all(&mut self) -> Vec<EventName> {
        std::mem::take(&mut self.active).into_iter().collect()
    }

    /// Whether `name` has a live handler.
    pub fn is_subscribed(&self, name: EventName) -> bool {
        self.active.contains(&name)
    }

    /// Registered names.
    pub fn names(&self) -> impl Iterator<Item = EventName> + '_ {
        self.active.iter().copied()
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
