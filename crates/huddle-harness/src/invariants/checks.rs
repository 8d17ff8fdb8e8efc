//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::HashSet;

use huddle_core::EventName;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// Message ids in a history are unique when deduplication is on.
///
/// A repeated id means a relayed local echo or a duplicate delivery slipped
/// through and the user sees the same message twice.
pub struct UniqueMessageIds;

impl Invariant for UniqueMessageIds {
    fn name(&self) -> &'static str {
        "unique_message_ids"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in state.clients.iter().filter(|c| c.dedupe) {
            let mut seen = HashSet::new();
            if let Some(dup) = client.message_ids.iter().find(|id| !seen.insert(**id)) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("client {:?}: message id {dup} appears twice", client.name),
                });
            }
        }
        Ok(())
    }
}

/// A peer appears in the typing set at most once.
pub struct NoDuplicateTypers;

impl Invariant for NoDuplicateTypers {
    fn name(&self) -> &'static str {
        "no_duplicate_typers"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let mut seen = HashSet::new();
            if let Some(dup) = client.typers.iter().find(|name| !seen.insert(name.as_str())) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("client {:?}: {dup} listed twice in {:?}", client.name, client.typers),
                });
            }
        }
        Ok(())
    }
}

/// Only inbound events are subscribed, each at most once.
pub struct SubscriptionsAreInbound;

impl Invariant for SubscriptionsAreInbound {
    fn name(&self) -> &'static str {
        "subscriptions_are_inbound"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let mut seen = HashSet::new();
            for name in &client.subscriptions {
                if !EventName::INBOUND.contains(name) || !seen.insert(*name) {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "client {:?}: unexpected subscription set {:?}",
                            client.name, client.subscriptions
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A disposed client holds no transport handlers.
pub struct DisposedHoldsNoHandlers;

impl Invariant for DisposedHoldsNoHandlers {
    fn name(&self) -> &'static str {
        "disposed_holds_no_handlers"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in state.clients.iter().filter(|c| c.disposed) {
            if !client.subscriptions.is_empty() {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {:?}: disposed with handlers {:?}",
                        client.name, client.subscriptions
                    ),
                });
            }
        }
        Ok(())
    }
}
