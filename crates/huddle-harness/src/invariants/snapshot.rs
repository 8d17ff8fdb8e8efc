//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use huddle_app::App;
use huddle_client::{Client, Environment};
use huddle_core::{EventName, MessageId};

/// Snapshot of the entire system state.
///
/// Contains observable state from one or more clients for invariant checking.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-client state snapshots.
    pub clients: Vec<ClientSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no clients).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single client.
    pub fn single(client: ClientSnapshot) -> Self {
        Self { clients: vec![client] }
    }

    /// Create a snapshot from multiple clients.
    pub fn from_clients(clients: Vec<ClientSnapshot>) -> Self {
        Self { clients }
    }

    /// Add a client snapshot.
    pub fn add_client(&mut self, client: ClientSnapshot) {
        self.clients.push(client);
    }
}

/// Snapshot of a single client's observable state.
#[derive(Debug, Clone)]
pub struct ClientSnapshot {
    /// Display name. `None` until joined.
    pub name: Option<String>,
    /// Message ids in history order.
    pub message_ids: Vec<MessageId>,
    /// Whether duplicate ids are dropped on receipt.
    pub dedupe: bool,
    /// Peers typing, in the order they started.
    pub typers: Vec<String>,
    /// Inbound events with a live handler.
    pub subscriptions: Vec<EventName>,
    /// Teardown has run.
    pub disposed: bool,
}

impl Default for ClientSnapshot {
    fn default() -> Self {
        Self {
            name: None,
            message_ids: Vec::new(),
            dedupe: true,
            typers: Vec::new(),
            subscriptions: Vec::new(),
            disposed: false,
        }
    }
}

impl ClientSnapshot {
    /// Capture everything observable on a client.
    pub fn from_client<E: Environment>(client: &Client<E>) -> Self {
        Self {
            name: client.user().map(|u| u.name().to_string()),
            message_ids: client.messages().iter().map(|m| m.id).collect(),
            dedupe: client.config().dedupe_messages,
            typers: client.typers().map(str::to_string).collect(),
            subscriptions: client.subscriptions().names().collect(),
            disposed: client.is_disposed(),
        }
    }

    /// Capture the rendered view. Subscription state is not visible here.
    pub fn from_app(app: &App) -> Self {
        Self {
            name: app.user_name().map(str::to_string),
            message_ids: app.messages().iter().map(|m| m.id).collect(),
            typers: app.typers().map(str::to_string).collect(),
            ..Self::default()
        }
    }
}
