//! In-memory room server and client transports.
//!
//! [`SimHub`] plays the relay: it accepts `joinRoom`, `chatMessage`,
//! `typing` and `stopTyping` from connected transports and delivers the
//! matching inbound events to the other members of the room.
//!
//! Each [`SimTransport`] keeps client-side handlers the way an event-emitter
//! socket does: every `Subscribe` adds a handler even if one already exists
//! for that name, and `Unsubscribe` removes all handlers for the name. A
//! delivery produces one [`TransportEvent::Delivered`] per handler, so a
//! client that registers twice sees every event twice. Handlers survive
//! disconnects. Emits issued while disconnected are buffered and flushed on
//! reconnect.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use huddle_core::{
    EventName, InboundEvent, OutboundEvent, TransportCommand, TransportEvent, WireEvent,
};

#[derive(Debug, Default)]
struct Slot {
    /// Room membership. `None` until `joinRoom`.
    name: Option<String>,
    connected: bool,
    /// Registered handlers, duplicates allowed.
    handlers: Vec<EventName>,
    inbox: VecDeque<TransportEvent>,
    /// Emits waiting for a connection.
    outbox: Vec<WireEvent>,
}

#[derive(Debug, Default)]
struct HubState {
    slots: Vec<Slot>,
    /// Relay `chatMessage` back to its sender as well.
    echo_to_sender: bool,
    /// Every frame the hub accepted, in order.
    accepted: Vec<WireEvent>,
}

/// Shared in-memory room server.
#[derive(Debug, Clone, Default)]
pub struct SimHub {
    state: Arc<Mutex<HubState>>,
}

impl SimHub {
    /// Create a hub that relays to everyone but the sender.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hub that also relays chat messages back to their sender.
    pub fn with_echo() -> Self {
        let hub = Self::new();
        hub.lock().echo_to_sender = true;
        hub
    }

    /// Open a new connection. The transport's first event is `Connected`.
    pub fn connect(&self) -> SimTransport {
        let mut state = self.lock();
        let mut slot = Slot { connected: true, ..Slot::default() };
        slot.inbox.push_back(TransportEvent::Connected);
        state.slots.push(slot);

        SimTransport { hub: self.clone(), id: state.slots.len() - 1 }
    }

    /// Frames accepted by the hub, in order.
    pub fn accepted(&self) -> Vec<WireEvent> {
        self.lock().accepted.clone()
    }

    /// Names of connections that joined the room.
    pub fn members(&self) -> Vec<String> {
        self.lock().slots.iter().filter_map(|s| s.name.clone()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HubState {
    fn route(&mut self, from: usize, wire: WireEvent) {
        let event = match OutboundEvent::from_wire(&wire) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("hub rejected frame: {e}");
                return;
            },
        };
        self.accepted.push(wire);

        let (inbound, include_sender) = match event {
            OutboundEvent::JoinRoom(name) => {
                self.slots[from].name = Some(name.clone());
                (InboundEvent::RoomNotice(name), false)
            },
            OutboundEvent::ChatMessage(message) => {
                (InboundEvent::ChatMessage(message), self.echo_to_sender)
            },
            OutboundEvent::Typing(name) => (InboundEvent::Typing(name), false),
            OutboundEvent::StopTyping(name) => (InboundEvent::StopTyping(name), false),
        };

        let Ok(wire) = inbound.to_wire() else {
            return;
        };
        let name = inbound.name();
        for (id, slot) in self.slots.iter_mut().enumerate() {
            if (id == from && !include_sender) || slot.name.is_none() || !slot.connected {
                continue;
            }
            for _ in slot.handlers.iter().filter(|h| **h == name) {
                slot.inbox.push_back(TransportEvent::Delivered(wire.clone()));
            }
        }
    }
}

/// One client's connection to a [`SimHub`].
#[derive(Debug, Clone)]
pub struct SimTransport {
    hub: SimHub,
    id: usize,
}

impl SimTransport {
    /// Execute a command from the client.
    pub fn send(&self, command: TransportCommand) {
        let mut state = self.hub.lock();
        match command {
            TransportCommand::Emit(wire) => {
                if state.slots[self.id].connected {
                    state.route(self.id, wire);
                } else {
                    state.slots[self.id].outbox.push(wire);
                }
            },
            TransportCommand::Subscribe(name) => state.slots[self.id].handlers.push(name),
            TransportCommand::Unsubscribe(name) => {
                state.slots[self.id].handlers.retain(|h| *h != name);
            },
        }
    }

    /// Next pending event, if any.
    pub fn recv(&self) -> Option<TransportEvent> {
        self.hub.lock().slots[self.id].inbox.pop_front()
    }

    /// All pending events.
    pub fn drain(&self) -> Vec<TransportEvent> {
        self.hub.lock().slots[self.id].inbox.drain(..).collect()
    }

    /// Whether events are waiting.
    pub fn has_pending(&self) -> bool {
        !self.hub.lock().slots[self.id].inbox.is_empty()
    }

    /// Drop the connection. Handlers and membership are kept.
    pub fn disconnect(&self) {
        let mut state = self.hub.lock();
        let slot = &mut state.slots[self.id];
        if slot.connected {
            slot.connected = false;
            slot.inbox.push_back(TransportEvent::Disconnected);
        }
    }

    /// Restore the connection and flush buffered emits.
    pub fn reconnect(&self) {
        let mut state = self.hub.lock();
        let slot = &mut state.slots[self.id];
        if slot.connected {
            return;
        }
        slot.connected = true;
        slot.inbox.push_back(TransportEvent::Connected);

        let buffered = std::mem::take(&mut slot.outbox);
        for wire in buffered {
            state.route(self.id, wire);
        }
    }

    /// Whether the connection is up.
    pub fn is_connected(&self) -> bool {
        self.hub.lock().slots[self.id].connected
    }

    /// Number of handlers registered for `name`.
    pub fn handler_count(&self, name: EventName) -> usize {
        self.hub.lock().slots[self.id].handlers.iter().filter(|h| **h == name).count()
    }
}
