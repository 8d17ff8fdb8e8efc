//! Client events and actions.

use huddle_core::{EventName, Message, OutboundEvent, User, WireEvent};

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Reporting transport lifecycle and delivering inbound events
/// - Driving time forward via ticks
/// - Forwarding user intents (join, compose, send)
///
/// Generic over `I` (Instant type) to support both production
/// (`std::time::Instant`) and simulation (virtual clock) environments.
#[derive(Debug, Clone)]
pub enum ClientEvent<I = std::time::Instant> {
    /// Transport connected (first connect or reconnect).
    Connected,

    /// Transport lost the connection.
    Disconnected,

    /// Event delivered by the transport.
    Received(WireEvent),

    /// Time tick for timer processing.
    ///
    /// The caller should tick at least when
    /// [`crate::Client::time_until_next_deadline`] elapses.
    Tick {
        /// Current time from the environment.
        now: I,
    },

    /// User submitted a display name.
    SubmitName {
        /// Name as typed, untrimmed.
        raw: String,
    },

    /// Composer text changed.
    TextChanged {
        /// Full composer text after the change.
        text: String,
    },

    /// User sent the composer text.
    SendMessage {
        /// Text as typed, untrimmed.
        text: String,
    },

    /// Session is being disposed.
    Teardown,
}

/// Connection lifecycle as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No transport connection.
    #[default]
    Disconnected,
    /// Transport connected, handlers registered.
    Connected,
}

/// Where an appended message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOrigin {
    /// Sent by this client (optimistic local echo).
    Local,
    /// Delivered by the transport.
    Remote,
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Emit an event on the transport.
    Emit(OutboundEvent),

    /// Register a handler for an inbound event.
    Subscribe(EventName),

    /// Release the handler for an inbound event.
    Unsubscribe(EventName),

    /// Connection state changed.
    ConnectionChanged(ConnectionState),

    /// Local user joined the room.
    Joined(User),

    /// Message appended to the log.
    MessageAppended {
        /// The appended message.
        message: Message,
        /// Local send or remote delivery.
        origin: MessageOrigin,
    },

    /// Typing set changed.
    TypingChanged {
        /// Names currently typing, in the order they started.
        typers: Vec<String>,
    },

    /// Someone joined the room.
    RoomNotice {
        /// Name of the user who joined.
        name: String,
    },
}
