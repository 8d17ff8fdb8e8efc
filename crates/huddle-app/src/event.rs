//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (keyboard) and system ticks.
//! - Protocol notifications translated from the underlying client.

use huddle_core::Message;

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Transport connected.
    Connected,

    /// Transport lost the connection.
    Disconnected,

    /// Name accepted, chat view unlocked.
    Joined {
        /// Trimmed display name.
        name: String,
    },

    /// Message appended to the room history.
    MessageAppended(Message),

    /// Peers typing changed.
    TypingChanged {
        /// Names currently typing, in the order they started.
        typers: Vec<String>,
    },

    /// Someone joined the room.
    RoomNotice {
        /// Name of the user who joined.
        name: String,
    },

    /// Operation failed.
    Error {
        /// Human readable error.
        message: String,
    },
}
