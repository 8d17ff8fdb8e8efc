//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Submit the display name and join the room.
    SubmitName {
        /// Name as typed, untrimmed.
        raw: String,
    },

    /// Composer text changed.
    ComposeChanged {
        /// Full composer text after the edit.
        text: String,
    },

    /// Send the composer text.
    SendMessage {
        /// Text as typed, untrimmed.
        text: String,
    },
}
