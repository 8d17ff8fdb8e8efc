//! Observable application state types.

/// Which screen the user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for a display name. Nothing but the prompt is shown.
    #[default]
    NamePrompt,
    /// Joined: room history, typing line and composer are shown.
    Chat,
}
