//! Error types for the Huddle core.
//!
//! Two layers: local input validation (rejected before anything is emitted)
//! and wire decoding (inbound events that do not match the contract).

use thiserror::Error;

/// Local input rejected before any state change or emitted event.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Display name is empty after trimming.
    #[error("name must not be empty")]
    EmptyName,

    /// Message text is empty after trimming.
    #[error("message must not be empty")]
    EmptyMessage,
}

/// Inbound or outbound wire data that does not match the event contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Event name is not part of the contract.
    #[error("unknown event: {0:?}")]
    UnknownEvent(String),

    /// Event name is valid but not accepted in this direction.
    #[error("event {0:?} is not accepted inbound")]
    UnexpectedDirection(String),

    /// Payload does not match the shape required by the event.
    #[error("invalid payload for {event}: {reason}")]
    InvalidPayload {
        /// Wire name of the event.
        event: String,
        /// Decoder error description.
        reason: String,
    },

    /// Frame is not a `["name", payload]` JSON array.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
}

impl ProtocolError {
    pub(crate) fn invalid_payload(event: &str, err: &serde_json::Error) -> Self {
        Self::InvalidPayload { event: event.to_string(), reason: err.to_string() }
    }
}
