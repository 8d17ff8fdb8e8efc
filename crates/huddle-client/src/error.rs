//! Client error types.

use huddle_core::{ProtocolError, ValidationError};
use thiserror::Error;

/// Errors returned by [`crate::Client::handle`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Local input was rejected.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Name was already submitted for this session.
    #[error("already joined as {name}")]
    AlreadyJoined {
        /// Name the session joined with.
        name: String,
    },

    /// Operation needs a joined session.
    #[error("not joined: {operation} requires a name")]
    NotJoined {
        /// Operation that was attempted.
        operation: &'static str,
    },

    /// Inbound event could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Client was torn down.
    #[error("client disposed")]
    Disposed,
}

impl ClientError {
    /// Returns true if the user can fix this by changing their input.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotJoined { .. })
    }
}
