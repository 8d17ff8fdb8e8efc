//! Chat domain types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Message identifier. Time-based, unique within a log.
pub type MessageId = u64;

/// A room participant.
///
/// Identity is the display name itself: two users with the same name are
/// indistinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    name: String,
}

impl User {
    /// Build a user from raw input, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// - `ValidationError::EmptyName` if nothing is left after trimming
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self { name: trimmed.to_string() })
    }

    /// Trimmed, non-empty display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique id, also the render key.
    pub id: MessageId,
    /// Display name of the author.
    pub sender: String,
    /// Trimmed, non-empty body.
    pub text: String,
    /// Creation time, epoch milliseconds.
    #[serde(rename = "ts")]
    pub timestamp: u64,
}

impl Message {
    /// Whether `name` authored this message.
    ///
    /// Plain string equality on the display name. Users sharing a name are
    /// attributed to each other.
    pub fn is_from(&self, name: &str) -> bool {
        self.sender == name
    }
}
