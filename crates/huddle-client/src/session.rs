//! Session state: local identity and room membership.

use huddle_core::{OutboundEvent, User};

use crate::ClientError;

/// Local user and membership flag.
///
/// Membership is entered once per session and never left: there is no leave
/// flow, so the flag only goes from false to true.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    /// Create a session that has not joined yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit the display name and join the room.
    ///
    /// Returns the joined user and the `joinRoom` event to emit. On error
    /// nothing changes and nothing is emitted.
    ///
    /// # Errors
    ///
    /// - `ClientError::AlreadyJoined` if a name was already accepted
    /// - `ClientError::Validation` if the name is empty after trimming
    pub fn submit_name(&mut self, raw: &str) -> Result<(User, OutboundEvent), ClientError> {
        if let Some(user) = &self.user {
            return Err(ClientError::AlreadyJoined { name: user.name().to_string() });
        }

        let user = User::new(raw)?;
        let event = OutboundEvent::JoinRoom(user.name().to_string());
        self.user = Some(user.clone());
        Ok((user, event))
    }

    /// Local user. `None` until joined.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether the join event has been emitted.
    pub fn is_joined(&self) -> bool {
        self.user.is_some()
    }
}
