//! Append-only message log.
//!
//! Merges locally sent messages (appended immediately, before any round trip)
//! with messages delivered by the transport. Order is processing order, never
//! timestamp order: if the transport reorders deliveries the log keeps the
//! order in which they were handled.

use std::collections::HashSet;

use huddle_core::{Message, MessageId, User, ValidationError};

/// Ordered chat history for the room.
#[derive(Debug, Clone)]
pub struct MessageLog {
    /// Messages in insertion order.
    messages: Vec<Message>,
    /// Every id currently in `messages`.
    seen: HashSet<MessageId>,
    /// Last id handed out to a local message.
    last_local_id: Option<MessageId>,
    /// Drop inbound messages whose id is already present.
    dedupe: bool,
}

impl MessageLog {
    /// Create an empty log.
    pub fn new(dedupe: bool) -> Self {
        Self { messages: Vec::new(), seen: HashSet::new(), last_local_id: None, dedupe }
    }

    /// Compose and append a local message.
    ///
    /// The message is visible in the log before the caller emits it, and
    /// stays there whatever happens to the delivery.
    ///
    /// # Errors
    ///
    /// - `ValidationError::EmptyMessage` if the text is empty after trimming.
    ///   The log is unchanged.
    pub fn send_local(
        &mut self,
        raw_text: &str,
        sender: &User,
        now_millis: u64,
    ) -> Result<Message, ValidationError> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }

        let message = Message {
            id: self.allocate_id(now_millis),
            sender: sender.name().to_string(),
            text: text.to_string(),
            timestamp: now_millis,
        };
        self.append(message.clone());
        Ok(message)
    }

    /// Append a message delivered by the transport.
    ///
    /// Returns `false` if the message was dropped as a duplicate. With dedup
    /// on, identity is the id alone: a peer message whose time-based id
    /// collides with one already in the log is dropped too.
    pub fn receive_remote(&mut self, message: Message) -> bool {
        if self.dedupe && self.seen.contains(&message.id) {
            return false;
        }
        self.append(message);
        true
    }

    /// Messages in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether a message with this id has been appended.
    pub fn contains(&self, id: MessageId) -> bool {
        self.seen.contains(&id)
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn append(&mut self, message: Message) {
        self.seen.insert(message.id);
        self.messages.push(message);
    }

    /// Time-based id: the wall clock reading, bumped past the previous local
    /// id and any id already in the log.
    fn allocate_id(&mut self, now_millis: u64) -> MessageId {
        let mut id = match self.last_local_id {
            Some(last) if now_millis <= last => last.saturating_add(1),
            _ => now_millis,
        };
        while self.seen.contains(&id) {
            id = id.saturating_add(1);
        }
        self.last_local_id = Some(id);
        id
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(true)
    }
}
