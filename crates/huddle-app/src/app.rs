//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the interactive
//! state of the application completely decoupled from I/O and protocol
//! mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Edits the name prompt and the message composer.
//! - Mirrors the room history and the peers typing set for rendering.
//! - Tracks high-level connection state for UI feedback.

use huddle_core::Message;

use crate::{AppAction, AppEvent, ConnectionState, KeyInput, Phase};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone, Default)]
pub struct App {
    /// Name prompt or chat view.
    phase: Phase,
    /// Connection state.
    state: ConnectionState,
    /// Local display name. `None` until joined.
    user_name: Option<String>,
    /// Name prompt buffer before joining, composer buffer after.
    input: String,
    /// Room history in the order the client appended it.
    messages: Vec<Message>,
    /// Peers typing, in the order they started.
    typers: Vec<String>,
    /// Join notices received from the room.
    notices: Vec<String>,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create an App showing the name prompt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => vec![],
            AppEvent::Connected => {
                self.state = ConnectionState::Connected;
                vec![AppAction::Render]
            },
            AppEvent::Disconnected => {
                self.state = ConnectionState::Disconnected;
                self.status_message = Some("Connection lost".into());
                vec![AppAction::Render]
            },
            AppEvent::Joined { name } => {
                self.phase = Phase::Chat;
                self.input.clear();
                self.status_message = Some(format!("Joined as {name}"));
                self.user_name = Some(name);
                vec![AppAction::Render]
            },
            AppEvent::MessageAppended(message) => {
                self.messages.push(message);
                vec![AppAction::Render]
            },
            AppEvent::TypingChanged { typers } => {
                self.typers = typers;
                vec![AppAction::Render]
            },
            AppEvent::RoomNotice { name } => {
                let notice = format!("{name} joined the room");
                self.status_message = Some(notice.clone());
                self.notices.push(notice);
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        if key == KeyInput::Esc {
            return vec![AppAction::Quit];
        }

        match self.phase {
            Phase::NamePrompt => self.handle_prompt_key(key),
            Phase::Chat => self.handle_compose_key(key),
        }
    }

    fn handle_prompt_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Char(c) => {
                self.input.push(c);
                vec![AppAction::Render]
            },
            KeyInput::Backspace => {
                self.input.pop();
                vec![AppAction::Render]
            },
            KeyInput::Enter => vec![AppAction::SubmitName { raw: self.input.clone() }],
            KeyInput::Esc => vec![],
        }
    }

    fn handle_compose_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Char(c) => {
                self.input.push(c);
                self.compose_changed()
            },
            KeyInput::Backspace => {
                if self.input.pop().is_none() {
                    return vec![];
                }
                self.compose_changed()
            },
            KeyInput::Enter => {
                let text = self.input.clone();
                if text.trim().is_empty() {
                    return vec![AppAction::SendMessage { text }];
                }

                // Clearing the composer is itself an edit.
                self.input.clear();
                let mut actions = vec![AppAction::SendMessage { text }];
                actions.extend(self.compose_changed());
                actions
            },
            KeyInput::Esc => vec![],
        }
    }

    fn compose_changed(&self) -> Vec<AppAction> {
        vec![AppAction::ComposeChanged { text: self.input.clone() }, AppAction::Render]
    }

    /// Current screen.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    /// Local display name. `None` until joined.
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Name prompt or composer contents.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Room history in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether the local user authored `message`.
    ///
    /// Attribution is by display name, so a peer using the same name is
    /// indistinguishable from the local user.
    pub fn is_mine(&self, message: &Message) -> bool {
        self.user_name.as_deref().is_some_and(|name| message.is_from(name))
    }

    /// Peers typing, excluding the local user.
    pub fn typers(&self) -> impl Iterator<Item = &str> {
        let me = self.user_name.as_deref();
        self.typers.iter().map(String::as_str).filter(move |name| Some(*name) != me)
    }

    /// Header subtitle: `"Bob, Carol typing..."` or `"Online"`.
    pub fn typing_line(&self) -> String {
        let typers: Vec<&str> = self.typers().collect();
        if typers.is_empty() { "Online".to_string() } else { format!("{} typing...", typers.join(", ")) }
    }

    /// Join notices in arrival order.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}
