//! Client state machine.
//!
//! The `Client` is the event router: it owns the session, message log and
//! typing tracker, turns transport deliveries and user intents into updates of
//! that state, and reports every externally visible effect as a
//! [`ClientAction`].

use std::time::Duration;

use huddle_core::{
    Environment, EventName, InboundEvent, Message, OutboundEvent, User, ValidationError, WireEvent,
};

use crate::{
    ClientConfig, ClientError,
    event::{ClientAction, ClientEvent, ConnectionState, MessageOrigin},
    message_log::MessageLog,
    session::Session,
    subscriptions::SubscriptionRegistry,
    typing::TypingTracker,
};

/// Group chat client for a single room.
pub struct Client<E: Environment> {
    /// Environment for time.
    env: E,

    /// Configuration the client was built with.
    config: ClientConfig,

    /// Transport lifecycle.
    connection: ConnectionState,

    /// Local user and membership.
    session: Session,

    /// Room history.
    log: MessageLog,

    /// Local debounce timer and peer typing set.
    typing: TypingTracker<E::Instant>,

    /// Inbound events with a live transport handler.
    subscriptions: SubscriptionRegistry,

    /// Set by teardown. A disposed client only releases resources.
    disposed: bool,
}

impl<E: Environment> Client<E> {
    /// Create a client with default configuration.
    pub fn new(env: E) -> Self {
        Self::with_config(env, ClientConfig::default())
    }

    /// Create a client with the given configuration.
    pub fn with_config(env: E, config: ClientConfig) -> Self {
        Self {
            env,
            connection: ConnectionState::Disconnected,
            session: Session::new(),
            log: MessageLog::new(config.dedupe_messages),
            typing: TypingTracker::new(&config),
            subscriptions: SubscriptionRegistry::new(),
            disposed: false,
            config,
        }
    }

    /// Process an event and return resulting actions.
    pub fn handle(
        &mut self,
        event: ClientEvent<E::Instant>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if self.disposed {
            return self.handle_disposed(event);
        }

        match event {
            ClientEvent::Connected => Ok(self.handle_connected()),
            ClientEvent::Disconnected => Ok(self.handle_disconnected()),
            ClientEvent::Received(wire) => self.handle_received(&wire),
            ClientEvent::Tick { now } => Ok(self.handle_tick(now)),
            ClientEvent::SubmitName { raw } => self.handle_submit_name(&raw),
            ClientEvent::TextChanged { text } => self.handle_text_changed(&text),
            ClientEvent::SendMessage { text } => self.handle_send_message(&text),
            ClientEvent::Teardown => Ok(self.handle_teardown()),
        }
    }

    fn handle_connected(&mut self) -> Vec<ClientAction> {
        let mut actions = Vec::new();

        if self.connection != ConnectionState::Connected {
            self.connection = ConnectionState::Connected;
            actions.push(ClientAction::ConnectionChanged(ConnectionState::Connected));
        }

        let changes = self.subscriptions.resubscribe(&EventName::INBOUND);
        if !changes.released.is_empty() {
            tracing::debug!(
                released = changes.released.len(),
                "connect with live handlers, releasing before re-registering"
            );
        }

        actions.extend(changes.released.into_iter().map(ClientAction::Unsubscribe));
        actions.extend(changes.registered.into_iter().map(ClientAction::Subscribe));
        actions
    }

    fn handle_disconnected(&mut self) -> Vec<ClientAction> {
        if self.connection == ConnectionState::Disconnected {
            return Vec::new();
        }

        // Handlers stay registered on the transport across reconnects.
        self.connection = ConnectionState::Disconnected;
        vec![ClientAction::ConnectionChanged(ConnectionState::Disconnected)]
    }

    fn handle_received(&mut self, wire: &WireEvent) -> Result<Vec<ClientAction>, ClientError> {
        let name: EventName = wire.name.parse()?;
        if !self.subscriptions.is_subscribed(name) {
            tracing::debug!(event = %name, "no handler registered, ignoring");
            return Ok(Vec::new());
        }

        let actions = match InboundEvent::from_wire(wire)? {
            InboundEvent::RoomNotice(name) => {
                tracing::info!("{name} joined the room");
                vec![ClientAction::RoomNotice { name }]
            },
            InboundEvent::ChatMessage(message) => {
                let id = message.id;
                if self.log.receive_remote(message.clone()) {
                    vec![ClientAction::MessageAppended { message, origin: MessageOrigin::Remote }]
                } else {
                    tracing::debug!(id, "duplicate message dropped");
                    Vec::new()
                }
            },
            InboundEvent::Typing(name) => {
                let now = self.env.now();
                if self.typing.peer_typing(&name, now) {
                    vec![self.typing_changed()]
                } else {
                    Vec::new()
                }
            },
            InboundEvent::StopTyping(name) => {
                if self.typing.peer_stopped(&name) {
                    vec![self.typing_changed()]
                } else {
                    Vec::new()
                }
            },
        };

        Ok(actions)
    }

    fn handle_tick(&mut self, now: E::Instant) -> Vec<ClientAction> {
        let mut actions = Vec::new();

        if let Some(stop) = self.typing.poll_timer(now) {
            actions.push(ClientAction::Emit(stop));
        }

        let expired = self.typing.sweep(now);
        if !expired.is_empty() {
            tracing::debug!(?expired, "typing indicators expired");
            actions.push(self.typing_changed());
        }

        actions
    }

    fn handle_submit_name(&mut self, raw: &str) -> Result<Vec<ClientAction>, ClientError> {
        let (user, join) = self.session.submit_name(raw)?;

        tracing::info!(name = user.name(), "joining room");
        Ok(vec![ClientAction::Emit(join), ClientAction::Joined(user)])
    }

    fn handle_text_changed(&mut self, text: &str) -> Result<Vec<ClientAction>, ClientError> {
        let user = self.session.user().ok_or(ClientError::NotJoined { operation: "typing" })?;
        let now = self.env.now();

        Ok(self
            .typing
            .text_changed(text, user.name(), now)
            .map(ClientAction::Emit)
            .into_iter()
            .collect())
    }

    fn handle_send_message(&mut self, text: &str) -> Result<Vec<ClientAction>, ClientError> {
        let user = self.session.user().ok_or(ClientError::NotJoined { operation: "send" })?;
        let now_millis = self.env.wall_clock_millis();

        match self.log.send_local(text, user, now_millis) {
            Ok(message) => Ok(vec![
                ClientAction::MessageAppended {
                    message: message.clone(),
                    origin: MessageOrigin::Local,
                },
                ClientAction::Emit(OutboundEvent::ChatMessage(message)),
            ]),
            Err(ValidationError::EmptyMessage) => {
                tracing::debug!("empty message not sent");
                Ok(Vec::new())
            },
            Err(e) => Err(e.into()),
        }
    }

    fn handle_teardown(&mut self) -> Vec<ClientAction> {
        self.disposed = true;
        self.typing.cancel();

        self.subscriptions.release_all().into_iter().map(ClientAction::Unsubscribe).collect()
    }

    fn handle_disposed(
        &mut self,
        event: ClientEvent<E::Instant>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::Connected
            | ClientEvent::Disconnected
            | ClientEvent::Received(_)
            | ClientEvent::Tick { .. }
            | ClientEvent::Teardown => {
                tracing::debug!(?event, "client disposed, ignoring");
                Ok(Vec::new())
            },
            ClientEvent::SubmitName { .. }
            | ClientEvent::TextChanged { .. }
            | ClientEvent::SendMessage { .. } => Err(ClientError::Disposed),
        }
    }

    fn typing_changed(&self) -> ClientAction {
        ClientAction::TypingChanged { typers: self.typers().map(str::to_string).collect() }
    }

    /// Configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    /// Local user. `None` until joined.
    pub fn user(&self) -> Option<&User> {
        self.session.user()
    }

    /// Whether the local user has joined the room.
    pub fn is_joined(&self) -> bool {
        self.session.is_joined()
    }

    /// Room history in insertion order.
    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    /// Whether the local user authored `message`. Compares display names.
    pub fn is_mine(&self, message: &Message) -> bool {
        self.session.user().is_some_and(|u| message.is_from(u.name()))
    }

    /// Peers currently typing, in the order they started.
    pub fn typers(&self) -> impl Iterator<Item = &str> {
        self.typing.typers()
    }

    /// Whether the local user is in the Typing state.
    pub fn is_typing(&self) -> bool {
        self.typing.is_self_typing()
    }

    /// Time until the client needs a [`ClientEvent::Tick`]. `None` if no
    /// timer is pending.
    pub fn time_until_next_deadline(&self, now: E::Instant) -> Option<Duration> {
        self.typing.time_until_next_deadline(now)
    }

    /// Inbound events with a live handler.
    pub fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    /// Whether teardown has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
