//! Protocol-to-Application translation layer.
//!
//! The [`Bridge`] wraps the low-level [`huddle_client::Client`] and adapts
//! it to the high-level application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts high-level [`crate::AppAction`] into client events.
//! - Accumulates outgoing [`TransportCommand`]s to be sent by the driver in
//!   the next I/O cycle.
//! - Interprets results from the client and converts them back into
//!   [`crate::AppEvent`]s to update the UI.
//! - Manages time ticks generically to support both real-time execution and
//!   deterministic simulation.

use std::time::Duration;

use huddle_client::{
    Client, ClientAction, ClientConfig, ClientError, ClientEvent, ConnectionState, Environment,
};
use huddle_core::{TransportCommand, TransportEvent};

use crate::{AppAction, AppEvent};

/// Bridge between App and Client protocol logic.
///
/// Generic over Environment to support both production and simulation.
/// The Instant type is determined by the Environment's associated type.
pub struct Bridge<E: Environment> {
    client: Client<E>,
    outgoing: Vec<TransportCommand>,
}

impl<E: Environment> Bridge<E> {
    /// Create a new Bridge with default client configuration.
    pub fn new(env: E) -> Self {
        Self::with_config(env, ClientConfig::default())
    }

    /// Create a new Bridge with the given client configuration.
    pub fn with_config(env: E, config: ClientConfig) -> Self {
        Self { client: Client::with_config(env, config), outgoing: Vec::new() }
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        let event = match action {
            AppAction::SubmitName { raw } => ClientEvent::SubmitName { raw },
            AppAction::ComposeChanged { text } => ClientEvent::TextChanged { text },
            AppAction::SendMessage { text } => ClientEvent::SendMessage { text },
            AppAction::Render | AppAction::Quit => return vec![],
        };

        let result = self.client.handle(event);
        self.handle_client_result(result)
    }

    /// Handle a notification from the transport.
    pub fn handle_transport_event(&mut self, event: TransportEvent) -> Vec<AppEvent> {
        let event = match event {
            TransportEvent::Connected => ClientEvent::Connected,
            TransportEvent::Disconnected => ClientEvent::Disconnected,
            TransportEvent::Delivered(wire) => ClientEvent::Received(wire),
        };

        let result = self.client.handle(event);
        self.handle_client_result(result)
    }

    /// Process a time tick.
    pub fn handle_tick(&mut self, now: E::Instant) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Tick { now });
        self.handle_client_result(result)
    }

    /// Tear the session down. Queues the release of every handler.
    pub fn teardown(&mut self) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Teardown);
        self.handle_client_result(result)
    }

    /// Take pending outgoing commands.
    pub fn take_outgoing(&mut self) -> Vec<TransportCommand> {
        std::mem::take(&mut self.outgoing)
    }

    /// Time until the client needs a tick. `None` if nothing is pending.
    pub fn time_until_next_deadline(&self, now: E::Instant) -> Option<Duration> {
        self.client.time_until_next_deadline(now)
    }

    /// Underlying client.
    pub fn client(&self) -> &Client<E> {
        &self.client
    }

    fn handle_client_result(
        &mut self,
        result: Result<Vec<ClientAction>, ClientError>,
    ) -> Vec<AppEvent> {
        match result {
            Ok(actions) => self.process_client_actions(actions),
            Err(e @ ClientError::Protocol(_)) => {
                tracing::warn!("dropping inbound event: {e}");
                vec![]
            },
            Err(e) => vec![AppEvent::Error { message: e.to_string() }],
        }
    }

    fn process_client_actions(&mut self, actions: Vec<ClientAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                ClientAction::Emit(event) => match event.to_wire() {
                    Ok(wire) => self.outgoing.push(TransportCommand::Emit(wire)),
                    Err(e) => tracing::warn!(event = %event.name(), "failed to encode: {e}"),
                },
                ClientAction::Subscribe(name) => {
                    self.outgoing.push(TransportCommand::Subscribe(name));
                },
                ClientAction::Unsubscribe(name) => {
                    self.outgoing.push(TransportCommand::Unsubscribe(name));
                },
                ClientAction::ConnectionChanged(ConnectionState::Connected) => {
                    events.push(AppEvent::Connected);
                },
                ClientAction::ConnectionChanged(ConnectionState::Disconnected) => {
                    events.push(AppEvent::Disconnected);
                },
                ClientAction::Joined(user) => {
                    events.push(AppEvent::Joined { name: user.name().to_string() });
                },
                ClientAction::MessageAppended { message, .. } => {
                    events.push(AppEvent::MessageAppended(message));
                },
                ClientAction::TypingChanged { typers } => {
                    events.push(AppEvent::TypingChanged { typers });
                },
                ClientAction::RoomNotice { name } => {
                    events.push(AppEvent::RoomNotice { name });
                },
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use std::{
        future::Future,
        pin::Pin,
        task::{Context, Poll},
    };

    use huddle_core::{EventName, InboundEvent, WireEvent};

    use super::*;

    struct ImmediateFuture;

    impl Future for ImmediateFuture {
        type Output = ();
        fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
            Poll::Ready(())
        }
    }

    #[derive(Clone)]
    struct TestEnv;

    impl Environment for TestEnv {
        type Instant = std::time::Instant;
        fn now(&self) -> std::time::Instant {
            std::time::Instant::now()
        }

        fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
            ImmediateFuture
        }

        fn wall_clock_millis(&self) -> u64 {
            1_700_000_000_000
        }
    }

    fn joined_bridge() -> Bridge<TestEnv> {
        let mut bridge = Bridge::new(TestEnv);
        bridge.handle_transport_event(TransportEvent::Connected);
        bridge.process_app_action(AppAction::SubmitName { raw: "Alice".into() });
        bridge.take_outgoing();
        bridge
    }

    #[test]
    fn connect_queues_subscriptions() {
        let mut bridge: Bridge<TestEnv> = Bridge::new(TestEnv);
        let events = bridge.handle_transport_event(TransportEvent::Connected);

        assert_eq!(events, [AppEvent::Connected]);
        let subscribed = bridge
            .take_outgoing()
            .into_iter()
            .filter(|c| matches!(c, TransportCommand::Subscribe(_)))
            .count();
        assert_eq!(subscribed, EventName::INBOUND.len());
    }

    #[test]
    fn submit_name_emits_join_and_reports_joined() {
        let mut bridge: Bridge<TestEnv> = Bridge::new(TestEnv);
        let events = bridge.process_app_action(AppAction::SubmitName { raw: " Alice ".into() });

        assert_eq!(events, [AppEvent::Joined { name: "Alice".into() }]);
        let outgoing = bridge.take_outgoing();
        let [TransportCommand::Emit(wire)] = outgoing.as_slice() else {
            panic!("unexpected outgoing: {outgoing:?}");
        };
        assert_eq!(wire.encode().unwrap(), r#"["joinRoom","Alice"]"#);
    }

    #[test]
    fn empty_name_produces_error() {
        let mut bridge: Bridge<TestEnv> = Bridge::new(TestEnv);
        let events = bridge.process_app_action(AppAction::SubmitName { raw: "  ".into() });

        assert!(matches!(events.as_slice(), [AppEvent::Error { .. }]));
        assert!(bridge.take_outgoing().is_empty());
    }

    #[test]
    fn send_message_appends_then_emits() {
        let mut bridge = joined_bridge();
        let events = bridge.process_app_action(AppAction::SendMessage { text: "hello".into() });

        assert!(matches!(events.as_slice(), [AppEvent::MessageAppended(m)] if m.text == "hello"));
        assert!(matches!(bridge.take_outgoing().as_slice(), [TransportCommand::Emit(w)] if w.name == "chatMessage"));
    }

    #[test]
    fn garbage_delivery_is_dropped_quietly() {
        let mut bridge = joined_bridge();
        let wire = WireEvent::new(EventName::ChatMessage, serde_json::json!(42));

        assert!(bridge.handle_transport_event(TransportEvent::Delivered(wire)).is_empty());
    }

    #[test]
    fn delivered_typing_updates_typers() {
        let mut bridge = joined_bridge();
        let wire = InboundEvent::Typing("Bob".into()).to_wire().unwrap();

        let events = bridge.handle_transport_event(TransportEvent::Delivered(wire));
        assert_eq!(events, [AppEvent::TypingChanged { typers: vec!["Bob".into()] }]);
    }

    #[test]
    fn teardown_queues_unsubscribes() {
        let mut bridge = joined_bridge();
        bridge.teardown();

        let outgoing = bridge.take_outgoing();
        assert_eq!(outgoing.len(), EventName::INBOUND.len());
        assert!(outgoing.iter().all(|c| matches!(c, TransportCommand::Unsubscribe(_))));
    }
}
