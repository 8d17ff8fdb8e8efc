//! Scenario tests for the client state machine.
//!
//! Each test drives a `Client` through a realistic sequence of transport and
//! user events on a virtual clock and checks the emitted actions plus the
//! resulting state.

use std::{
    ops::Sub,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use huddle_client::{
    Client, ClientAction, ClientConfig, ClientError, ClientEvent, ConnectionState, Environment,
    EventName, Message, MessageOrigin, OutboundEvent, WireEvent,
};
use huddle_core::{InboundEvent, ValidationError};
use serde_json::json;

/// Virtual instant in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Ms(u64);

impl Sub for Ms {
    type Output = Duration;
    fn sub(self, rhs: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(rhs.0))
    }
}

/// Manually advanced clock. Wall clock and monotonic clock move together.
#[derive(Clone, Default)]
struct TestEnv {
    millis: Arc<AtomicU64>,
}

impl TestEnv {
    fn at(millis: u64) -> Self {
        Self { millis: Arc::new(AtomicU64::new(millis)) }
    }

    fn advance(&self, millis: u64) -> Ms {
        Ms(self.millis.fetch_add(millis, Ordering::SeqCst) + millis)
    }
}

impl Environment for TestEnv {
    type Instant = Ms;

    fn now(&self) -> Ms {
        Ms(self.millis.load(Ordering::SeqCst))
    }

    async fn sleep(&self, _duration: Duration) {}

    fn wall_clock_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

fn connected_client(env: &TestEnv) -> Client<TestEnv> {
    let mut client = Client::new(env.clone());
    client.handle(ClientEvent::Connected).unwrap();
    client
}

fn joined_client(env: &TestEnv, name: &str) -> Client<TestEnv> {
    let mut client = connected_client(env);
    client.handle(ClientEvent::SubmitName { raw: name.into() }).unwrap();
    client
}

fn deliver(event: InboundEvent) -> ClientEvent<Ms> {
    ClientEvent::Received(event.to_wire().unwrap())
}

fn emitted(actions: &[ClientAction]) -> Vec<OutboundEvent> {
    actions
        .iter()
        .filter_map(|a| match a {
            ClientAction::Emit(event) => Some(event.clone()),
            _ => None,
        })
        .collect()
}

fn typers(client: &Client<TestEnv>) -> Vec<String> {
    client.typers().map(str::to_string).collect()
}

#[test]
fn connect_registers_all_inbound_handlers() {
    let env = TestEnv::default();
    let mut client = Client::new(env);

    let actions = client.handle(ClientEvent::Connected).unwrap();

    assert_eq!(actions[0], ClientAction::ConnectionChanged(ConnectionState::Connected));
    let subscribed: Vec<_> = actions
        .iter()
        .filter_map(|a| match a {
            ClientAction::Subscribe(name) => Some(*name),
            _ => None,
        })
        .collect();
    assert_eq!(subscribed.len(), 4);
    for name in EventName::INBOUND {
        assert!(subscribed.contains(&name), "{name} not subscribed");
    }
}

#[test]
fn alice_joins_and_sends() {
    let env = TestEnv::at(1_700_000_000_000);
    let mut alice = connected_client(&env);

    let actions = alice.handle(ClientEvent::SubmitName { raw: "  Alice ".into() }).unwrap();
    assert_eq!(emitted(&actions), [OutboundEvent::JoinRoom("Alice".into())]);
    assert!(alice.is_joined());

    env.advance(1_000);
    let actions = alice.handle(ClientEvent::SendMessage { text: " hi ".into() }).unwrap();

    let [
        ClientAction::MessageAppended { message, origin: MessageOrigin::Local },
        ClientAction::Emit(OutboundEvent::ChatMessage(sent)),
    ] = actions.as_slice()
    else {
        panic!("unexpected actions: {actions:?}");
    };
    assert_eq!(message, sent);
    assert_eq!(message.sender, "Alice");
    assert_eq!(message.text, "hi");
    assert_eq!(message.timestamp, 1_700_000_001_000);
    assert_eq!(alice.messages(), [message.clone()]);
    assert!(alice.is_mine(message));
}

#[test]
fn empty_name_is_rejected_and_retry_works() {
    let env = TestEnv::default();
    let mut client = connected_client(&env);

    let err = client.handle(ClientEvent::SubmitName { raw: "   ".into() }).unwrap_err();
    assert_eq!(err, ClientError::Validation(ValidationError::EmptyName));
    assert!(!client.is_joined());

    let actions = client.handle(ClientEvent::SubmitName { raw: "Bob".into() }).unwrap();
    assert_eq!(emitted(&actions), [OutboundEvent::JoinRoom("Bob".into())]);
}

#[test]
fn second_join_is_rejected() {
    let env = TestEnv::default();
    let mut client = joined_client(&env, "Alice");

    let err = client.handle(ClientEvent::SubmitName { raw: "Eve".into() }).unwrap_err();
    assert_eq!(err, ClientError::AlreadyJoined { name: "Alice".into() });
}

#[test]
fn empty_send_is_a_no_op() {
    let env = TestEnv::default();
    let mut client = joined_client(&env, "Alice");

    let actions = client.handle(ClientEvent::SendMessage { text: " \t ".into() }).unwrap();
    assert!(actions.is_empty());
    assert!(client.messages().is_empty());
}

#[test]
fn intents_before_join_are_rejected() {
    let env = TestEnv::default();
    let mut client = connected_client(&env);

    assert!(matches!(
        client.handle(ClientEvent::SendMessage { text: "hi".into() }),
        Err(ClientError::NotJoined { .. })
    ));
    assert!(matches!(
        client.handle(ClientEvent::TextChanged { text: "h".into() }),
        Err(ClientError::NotJoined { .. })
    ));
}

#[test]
fn bob_sees_typing_then_stop() {
    let env = TestEnv::default();
    let mut bob = joined_client(&env, "Bob");

    let actions = bob.handle(deliver(InboundEvent::Typing("Alice".into()))).unwrap();
    assert_eq!(actions, [ClientAction::TypingChanged { typers: vec!["Alice".into()] }]);

    // Chatty typing repeats do not change the set.
    let actions = bob.handle(deliver(InboundEvent::Typing("Alice".into()))).unwrap();
    assert!(actions.is_empty());

    let actions = bob.handle(deliver(InboundEvent::StopTyping("Alice".into()))).unwrap();
    assert_eq!(actions, [ClientAction::TypingChanged { typers: vec![] }]);

    // Stop for someone not typing is a no-op.
    let actions = bob.handle(deliver(InboundEvent::StopTyping("Carol".into()))).unwrap();
    assert!(actions.is_empty());
}

#[test]
fn bob_receives_alice_message() {
    let env = TestEnv::default();
    let mut bob = joined_client(&env, "Bob");
    let message = Message { id: 42, sender: "Alice".into(), text: "hello".into(), timestamp: 42 };

    let actions = bob.handle(deliver(InboundEvent::ChatMessage(message.clone()))).unwrap();
    assert_eq!(
        actions,
        [ClientAction::MessageAppended { message: message.clone(), origin: MessageOrigin::Remote }]
    );
    assert!(!bob.is_mine(&message));
}

#[test]
fn room_notice_is_informational() {
    let env = TestEnv::default();
    let mut bob = joined_client(&env, "Bob");

    let actions = bob.handle(deliver(InboundEvent::RoomNotice("Carol".into()))).unwrap();
    assert_eq!(actions, [ClientAction::RoomNotice { name: "Carol".into() }]);
    assert!(bob.messages().is_empty());
}

#[test]
fn relayed_own_message_is_not_duplicated() {
    let env = TestEnv::default();
    let mut alice = joined_client(&env, "Alice");

    let actions = alice.handle(ClientEvent::SendMessage { text: "hi".into() }).unwrap();
    let [_, ClientAction::Emit(OutboundEvent::ChatMessage(sent))] = actions.as_slice() else {
        panic!("unexpected actions: {actions:?}");
    };

    let actions = alice.handle(deliver(InboundEvent::ChatMessage(sent.clone()))).unwrap();
    assert!(actions.is_empty());
    assert_eq!(alice.messages().len(), 1);
}

#[test]
fn relayed_own_message_is_duplicated_without_dedupe() {
    let env = TestEnv::default();
    let config = ClientConfig::default().with_dedupe_messages(false);
    let mut alice = Client::with_config(env, config);
    alice.handle(ClientEvent::Connected).unwrap();
    alice.handle(ClientEvent::SubmitName { raw: "Alice".into() }).unwrap();

    let actions = alice.handle(ClientEvent::SendMessage { text: "hi".into() }).unwrap();
    let [_, ClientAction::Emit(OutboundEvent::ChatMessage(sent))] = actions.as_slice() else {
        panic!("unexpected actions: {actions:?}");
    };
    alice.handle(deliver(InboundEvent::ChatMessage(sent.clone()))).unwrap();

    assert_eq!(alice.messages().len(), 2);
}

#[test]
fn debounce_fires_once_after_last_change() {
    let env = TestEnv::default();
    let mut alice = joined_client(&env, "Alice");

    alice.handle(ClientEvent::TextChanged { text: "h".into() }).unwrap();
    env.advance(200);
    alice.handle(ClientEvent::TextChanged { text: "he".into() }).unwrap();
    env.advance(700);
    alice.handle(ClientEvent::TextChanged { text: "hey".into() }).unwrap();

    let mut stops = Vec::new();
    for _ in 0..30 {
        let now = env.advance(100);
        let actions = alice.handle(ClientEvent::Tick { now }).unwrap();
        for event in emitted(&actions) {
            stops.push((now, event));
        }
    }

    assert_eq!(stops, [(Ms(1_900), OutboundEvent::StopTyping("Alice".into()))]);
    assert!(!alice.is_typing());
}

#[test]
fn every_change_announces_typing() {
    let env = TestEnv::default();
    let mut alice = joined_client(&env, "Alice");

    for text in ["h", "hi", "hi!"] {
        let actions = alice.handle(ClientEvent::TextChanged { text: text.into() }).unwrap();
        assert_eq!(emitted(&actions), [OutboundEvent::Typing("Alice".into())]);
    }

    let actions = alice.handle(ClientEvent::TextChanged { text: String::new() }).unwrap();
    assert!(actions.is_empty());
}

#[test]
fn deadline_tracks_debounce() {
    let env = TestEnv::default();
    let mut alice = joined_client(&env, "Alice");
    assert_eq!(alice.time_until_next_deadline(env.now()), None);

    alice.handle(ClientEvent::TextChanged { text: "h".into() }).unwrap();
    let now = env.advance(400);
    assert_eq!(alice.time_until_next_deadline(now), Some(Duration::from_millis(600)));
}

#[test]
fn silent_peer_expires_from_typing_set() {
    let env = TestEnv::default();
    let mut bob = joined_client(&env, "Bob");

    bob.handle(deliver(InboundEvent::Typing("Alice".into()))).unwrap();
    let now = env.advance(4_999);
    assert!(bob.handle(ClientEvent::Tick { now }).unwrap().is_empty());

    let now = env.advance(1);
    let actions = bob.handle(ClientEvent::Tick { now }).unwrap();
    assert_eq!(actions, [ClientAction::TypingChanged { typers: vec![] }]);
}

#[test]
fn reconnect_twice_dispatches_exactly_once() {
    let env = TestEnv::default();
    let mut bob = joined_client(&env, "Bob");

    for _ in 0..2 {
        bob.handle(ClientEvent::Disconnected).unwrap();
        let actions = bob.handle(ClientEvent::Connected).unwrap();

        // Every registered handler is released before it is registered again.
        let first_subscribe =
            actions.iter().position(|a| matches!(a, ClientAction::Subscribe(_))).unwrap();
        let last_unsubscribe =
            actions.iter().rposition(|a| matches!(a, ClientAction::Unsubscribe(_))).unwrap();
        assert!(last_unsubscribe < first_subscribe);
    }
    assert_eq!(bob.subscriptions().len(), 4);

    let message = Message { id: 9, sender: "Alice".into(), text: "once".into(), timestamp: 9 };
    let actions = bob.handle(deliver(InboundEvent::ChatMessage(message))).unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(bob.messages().len(), 1);
}

#[test]
fn connect_while_connected_does_not_repeat_state_change() {
    let env = TestEnv::default();
    let mut client = connected_client(&env);

    let actions = client.handle(ClientEvent::Connected).unwrap();
    assert!(!actions.contains(&ClientAction::ConnectionChanged(ConnectionState::Connected)));
}

#[test]
fn disconnect_keeps_state() {
    let env = TestEnv::default();
    let mut bob = joined_client(&env, "Bob");
    bob.handle(deliver(InboundEvent::Typing("Alice".into()))).unwrap();

    let actions = bob.handle(ClientEvent::Disconnected).unwrap();
    assert_eq!(actions, [ClientAction::ConnectionChanged(ConnectionState::Disconnected)]);
    assert!(bob.is_joined());
    assert_eq!(typers(&bob), ["Alice"]);
    assert_eq!(bob.subscriptions().len(), 4);
}

#[test]
fn undecodable_event_is_an_error_without_state_change() {
    let env = TestEnv::default();
    let mut bob = joined_client(&env, "Bob");

    let bad_payload = WireEvent::new(EventName::ChatMessage, json!("not a message"));
    assert!(matches!(
        bob.handle(ClientEvent::Received(bad_payload)),
        Err(ClientError::Protocol(_))
    ));

    let unknown = WireEvent { name: "leaveRoom".into(), payload: json!("Alice") };
    assert!(matches!(bob.handle(ClientEvent::Received(unknown)), Err(ClientError::Protocol(_))));
    assert!(bob.messages().is_empty());
}

#[test]
fn events_before_connect_are_ignored() {
    let env = TestEnv::default();
    let mut client = Client::new(env);

    let actions = client.handle(deliver(InboundEvent::Typing("Alice".into()))).unwrap();
    assert!(actions.is_empty());
    assert!(typers(&client).is_empty());
}

#[test]
fn teardown_releases_handlers_and_cancels_timer() {
    let env = TestEnv::default();
    let mut alice = joined_client(&env, "Alice");
    alice.handle(ClientEvent::TextChanged { text: "h".into() }).unwrap();

    let actions = alice.handle(ClientEvent::Teardown).unwrap();
    assert_eq!(actions.len(), 4);
    assert!(actions.iter().all(|a| matches!(a, ClientAction::Unsubscribe(_))));
    assert!(alice.subscriptions().is_empty());
    assert!(alice.is_disposed());

    let now = env.advance(10_000);
    assert!(alice.handle(ClientEvent::Tick { now }).unwrap().is_empty());
    assert!(alice.handle(ClientEvent::Connected).unwrap().is_empty());
    assert!(alice.handle(deliver(InboundEvent::Typing("Bob".into()))).unwrap().is_empty());
    assert_eq!(
        alice.handle(ClientEvent::SendMessage { text: "late".into() }),
        Err(ClientError::Disposed)
    );
}
