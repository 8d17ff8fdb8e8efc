//! Fuzz target for the client's typing debounce and event routing
//!
//! Drives a joined client with arbitrary edits, sends, clock advances,
//! reconnects and raw inbound frames.
//!
//! # Invariants
//!
//! - `stopTyping` is only emitted once the quiet period since the last edit
//!   has fully elapsed
//! - At most one `stopTyping` per edit burst
//! - At most one handler per inbound event name
//! - Message ids in the log are unique

#![no_main]

use std::{collections::HashSet, time::Duration};

use arbitrary::Arbitrary;
use huddle_client::{Client, ClientAction, ClientEvent, Environment, OutboundEvent};
use huddle_core::WireEvent;
use huddle_harness::SimEnv;
use libfuzzer_sys::fuzz_target;

const DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Edit(String),
    Send(String),
    Advance(u16),
    Tick,
    Reconnect,
    Deliver(Vec<u8>),
}

fuzz_target!(|ops: Vec<Op>| {
    let env = SimEnv::new();
    let mut client = Client::new(env.clone());
    let _ = client.handle(ClientEvent::Connected);
    let _ = client.handle(ClientEvent::SubmitName { raw: "fuzz".into() });

    let mut last_edit: Option<u64> = None;
    let mut stopped_since_edit = true;

    for op in ops {
        let event = match op {
            Op::Edit(text) => {
                last_edit = Some(env.now().as_millis());
                stopped_since_edit = false;
                ClientEvent::TextChanged { text }
            },
            Op::Send(text) => ClientEvent::SendMessage { text },
            Op::Advance(ms) => {
                env.advance(Duration::from_millis(u64::from(ms)));
                continue;
            },
            Op::Tick => ClientEvent::Tick { now: env.now() },
            Op::Reconnect => {
                let _ = client.handle(ClientEvent::Disconnected);
                ClientEvent::Connected
            },
            Op::Deliver(bytes) => match WireEvent::decode_slice(&bytes) {
                Ok(wire) => ClientEvent::Received(wire),
                Err(_) => continue,
            },
        };

        let Ok(actions) = client.handle(event) else {
            continue;
        };

        for action in actions {
            if let ClientAction::Emit(OutboundEvent::StopTyping(_)) = action {
                let armed_at = last_edit.expect("stopTyping without an edit");
                assert!(
                    env.now().as_millis() - armed_at >= DEBOUNCE.as_millis() as u64,
                    "stopTyping before the quiet period elapsed"
                );
                assert!(!stopped_since_edit, "second stopTyping for one burst");
                stopped_since_edit = true;
            }
        }

        assert!(client.subscriptions().len() <= 4);
        let ids: HashSet<_> = client.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), client.messages().len(), "duplicate message id");
    }
});
