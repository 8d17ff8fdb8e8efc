//! Shared participant plumbing for room tests.
//!
//! Each participant is a Bridge + App pair wired to its own `SimTransport`,
//! all sharing one virtual clock. `pump_all` delivers everything pending
//! until the room is quiet, so tests read as a sequence of user actions.

#![allow(dead_code)]

use std::time::Duration;

use huddle_app::{App, AppAction, AppEvent, Bridge, KeyInput};
use huddle_client::{ClientConfig, Environment};
use huddle_harness::{
    ClientSnapshot, InvariantRegistry, SimEnv, SimHub, SimTransport, SystemSnapshot,
};

pub struct Participant {
    pub app: App,
    pub bridge: Bridge<SimEnv>,
    pub transport: SimTransport,
}

impl Participant {
    pub fn connect(hub: &SimHub, env: &SimEnv) -> Self {
        Self::with_config(hub, env, ClientConfig::default())
    }

    pub fn with_config(hub: &SimHub, env: &SimEnv, config: ClientConfig) -> Self {
        let mut participant = Self {
            app: App::new(),
            bridge: Bridge::with_config(env.clone(), config),
            transport: hub.connect(),
        };
        participant.pump();
        participant
    }

    pub fn join(hub: &SimHub, env: &SimEnv, name: &str) -> Self {
        let mut participant = Self::connect(hub, env);
        participant.enter(name);
        participant
    }

    /// Feed a key through App and Bridge, flushing outgoing commands.
    pub fn key(&mut self, key: KeyInput) {
        let actions = self.app.handle(AppEvent::Key(key));
        self.process_actions(actions);
    }

    pub fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.key(KeyInput::Char(c));
        }
    }

    pub fn enter(&mut self, text: &str) {
        self.type_text(text);
        self.key(KeyInput::Enter);
    }

    pub fn process_actions(&mut self, actions: Vec<AppAction>) {
        let mut pending = actions;
        while !pending.is_empty() {
            for action in std::mem::take(&mut pending) {
                for event in self.bridge.process_app_action(action) {
                    pending.extend(self.app.handle(event));
                }
            }
        }
        self.flush();
    }

    pub fn flush(&mut self) {
        for command in self.bridge.take_outgoing() {
            self.transport.send(command);
        }
    }

    /// Deliver pending transport events. Returns true if anything happened.
    pub fn pump(&mut self) -> bool {
        let events = self.transport.drain();
        let busy = !events.is_empty();
        for event in events {
            for app_event in self.bridge.handle_transport_event(event) {
                let actions = self.app.handle(app_event);
                self.process_actions(actions);
            }
        }
        self.flush();
        busy
    }

    pub fn tick(&mut self, env: &SimEnv) {
        for app_event in self.bridge.handle_tick(env.now()) {
            let actions = self.app.handle(app_event);
            self.process_actions(actions);
        }
        self.flush();
    }

    pub fn texts(&self) -> Vec<&str> {
        self.app.messages().iter().map(|m| m.text.as_str()).collect()
    }

    pub fn snapshot(&self) -> ClientSnapshot {
        ClientSnapshot::from_client(self.bridge.client())
    }
}

pub fn pump_all(participants: &mut [&mut Participant]) {
    loop {
        let mut busy = false;
        for p in participants.iter_mut() {
            busy |= p.pump();
        }
        if !busy {
            break;
        }
    }
}

pub fn advance(env: &SimEnv, participants: &mut [&mut Participant], by: Duration) {
    env.advance(by);
    for p in participants.iter_mut() {
        p.tick(env);
    }
    pump_all(participants);
}

pub fn assert_invariants(participants: &[&Participant], context: &str) {
    let snapshot =
        SystemSnapshot::from_clients(participants.iter().map(|p| p.snapshot()).collect());
    InvariantRegistry::standard().assert_all(&snapshot, context);
}
