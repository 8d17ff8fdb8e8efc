//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`huddle_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Input comes from a script of [`Step`]s. Waits advance the shared
//! [`SimEnv`] clock; if the runtime asked for a wake-up that falls inside a
//! wait, the wait is split and the timer fires first. Once the script is
//! exhausted pending timers are drained and the driver reports
//! [`DriverEvent::Closed`].

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use huddle_app::{App, Driver, DriverEvent, KeyInput};
use huddle_core::{Environment, TransportCommand};

use crate::{
    SimEnv, SimInstant, SimTransport,
    invariants::{ClientSnapshot, InvariantRegistry, SystemSnapshot},
};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// One scripted input step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Press a key.
    Key(KeyInput),
    /// Let virtual time pass.
    Wait(Duration),
    /// Drop the transport connection.
    Disconnect,
    /// Restore the transport connection.
    Reconnect,
}

/// Shared state for script injection and inspection.
///
/// This allows injection from outside async contexts.
#[derive(Default)]
struct SharedState {
    script: VecDeque<Step>,
    sent: Vec<TransportCommand>,
    renders: usize,
    last_view: Option<App>,
    stopped: bool,
}

/// Simulation driver for deterministic testing.
///
/// Clones share the script and captured output, so a test can keep one
/// clone for inspection while the runtime owns another.
#[derive(Clone)]
pub struct SimDriver {
    env: SimEnv,
    transport: SimTransport,
    state: Arc<Mutex<SharedState>>,
    invariants: Option<Arc<InvariantRegistry>>,
}

impl SimDriver {
    /// Create a driver with an empty script.
    pub fn new(env: SimEnv, transport: SimTransport) -> Self {
        Self { env, transport, state: Arc::default(), invariants: None }
    }

    /// Enable invariant checking on every render.
    ///
    /// Checks run against the rendered view and assume the client drops
    /// duplicate message ids.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(Arc::new(registry));
        self
    }

    /// Append a script step.
    pub fn push(&self, step: Step) -> &Self {
        self.lock().script.push_back(step);
        self
    }

    /// Append a key press.
    pub fn press(&self, key: KeyInput) -> &Self {
        self.push(Step::Key(key))
    }

    /// Append one key press per character.
    pub fn type_text(&self, text: &str) -> &Self {
        self.lock().script.extend(text.chars().map(|c| Step::Key(KeyInput::Char(c))));
        self
    }

    /// Type a line and press Enter.
    pub fn enter_line(&self, text: &str) -> &Self {
        self.type_text(text).press(KeyInput::Enter)
    }

    /// Append a wait.
    pub fn wait(&self, duration: Duration) -> &Self {
        self.push(Step::Wait(duration))
    }

    /// Commands the runtime handed to the transport, in order.
    pub fn sent(&self) -> Vec<TransportCommand> {
        self.lock().sent.clone()
    }

    /// Number of renders.
    pub fn render_count(&self) -> usize {
        self.lock().renders
    }

    /// App as of the last render.
    pub fn last_view(&self) -> Option<App> {
        self.lock().last_view.clone()
    }

    /// Whether the runtime stopped the driver.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Transport this driver talks through.
    pub fn transport(&self) -> &SimTransport {
        &self.transport
    }

    /// Check invariants against App state.
    pub fn check_invariants(&self, app: &App, context: &str) {
        if let Some(registry) = &self.invariants {
            let snapshot = SystemSnapshot::single(ClientSnapshot::from_app(app));
            registry.assert_all(&snapshot, context);
        }
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = SimInstant;

    async fn next_event(&mut self, timer: Option<Duration>) -> Result<DriverEvent, Self::Error> {
        loop {
            if let Some(event) = self.transport.recv() {
                return Ok(DriverEvent::Transport(event));
            }

            let step = self.lock().script.pop_front();
            match step {
                Some(Step::Key(key)) => return Ok(DriverEvent::Input(key)),
                Some(Step::Wait(wait)) => match timer {
                    Some(due) if due <= wait => {
                        self.env.advance(due);
                        let rest = wait - due;
                        if !rest.is_zero() {
                            self.lock().script.push_front(Step::Wait(rest));
                        }
                        return Ok(DriverEvent::TimerFired);
                    },
                    _ => {
                        self.env.advance(wait);
                    },
                },
                Some(Step::Disconnect) => self.transport.disconnect(),
                Some(Step::Reconnect) => self.transport.reconnect(),
                None => {
                    let Some(due) = timer else {
                        return Ok(DriverEvent::Closed);
                    };
                    self.env.advance(due);
                    return Ok(DriverEvent::TimerFired);
                },
            }
        }
    }

    async fn send(&mut self, command: TransportCommand) -> Result<(), Self::Error> {
        self.lock().sent.push(command.clone());
        self.transport.send(command);
        Ok(())
    }

    fn now(&self) -> Self::Instant {
        self.env.now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        {
            let mut state = self.lock();
            state.renders += 1;
            state.last_view = Some(app.clone());
        }
        self.check_invariants(app, "after render");
        Ok(())
    }

    fn stop(&mut self) {
        self.lock().stopped = true;
    }
}
