//! Virtual-time environment.
//!
//! Time only moves when a test (or [`crate::SimDriver`]) advances it. Clones
//! share the same clock, so every client in a simulation observes one
//! timeline.

use std::{
    ops::Sub,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use huddle_core::Environment;

/// Wall clock reading at virtual time zero (2023-11-14T22:13:20Z).
const DEFAULT_EPOCH_MILLIS: u64 = 1_700_000_000_000;

/// Virtual monotonic instant, in milliseconds since the simulation started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimInstant(u64);

impl SimInstant {
    /// Milliseconds since the simulation started.
    pub fn as_millis(self) -> u64 {
        self.0
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(rhs.0))
    }
}

/// Deterministic environment backed by a shared virtual clock.
#[derive(Debug, Clone)]
pub struct SimEnv {
    elapsed_millis: Arc<AtomicU64>,
    epoch_millis: u64,
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl SimEnv {
    /// Create a clock at virtual time zero.
    pub fn new() -> Self {
        Self::with_epoch(DEFAULT_EPOCH_MILLIS)
    }

    /// Create a clock whose wall-clock reading starts at `epoch_millis`.
    pub fn with_epoch(epoch_millis: u64) -> Self {
        Self { elapsed_millis: Arc::new(AtomicU64::new(0)), epoch_millis }
    }

    /// Move time forward. Returns the new instant.
    pub fn advance(&self, by: Duration) -> SimInstant {
        let by = by.as_millis() as u64;
        SimInstant(self.elapsed_millis.fetch_add(by, Ordering::SeqCst) + by)
    }

    /// Move time forward by `millis` milliseconds.
    pub fn advance_millis(&self, millis: u64) -> SimInstant {
        self.advance(Duration::from_millis(millis))
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        SimInstant(self.elapsed_millis.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        let env = self.clone();
        async move {
            env.advance(duration);
        }
    }

    fn wall_clock_millis(&self) -> u64 {
        self.epoch_millis + self.elapsed_millis.load(Ordering::SeqCst)
    }
}
