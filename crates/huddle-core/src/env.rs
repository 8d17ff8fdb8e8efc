//! Environment abstraction for deterministic testing.
//!
//! Decouples client logic from system resources (monotonic time, wall clock).
//! Enables deterministic simulation with a virtual clock and production use
//! with real system time.

use std::time::Duration;

/// Abstract environment providing time and async primitives.
///
/// # Invariants
///
/// Implementations MUST guarantee:
///
/// - `now()` never goes backwards
/// - `wall_clock_millis()` is milliseconds since the Unix epoch; it MAY go
///   backwards (clock adjustments), callers must not rely on monotonicity
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`, while simulation
    /// environments use virtual time.
    type Instant: Copy + Ord + Send + Sync + std::fmt::Debug + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    ///
    /// # Invariants
    ///
    /// - This method MUST return values that never decrease within a single
    ///   execution context. Subsequent calls must return times >= previous
    ///   calls.
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// This is the ONLY async method in the trait, and it should only be used
    /// by driver code (not client logic).
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Wall-clock time in milliseconds since the Unix epoch.
    ///
    /// Used for message timestamps and time-based message ids.
    fn wall_clock_millis(&self) -> u64;
}
