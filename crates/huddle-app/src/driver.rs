//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, ops::Sub, time::Duration};

use huddle_core::{TransportCommand, TransportEvent};

use crate::{App, KeyInput};

/// Something the driver observed while the runtime was waiting.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    /// Keyboard input.
    Input(KeyInput),
    /// Transport lifecycle change or inbound delivery.
    Transport(TransportEvent),
    /// The requested wake-up elapsed.
    TimerFired,
    /// Input was closed; the session should end.
    Closed,
}

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal client and simulation.
///
/// # Implementations
///
/// - **Terminal**: crossterm key events, ratatui rendering, websocket or
///   in-process room transport
/// - **Simulation**: Scripted input, in-memory hub, virtual clock
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Platform-specific error type
/// - [`Instant`](Driver::Instant): Time representation (real or virtual)
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Wait for the next event.
    ///
    /// `timer` is how long the runtime may sleep before the client needs a
    /// tick. When it elapses with nothing else ready, the driver returns
    /// [`DriverEvent::TimerFired`]. `None` means no wake-up is needed.
    fn next_event(
        &mut self,
        timer: Option<Duration>,
    ) -> impl Future<Output = Result<DriverEvent, Self::Error>> + Send;

    /// Hand a command to the transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport is gone.
    fn send(
        &mut self,
        command: TransportCommand,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Stop the connection and clean up resources.
    fn stop(&mut self);
}
