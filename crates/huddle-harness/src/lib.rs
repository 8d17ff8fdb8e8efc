//! Deterministic simulation harness for Huddle testing.
//!
//! Virtual-time implementations of the Environment and transport so whole
//! chat sessions run reproducibly inside a single test, with no sockets and
//! no wall-clock sleeps.
//!
//! # Components
//!
//! - [`SimEnv`]: manually advanced clock shared by every participant
//! - [`SimHub`] / [`SimTransport`]: in-memory room server with event-emitter
//!   semantics (handlers stack, `off` removes all of them)
//! - [`SimDriver`]: scripted [`huddle_app::Driver`] for the generic runtime
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for common
//! client invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_transport;

pub use invariants::{
    ClientSnapshot, DisposedHoldsNoHandlers, Invariant, InvariantRegistry, InvariantResult,
    NoDuplicateTypers, SubscriptionsAreInbound, SystemSnapshot, UniqueMessageIds, Violation,
};
pub use sim_driver::{SimDriver, SimDriverError, Step};
pub use sim_env::{SimEnv, SimInstant};
pub use sim_transport::{SimHub, SimTransport};
