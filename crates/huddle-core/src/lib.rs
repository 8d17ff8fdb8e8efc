//! Huddle core
//!
//! Domain types, the transport event contract and the environment
//! abstraction shared by every Huddle crate. Nothing here performs I/O.
//!
//! # Components
//!
//! - [`User`], [`Message`]: chat domain types
//! - [`EventName`], [`InboundEvent`], [`OutboundEvent`], [`WireEvent`]: the
//!   named-event contract spoken with the transport
//! - [`Environment`]: injectable time source for deterministic testing

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod env;
mod error;
mod message;
pub mod wire;

pub use env::Environment;
pub use error::{ProtocolError, ValidationError};
pub use message::{Message, MessageId, User};
pub use wire::{
    EventName, InboundEvent, OutboundEvent, TransportCommand, TransportEvent, WireEvent,
};
