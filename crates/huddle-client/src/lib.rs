//! Client
//!
//! Action-based client state machine for Huddle group chat. Reconciles
//! transport lifecycle, inbound chat messages and typing signals into
//! render-ready state, and runs the local typing debounce.
//!
//! # Architecture
//!
//! The client is Sans-IO. It receives events ([`ClientEvent`]), processes
//! them through pure state machine logic, and returns actions
//! ([`ClientAction`]) for the caller to execute. Time enters only through
//! [`huddle_core::Environment`] and [`ClientEvent::Tick`].
//!
//! # Components
//!
//! - [`Client`]: event router owning all per-session state
//! - [`Session`]: local identity and membership
//! - [`MessageLog`]: ordered, deduplicated chat history
//! - [`TypingTracker`]: debounce timer and peer typing set
//! - [`SubscriptionRegistry`]: live inbound handlers
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::ConnectedClient`]: websocket-backed transport handle
//! - [`transport::connect`]: Connect to a server

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod event;
mod message_log;
mod session;
mod subscriptions;
mod typing;

#[cfg(feature = "transport")]
pub mod transport;

pub use client::Client;
pub use config::{ClientConfig, DEFAULT_PEER_TYPING_TTL, DEFAULT_TYPING_DEBOUNCE, TypingSignal};
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent, ConnectionState, MessageOrigin};
pub use huddle_core::{Environment, EventName, Message, OutboundEvent, User, WireEvent};
pub use message_log::MessageLog;
pub use session::Session;
pub use subscriptions::{SubscriptionChanges, SubscriptionRegistry};
pub use typing::TypingTracker;
