//! Terminal client for Huddle
//!
//! A thin shell over [`huddle_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`huddle_app::Runtime`].
//!
//! This crate only handles terminal rendering, the system clock and the room
//! connection.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod server;
pub mod system_env;
pub mod terminal;
pub mod ui;

pub use huddle_app::{App, AppAction, AppEvent, ConnectionState, Driver, KeyInput, Phase, Runtime};
pub use system_env::SystemEnv;
pub use terminal::{TerminalDriver, TerminalError};
