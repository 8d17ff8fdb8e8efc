//! Terminal driver for the client.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The room is reached over a
//! websocket or through the in-process server.

use std::{
    io::{self, Stdout, stdout},
    time::{Duration, Instant},
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use huddle_app::{App, Driver, DriverEvent, KeyInput};
use huddle_client::transport::{self, ConnectedClient, TransportError};
use huddle_core::{TransportCommand, TransportEvent};
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{
    server::{self, ServerHandle},
    ui,
};

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Connection to a room (either in-process or websocket).
enum Connection {
    /// In-process room server.
    InProcess(ServerHandle),
    /// Websocket connection to a remote server.
    Websocket(ConnectedClient),
}

impl Connection {
    fn to_server(&self) -> &mpsc::Sender<TransportCommand> {
        match self {
            Connection::InProcess(h) => &h.to_server,
            Connection::Websocket(h) => &h.to_server,
        }
    }

    fn from_server(&mut self) -> &mut mpsc::Receiver<TransportEvent> {
        match self {
            Connection::InProcess(h) => &mut h.from_server,
            Connection::Websocket(h) => &mut h.from_server,
        }
    }

    fn stop(&self) {
        match self {
            Connection::InProcess(h) => h.stop(),
            Connection::Websocket(h) => h.stop(),
        }
    }
}

/// Room connection plus whether it is still usable.
///
/// Once the link is closed no further events are read and outgoing commands
/// are dropped, so losing the room never ends the session with an error.
struct RoomLink {
    connection: Connection,
    closed: bool,
}

impl RoomLink {
    fn new(connection: Connection) -> Self {
        Self { connection, closed: false }
    }

    /// Wait for the next event from the room.
    ///
    /// A closed channel reads as [`TransportEvent::Disconnected`].
    async fn recv(&mut self) -> TransportEvent {
        let received = self.connection.from_server().recv().await;
        self.observe(received)
    }

    fn observe(&mut self, received: Option<TransportEvent>) -> TransportEvent {
        match received {
            Some(TransportEvent::Disconnected) => {
                tracing::warn!("room connection lost");
                self.closed = true;
                TransportEvent::Disconnected
            },
            Some(event) => event,
            None => {
                tracing::warn!("room connection closed");
                self.closed = true;
                TransportEvent::Disconnected
            },
        }
    }

    async fn send(&mut self, command: TransportCommand) {
        if self.closed {
            tracing::debug!(?command, "room connection closed, dropping command");
            return;
        }
        if let Err(e) = self.connection.to_server().send(command).await {
            tracing::warn!(command = ?e.0, "room connection closed while sending");
            self.closed = true;
        }
    }
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui), and the room
/// connection.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    link: RoomLink,
}

impl TerminalDriver {
    /// Connect to a websocket room server and take over the terminal.
    pub async fn connect(url: &str) -> Result<Self, TerminalError> {
        let client = transport::connect(url).await?;
        Self::create(Connection::Websocket(client))
    }

    /// Start an in-process room and take over the terminal.
    ///
    /// Must be called from within a tokio runtime.
    pub fn offline(echo_to_sender: bool) -> Result<Self, TerminalError> {
        Self::create(Connection::InProcess(server::spawn_server(echo_to_sender)))
    }

    fn create(connection: Connection) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self { terminal, event_stream: EventStream::new(), link: RoomLink::new(connection) })
    }

    /// Convert a crossterm key event to `KeyInput`.
    ///
    /// Ctrl+C quits like Esc, since raw mode swallows the signal.
    fn convert_key(key: KeyEvent) -> Option<KeyInput> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(KeyInput::Esc)
            },
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Esc => Some(KeyInput::Esc),
            _ => None,
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;
    type Instant = Instant;

    async fn next_event(&mut self, timer: Option<Duration>) -> Result<DriverEvent, Self::Error> {
        let deadline = async {
            match timer {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                biased;

                // Terminal events
                maybe_event = self.event_stream.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            if let Some(input) = Self::convert_key(key) {
                                return Ok(DriverEvent::Input(input));
                            }
                        },
                        Some(Ok(_)) => {},
                        Some(Err(e)) => return Err(TerminalError::Io(e)),
                        None => return Ok(DriverEvent::Closed),
                    }
                }

                // Events from the room
                event = self.link.recv(), if !self.link.closed => {
                    return Ok(DriverEvent::Transport(event));
                }

                // Client timer
                () = &mut deadline => return Ok(DriverEvent::TimerFired),
            }
        }
    }

    async fn send(&mut self, command: TransportCommand) -> Result<(), Self::Error> {
        self.link.send(command).await;
        Ok(())
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| {
            ui::render(frame, app);
        })?;
        Ok(())
    }

    fn stop(&mut self) {
        self.link.connection.stop();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;
    use huddle_core::OutboundEvent;

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent { code, modifiers, kind: KeyEventKind::Press, state: KeyEventState::NONE }
    }

    #[test]
    fn keys_map_to_inputs() {
        let none = KeyModifiers::NONE;
        assert_eq!(TerminalDriver::convert_key(key(KeyCode::Char('a'), none)), Some(KeyInput::Char('a')));
        assert_eq!(
            TerminalDriver::convert_key(key(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(KeyInput::Char('A'))
        );
        assert_eq!(TerminalDriver::convert_key(key(KeyCode::Enter, none)), Some(KeyInput::Enter));
        assert_eq!(TerminalDriver::convert_key(key(KeyCode::Left, none)), None);
    }

    #[test]
    fn ctrl_c_quits() {
        let event = key(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(TerminalDriver::convert_key(event), Some(KeyInput::Esc));
    }

    fn typing() -> TransportCommand {
        TransportCommand::Emit(OutboundEvent::Typing("Alice".into()).to_wire().unwrap())
    }

    /// Run a local room, read `Connected`, then kill the room task and wait
    /// until its channels are gone.
    async fn dead_room() -> RoomLink {
        let mut link = RoomLink::new(Connection::InProcess(server::spawn_server(false)));
        assert_eq!(link.recv().await, TransportEvent::Connected);
        link.connection.stop();
        while !link.connection.to_server().is_closed() {
            tokio::task::yield_now().await;
        }
        link
    }

    #[tokio::test]
    async fn disconnect_closes_link_before_channel_drops() {
        let mut link = RoomLink::new(Connection::InProcess(server::spawn_server(false)));
        assert_eq!(link.observe(Some(TransportEvent::Disconnected)), TransportEvent::Disconnected);
        assert!(link.closed);

        // Nothing reaches the room once the link is closed.
        link.send(typing()).await;
        link.connection.stop();
    }

    #[tokio::test]
    async fn send_after_room_dies_is_dropped() {
        let mut link = dead_room().await;
        assert!(!link.closed);

        link.send(typing()).await;
        assert!(link.closed);
        link.send(typing()).await;
    }

    #[tokio::test]
    async fn closed_event_channel_reads_as_disconnect() {
        let mut link = dead_room().await;

        assert_eq!(link.recv().await, TransportEvent::Disconnected);
        assert!(link.closed);
    }
}
