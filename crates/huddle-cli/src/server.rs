//! In-process room server.
//!
//! Runs a one-member room in-process using channels for transport, so the
//! terminal client works without a network. Handlers behave like the
//! websocket transport's: deliveries are filtered by subscribed name, one
//! delivery per registered handler.

use huddle_core::{EventName, InboundEvent, OutboundEvent, TransportCommand, TransportEvent};
use tokio::sync::mpsc;

/// Handle to a running in-process server.
pub struct ServerHandle {
    /// Send commands to the server.
    pub to_server: mpsc::Sender<TransportCommand>,
    /// Receive events from the server.
    pub from_server: mpsc::Receiver<TransportEvent>,
    /// Abort handle to stop the server task.
    abort_handle: tokio::task::AbortHandle,
}

impl ServerHandle {
    /// Stop the server.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Room state for the single local member.
#[derive(Debug, Default)]
struct Room {
    member: Option<String>,
    handlers: Vec<EventName>,
    echo_to_sender: bool,
}

impl Room {
    /// Apply a command and return the deliveries it causes.
    fn apply(&mut self, command: TransportCommand) -> Vec<TransportEvent> {
        let wire = match command {
            TransportCommand::Subscribe(name) => {
                self.handlers.push(name);
                return vec![];
            },
            TransportCommand::Unsubscribe(name) => {
                self.handlers.retain(|h| *h != name);
                return vec![];
            },
            TransportCommand::Emit(wire) => wire,
        };

        let inbound = match OutboundEvent::from_wire(&wire) {
            Ok(OutboundEvent::JoinRoom(name)) => {
                tracing::info!(%name, "member joined local room");
                self.member = Some(name);
                return vec![];
            },
            Ok(OutboundEvent::ChatMessage(message)) if self.echo_to_sender => {
                InboundEvent::ChatMessage(message)
            },
            // Nobody else is in the room.
            Ok(_) => return vec![],
            Err(e) => {
                tracing::warn!("local room rejected frame: {e}");
                return vec![];
            },
        };

        if self.member.is_none() {
            return vec![];
        }
        let Ok(delivered) = inbound.to_wire() else {
            return vec![];
        };
        let name = inbound.name();
        self.handlers
            .iter()
            .filter(|h| **h == name)
            .map(|_| TransportEvent::Delivered(delivered.clone()))
            .collect()
    }
}

/// Spawn an in-process room server.
///
/// The first event on `from_server` is [`TransportEvent::Connected`]. With
/// `echo_to_sender` the room relays chat messages back to their author, as
/// some servers do.
pub fn spawn_server(echo_to_sender: bool) -> ServerHandle {
    let (client_tx, mut server_rx) = mpsc::channel::<TransportCommand>(32);
    let (server_tx, client_rx) = mpsc::channel::<TransportEvent>(32);

    let handle = tokio::spawn(async move {
        let mut room = Room { echo_to_sender, ..Room::default() };

        if server_tx.send(TransportEvent::Connected).await.is_err() {
            return;
        }

        while let Some(command) = server_rx.recv().await {
            for event in room.apply(command) {
                if server_tx.send(event).await.is_err() {
                    tracing::debug!("local room client went away");
                    return;
                }
            }
        }
    });

    ServerHandle {
        to_server: client_tx,
        from_server: client_rx,
        abort_handle: handle.abort_handle(),
    }
}
