//! Websocket transport for the client.
//!
//! Provides [`ConnectedClient`], which carries [`TransportCommand`]s to a
//! websocket server and reports [`TransportEvent`]s back. This is a thin
//! layer that only moves JSON frames and filters deliveries by subscribed
//! name. Chat logic remains in the Sans-IO [`crate::Client`].

use std::collections::HashSet;

use futures_util::{SinkExt, StreamExt};
use huddle_core::{TransportCommand, TransportEvent, WireEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Stream error.
    #[error("stream error: {0}")]
    Stream(String),
}

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Handle to a connected websocket transport.
///
/// Commands are sent via `to_server`; lifecycle notifications and deliveries
/// arrive on `from_server`. An internal task owns the socket.
pub struct ConnectedClient {
    /// Send commands to the transport.
    pub to_server: mpsc::Sender<TransportCommand>,
    /// Receive transport events.
    pub from_server: mpsc::Receiver<TransportEvent>,
    /// Abort handle to stop the connection task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedClient {
    /// Stop the connection.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Connect to a Huddle websocket server (`ws://host:port/path`).
///
/// The first event on `from_server` is [`TransportEvent::Connected`].
pub async fn connect(url: &str) -> Result<ConnectedClient, TransportError> {
    let (socket, _response) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|e| TransportError::Connection(format!("{url}: {e}")))?;

    let (to_server_tx, to_server_rx) = mpsc::channel::<TransportCommand>(32);
    let (from_server_tx, from_server_rx) = mpsc::channel::<TransportEvent>(32);

    let handle = tokio::spawn(async move {
        if let Err(e) = run_connection(socket, to_server_rx, from_server_tx).await {
            tracing::warn!("websocket connection ended: {e}");
        }
    });

    Ok(ConnectedClient {
        to_server: to_server_tx,
        from_server: from_server_rx,
        abort_handle: handle.abort_handle(),
    })
}

/// Run the connection, bridging between channels and the socket.
async fn run_connection(
    socket: Socket,
    mut to_server: mpsc::Receiver<TransportCommand>,
    from_server: mpsc::Sender<TransportEvent>,
) -> Result<(), TransportError> {
    let (mut sink, mut stream) = socket.split();
    let mut subscribed: HashSet<String> = HashSet::new();

    deliver(&from_server, TransportEvent::Connected).await?;

    loop {
        tokio::select! {
            command = to_server.recv() => {
                let Some(command) = command else {
                    let _ = sink.close().await;
                    return Ok(());
                };

                match command {
                    TransportCommand::Emit(wire) => {
                        let text = wire
                            .encode()
                            .map_err(|e| TransportError::Stream(format!("encode failed: {e}")))?;
                        sink.send(Message::text(text))
                            .await
                            .map_err(|e| TransportError::Stream(format!("write failed: {e}")))?;
                    },
                    TransportCommand::Subscribe(name) => {
                        subscribed.insert(name.as_str().to_string());
                    },
                    TransportCommand::Unsubscribe(name) => {
                        subscribed.remove(name.as_str());
                    },
                }
            }

            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => match WireEvent::decode(&text) {
                        Ok(wire) if subscribed.contains(&wire.name) => {
                            deliver(&from_server, TransportEvent::Delivered(wire)).await?;
                        },
                        Ok(wire) => tracing::trace!(event = %wire.name, "unsubscribed event dropped"),
                        Err(e) => tracing::warn!("undecodable frame: {e}"),
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        deliver(&from_server, TransportEvent::Disconnected).await?;
                        return Ok(());
                    },
                    Some(Ok(_)) => {},
                    Some(Err(e)) => {
                        deliver(&from_server, TransportEvent::Disconnected).await?;
                        return Err(TransportError::Stream(format!("read failed: {e}")));
                    },
                }
            }
        }
    }
}

async fn deliver(
    tx: &mpsc::Sender<TransportEvent>,
    event: TransportEvent,
) -> Result<(), TransportError> {
    tx.send(event).await.map_err(|e| TransportError::Stream(format!("channel send failed: {e}")))
}
