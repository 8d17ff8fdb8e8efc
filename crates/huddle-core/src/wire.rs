//! Transport event contract.
//!
//! Every event crossing the transport is a name plus a JSON payload. On a
//! text transport a single event is one frame holding a two element array:
//!
//! ```text
//! ["chatMessage", {"id": 1700000000000, "sender": "Alice", "text": "hi", "ts": 1700000000000}]
//! ["typing", "Alice"]
//! ```
//!
//! | Direction | Name          | Payload          |
//! |-----------|---------------|------------------|
//! | out       | `joinRoom`    | trimmed name     |
//! | out / in  | `chatMessage` | [`Message`]      |
//! | out / in  | `typing`      | sender name      |
//! | out / in  | `stopTyping`  | sender name      |
//! | in        | `roomNotice`  | joined user name |

use std::{fmt, str::FromStr};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Message, ProtocolError};

/// Wire-level event names. Must match the server exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventName {
    /// `joinRoom` (outbound only).
    JoinRoom,
    /// `roomNotice` (inbound only).
    RoomNotice,
    /// `chatMessage`.
    ChatMessage,
    /// `typing`.
    Typing,
    /// `stopTyping`.
    StopTyping,
}

impl EventName {
    /// Events the client subscribes to on connect.
    pub const INBOUND: [Self; 4] =
        [Self::RoomNotice, Self::ChatMessage, Self::Typing, Self::StopTyping];

    /// Wire identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JoinRoom => "joinRoom",
            Self::RoomNotice => "roomNotice",
            Self::ChatMessage => "chatMessage",
            Self::Typing => "typing",
            Self::StopTyping => "stopTyping",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "joinRoom" => Ok(Self::JoinRoom),
            "roomNotice" => Ok(Self::RoomNotice),
            "chatMessage" => Ok(Self::ChatMessage),
            "typing" => Ok(Self::Typing),
            "stopTyping" => Ok(Self::StopTyping),
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }
}

/// Untyped event as carried by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct WireEvent {
    /// Event name as sent on the wire.
    pub name: String,
    /// JSON payload.
    pub payload: Value,
}

impl WireEvent {
    /// Create a wire event from a known name.
    pub fn new(name: EventName, payload: Value) -> Self {
        Self { name: name.as_str().to_string(), payload }
    }

    /// Encode as a `["name", payload]` JSON text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(&(&self.name, &self.payload))
            .map_err(|e| ProtocolError::MalformedFrame(e.to_string()))
    }

    /// Decode a `["name", payload]` JSON text frame.
    ///
    /// Only the frame shape is checked here. Whether the name and payload
    /// satisfy the contract is decided by [`InboundEvent::from_wire`] and
    /// [`OutboundEvent::from_wire`].
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Self::decode_slice(text.as_bytes())
    }

    /// Decode a frame from raw bytes.
    pub fn decode_slice(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let (name, payload): (String, Value) = serde_json::from_slice(bytes)
            .map_err(|e| ProtocolError::MalformedFrame(e.to_string()))?;
        Ok(Self { name, payload })
    }

    fn payload_as<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        T::deserialize(&self.payload).map_err(|e| ProtocolError::invalid_payload(&self.name, &e))
    }
}

/// Events the server delivers to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Someone joined the room.
    RoomNotice(String),
    /// A chat message, possibly our own relayed back.
    ChatMessage(Message),
    /// A peer is typing.
    Typing(String),
    /// A peer stopped typing.
    StopTyping(String),
}

impl InboundEvent {
    /// Wire name of this event.
    pub fn name(&self) -> EventName {
        match self {
            Self::RoomNotice(_) => EventName::RoomNotice,
            Self::ChatMessage(_) => EventName::ChatMessage,
            Self::Typing(_) => EventName::Typing,
            Self::StopTyping(_) => EventName::StopTyping,
        }
    }

    /// Decode and validate an inbound wire event.
    pub fn from_wire(wire: &WireEvent) -> Result<Self, ProtocolError> {
        match wire.name.parse::<EventName>()? {
            EventName::RoomNotice => Ok(Self::RoomNotice(wire.payload_as()?)),
            EventName::ChatMessage => Ok(Self::ChatMessage(wire.payload_as()?)),
            EventName::Typing => Ok(Self::Typing(wire.payload_as()?)),
            EventName::StopTyping => Ok(Self::StopTyping(wire.payload_as()?)),
            EventName::JoinRoom => Err(ProtocolError::UnexpectedDirection(wire.name.clone())),
        }
    }

    /// Encode for delivery (server side of the contract).
    pub fn to_wire(&self) -> Result<WireEvent, ProtocolError> {
        let payload = match self {
            Self::RoomNotice(name) | Self::Typing(name) | Self::StopTyping(name) => {
                Value::String(name.clone())
            },
            Self::ChatMessage(message) => serde_json::to_value(message)
                .map_err(|e| ProtocolError::invalid_payload(EventName::ChatMessage.as_str(), &e))?,
        };
        Ok(WireEvent::new(self.name(), payload))
    }
}

/// Events the client emits to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// Announce presence with the trimmed name.
    JoinRoom(String),
    /// Broadcast a sent message.
    ChatMessage(Message),
    /// Announce active typing.
    Typing(String),
    /// Announce typing ceased.
    StopTyping(String),
}

impl OutboundEvent {
    /// Wire name of this event.
    pub fn name(&self) -> EventName {
        match self {
            Self::JoinRoom(_) => EventName::JoinRoom,
            Self::ChatMessage(_) => EventName::ChatMessage,
            Self::Typing(_) => EventName::Typing,
            Self::StopTyping(_) => EventName::StopTyping,
        }
    }

    /// Encode for the transport.
    pub fn to_wire(&self) -> Result<WireEvent, ProtocolError> {
        let payload = match self {
            Self::JoinRoom(name) | Self::Typing(name) | Self::StopTyping(name) => {
                Value::String(name.clone())
            },
            Self::ChatMessage(message) => serde_json::to_value(message)
                .map_err(|e| ProtocolError::invalid_payload(EventName::ChatMessage.as_str(), &e))?,
        };
        Ok(WireEvent::new(self.name(), payload))
    }

    /// Decode an event emitted by a client (server side of the contract).
    pub fn from_wire(wire: &WireEvent) -> Result<Self, ProtocolError> {
        match wire.name.parse::<EventName>()? {
            EventName::JoinRoom => Ok(Self::JoinRoom(wire.payload_as()?)),
            EventName::ChatMessage => Ok(Self::ChatMessage(wire.payload_as()?)),
            EventName::Typing => Ok(Self::Typing(wire.payload_as()?)),
            EventName::StopTyping => Ok(Self::StopTyping(wire.payload_as()?)),
            EventName::RoomNotice => Err(ProtocolError::UnexpectedDirection(wire.name.clone())),
        }
    }
}

/// Instruction for the transport collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCommand {
    /// Emit a named event.
    Emit(WireEvent),
    /// Start delivering events with this name.
    Subscribe(EventName),
    /// Stop delivering events with this name.
    Unsubscribe(EventName),
}

/// Notification from the transport collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Connection (re)established.
    Connected,
    /// Connection lost.
    Disconnected,
    /// Event delivered for a subscribed name.
    Delivered(WireEvent),
}
