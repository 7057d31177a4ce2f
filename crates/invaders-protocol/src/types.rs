//! Core protocol types for the Invaders wire format.
//!
//! Everything here is serialized onto the socket, so serde attributes
//! decide the exact JSON shapes clients see.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Newtype over `u64` so a player id can never be passed where some other
/// integer is expected. `#[serde(transparent)]` keeps it a plain number
/// on the wire: `PlayerId(42)` is `42`, not `{"0":42}`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The short code players type to find a room, e.g. `"Q7K2ZD"`.
///
/// Always [`RoomCode::LEN`] characters from `A-Z0-9`. Lowercase input is
/// accepted and normalised, so `"q7k2zd"` and `"Q7K2ZD"` name the same
/// room. Deserialization goes through the same validation, which means an
/// envelope carrying a malformed code fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Number of characters in every room code.
    pub const LEN: usize = 6;

    /// Characters a room code is drawn from.
    pub const ALPHABET: &'static [u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Validates and normalises a room code.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] if the code has the wrong
    /// length or contains anything but ASCII letters and digits.
    pub fn new(code: impl Into<String>) -> Result<Self, ProtocolError> {
        let code = code.into().to_ascii_uppercase();
        if code.len() != Self::LEN {
            return Err(ProtocolError::InvalidMessage(format!(
                "room code must be {} characters, got {}",
                Self::LEN,
                code.len()
            )));
        }
        if !code.bytes().all(|b| Self::ALPHABET.contains(&b)) {
            return Err(ProtocolError::InvalidMessage(format!(
                "room code {code:?} contains invalid characters"
            )));
        }
        Ok(Self(code))
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who should receive an outbound game event.
///
/// The rules engine returns `(Recipient, event)` pairs and the room actor
/// fans them out. Role assignments and investigation results are
/// addressed to a single player; everything else goes to the whole room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every member of the room.
    All,

    /// One specific member.
    Player(PlayerId),
}

impl Recipient {
    /// Returns `true` if `player` is addressed by this recipient.
    pub fn includes(&self, player: PlayerId) -> bool {
        match self {
            Self::All => true,
            Self::Player(p) => *p == player,
        }
    }
}

// ---------------------------------------------------------------------------
// Lobby messages
// ---------------------------------------------------------------------------

/// A summary of a room returned in room listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomListEntry {
    /// The room's code.
    pub room: RoomCode,
    /// Members currently in the room.
    pub player_count: usize,
    /// Seats in the room (5, 7 or 9).
    pub max_players: usize,
    /// The current host.
    pub host: PlayerId,
}

/// Room lifecycle traffic, handled by the server rather than a room.
///
/// Internally tagged: `{ "type": "JoinRoom", "room": "Q7K2ZD", ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LobbyMessage {
    /// Client → Server: open a new room and become its host.
    CreateRoom {
        player_name: String,
        capacity: usize,
        #[serde(default)]
        randomize_roles: bool,
    },

    /// Client → Server: take a seat in an existing room.
    JoinRoom {
        room: RoomCode,
        player_name: String,
    },

    /// Client → Server: give up my seat.
    LeaveRoom,

    /// Client → Server: which rooms exist?
    ListRooms,

    /// Client → Server: is the server up?
    Health,

    /// Server → Client: reply to `Health`.
    HealthStatus { rooms: usize },

    /// Server → Client: the rooms that are still in their lobby.
    RoomList { rooms: Vec<RoomListEntry> },

    /// Server → Client: you are seated in `room` as `player_id`.
    RoomJoined {
        room: RoomCode,
        player_id: PlayerId,
    },

    /// Server → Client: the last request was rejected.
    /// `code` follows HTTP conventions (400, 404, 409).
    Error { code: u16, message: String },
}

// ---------------------------------------------------------------------------
// Payload / Envelope
// ---------------------------------------------------------------------------

/// The content of an envelope: lobby traffic or a game message of type `G`.
///
/// Adjacently tagged, so a game message looks like
/// `{ "type": "Game", "data": { ... } }` and the server can tell lobby
/// traffic from game traffic before looking inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload<G> {
    /// Room lifecycle traffic.
    Lobby(LobbyMessage),

    /// A game command (inbound) or game event (outbound).
    Game(G),
}

/// The top-level wire message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<G> {
    /// Per-direction sequence number, starting at 1 for server messages.
    /// Clients may send 0; the server does not check it.
    #[serde(default)]
    pub seq: u64,

    /// The message content.
    pub payload: Payload<G>,
}
