//! Wire protocol for the Invaders game server.
//!
//! This crate defines what travels between clients and the server:
//!
//! - **Identities** ([`PlayerId`], [`RoomCode`]) shared by every layer.
//! - **Envelopes** ([`Envelope`], [`Payload`], [`LobbyMessage`]) that wrap
//!   lobby traffic (create/join/list/leave) and game traffic.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) that turns envelopes
//!   into bytes and back.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about roles, phases or rooms as
//! running actors. Game messages are a type parameter of [`Payload`],
//! filled in by the crates above.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Room (game rules)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Envelope, LobbyMessage, Payload, PlayerId, Recipient, RoomCode,
    RoomListEntry,
};
