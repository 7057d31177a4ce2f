//! Codec trait and the JSON implementation.
//!
//! The server never serializes directly; it goes through a [`Codec`] so
//! the wire format can change without touching the connection handler.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes Rust values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or do
    /// not match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// Browser clients speak JSON natively, so this is the only codec the
/// server ships with.
///
/// ```rust
/// use invaders_protocol::{Codec, Envelope, JsonCodec, LobbyMessage, Payload};
///
/// let codec = JsonCodec;
/// let envelope: Envelope<()> = Envelope {
///     seq: 1,
///     payload: Payload::Lobby(LobbyMessage::ListRooms),
/// };
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope<()> = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Envelope, LobbyMessage, Payload, RoomCode};

    #[test]
    fn test_decode_rejects_garbage() {
        let result: Result<Envelope<()>, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_unknown_lobby_tag() {
        let raw = br#"{"seq":1,"payload":{"type":"Lobby","data":{"type":"Teleport"}}}"#;
        let result: Result<Envelope<()>, _> = JsonCodec.decode(raw);
        assert!(result.is_err());
    }

    #[test]
    fn test_join_room_survives_codec() {
        let envelope: Envelope<()> = Envelope {
            seq: 9,
            payload: Payload::Lobby(LobbyMessage::JoinRoom {
                room: RoomCode::new("ABC123").unwrap(),
                player_name: "Salma".into(),
            }),
        };
        let bytes = JsonCodec.encode(&envelope).unwrap();
        let decoded: Envelope<()> = JsonCodec.decode(&bytes).unwrap();
        assert_eq!(decoded, envelope);
    }
}
