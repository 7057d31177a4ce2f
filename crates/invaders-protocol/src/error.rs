//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum, so a
//! `ProtocolError` always means "the bytes were wrong", never "the room
//! refused" or "the socket died".

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing field, or an
    /// unknown message tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but breaks a protocol rule, e.g. a room code
    /// with the wrong length.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
