//! Unified error type for the Invaders server.

use invaders_protocol::ProtocolError;
use invaders_room::RoomError;
use invaders_rules::RulesError;

use crate::transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum InvadersError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, not found, wrong phase).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A rules-level error (role dealing).
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// The server configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use invaders_protocol::RoomCode;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let invaders_err: InvadersError = err.into();
        assert!(matches!(invaders_err, InvadersError::Transport(_)));
        assert!(invaders_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let invaders_err: InvadersError = err.into();
        assert!(matches!(invaders_err, InvadersError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(RoomCode::new("ABC123").unwrap());
        let invaders_err: InvadersError = err.into();
        assert!(matches!(invaders_err, InvadersError::Room(_)));
        assert_eq!(invaders_err.to_string(), "room ABC123 not found");
    }
}
