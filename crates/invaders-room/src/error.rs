//! Error types for the room layer.

use invaders_protocol::{PlayerId, RoomCode};
use invaders_rules::RulesError;

/// Errors that can occur during room operations.
///
/// Invalid night actions and votes are not errors: they are dropped
/// silently and never reach the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No live room has this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// Every seat is taken.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The player is already seated in this room.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomCode),

    /// The player is not seated in this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomCode),

    /// The player is not seated anywhere.
    #[error("player {0} is not in any room")]
    NoRoom(PlayerId),

    /// Only the host may do this.
    #[error("player {0} is not the host")]
    NotHost(PlayerId),

    /// The host tried to start before every seat was taken.
    #[error("need {need} players to start, have {have}")]
    NotEnoughPlayers { have: usize, need: usize },

    /// The room is in a phase that doesn't allow this operation.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// Rooms can only be opened with a size the role table supports.
    #[error("rooms of {0} players are not supported")]
    UnsupportedCapacity(usize),

    /// Role dealing failed.
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}
