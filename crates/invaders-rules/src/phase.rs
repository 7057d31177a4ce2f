//! The phase state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The stage a room is in.
///
/// ```text
/// Lobby → Waiting → Night → Day → Voting → Results ─┬→ Night
///                                                   └→ GameOver
/// ```
///
/// - **Lobby**: seats are filling; the host may start once every seat is
///   taken.
/// - **Waiting**: roles are dealt; a short grace period before the first
///   night.
/// - **Night**: role holders submit their night actions.
/// - **Day**: the night's results are known; players discuss.
/// - **Voting**: living players vote to execute someone.
/// - **Results**: the vote is resolved; the next night follows unless a
///   team has won.
/// - **GameOver**: terminal. Roles are revealed and no timer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    Waiting,
    Night,
    Day,
    Voting,
    Results,
    GameOver,
}

impl Phase {
    /// Returns `true` if `target` may directly follow this phase.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Lobby, Self::Waiting)
                | (Self::Waiting, Self::Night)
                | (Self::Night, Self::Day)
                | (Self::Day, Self::Voting)
                | (Self::Voting, Self::Results)
                | (Self::Results, Self::Night)
                | (Self::Results, Self::GameOver)
        )
    }

    /// Returns `true` while seats can still be taken.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Returns `true` once a winner is known; no timer fires after this.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lobby => "lobby",
            Self::Waiting => "waiting",
            Self::Night => "night",
            Self::Day => "day",
            Self::Voting => "voting",
            Self::Results => "results",
            Self::GameOver => "game_over",
        };
        f.write_str(name)
    }
}
