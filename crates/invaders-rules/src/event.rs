//! Messages between players and a running game.
//!
//! [`GameCommand`] is what a seated player may send once they are in a
//! room; [`GameEvent`] is everything the room sends back. Both are
//! internally tagged with `"type"` in snake_case, so a vote on the wire
//! looks like `{"type":"vote","target":3}`.

use invaders_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::{Phase, Role, Team, VoteCount};

/// A player's request to the room they sit in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameCommand {
    /// Host only, with every seat taken.
    StartGame,
    /// `role` must be the sender's current role.
    NightAction { role: Role, target: PlayerId },
    Vote { target: PlayerId },
}

impl GameCommand {
    /// Night actions and votes. These are never answered: a submission
    /// that cannot be accepted is dropped without telling the sender.
    pub fn is_submission(&self) -> bool {
        matches!(self, Self::NightAction { .. } | Self::Vote { .. })
    }
}

/// A member as shown in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
}

/// One line of the end-of-game role reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleReveal {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub team: Team,
}

/// Something that happened in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Membership changed. `host` is `None` only for an empty room.
    PlayersUpdate {
        players: Vec<PlayerSummary>,
        host: Option<PlayerId>,
    },

    GameStarted,

    /// Private: the receiver's role. Sent at game start and again after
    /// every reshuffle.
    RoleAssignment {
        role: Role,
        name: String,
        team: Team,
        description: String,
    },

    PhaseChange { phase: Phase, round: u32 },

    NightResults {
        results: Vec<String>,
        dead_players: Vec<PlayerId>,
    },

    /// Private: sent to the Conductor who asked.
    InvestigationResult {
        target: PlayerId,
        target_name: String,
        is_good: bool,
    },

    VoteResults {
        votes: Vec<VoteCount>,
        executed: Option<PlayerId>,
        /// The last few lines of the game log.
        game_log: Vec<String>,
    },

    GameOver {
        winner: Team,
        player_roles: Vec<RoleReveal>,
        game_log: Vec<String>,
    },
}

impl GameEvent {
    /// The private assignment message for `role`.
    pub fn role_assignment(role: Role) -> Self {
        Self::RoleAssignment {
            role,
            name: role.name().to_string(),
            team: role.team(),
            description: role.description().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_votes_and_actions_are_submissions() {
        assert!(!GameCommand::StartGame.is_submission());
        assert!(GameCommand::Vote { target: PlayerId(2) }.is_submission());
        assert!(
            GameCommand::NightAction { role: Role::Doctor, target: PlayerId(2) }
                .is_submission()
        );
    }

    #[test]
    fn test_command_wire_shape() {
        let vote: GameCommand =
            serde_json::from_str(r#"{"type":"vote","target":3}"#).unwrap();
        assert_eq!(vote, GameCommand::Vote { target: PlayerId(3) });

        let action: GameCommand = serde_json::from_str(
            r#"{"type":"night_action","role":"DOCTOR","target":1}"#,
        )
        .unwrap();
        assert_eq!(
            action,
            GameCommand::NightAction {
                role: Role::Doctor,
                target: PlayerId(1)
            }
        );

        let start: GameCommand =
            serde_json::from_str(r#"{"type":"start_game"}"#).unwrap();
        assert_eq!(start, GameCommand::StartGame);
    }

    #[test]
    fn test_unknown_role_tag_is_rejected() {
        let result: Result<GameCommand, _> = serde_json::from_str(
            r#"{"type":"night_action","role":"WIZARD","target":1}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_event_wire_shape() {
        let event = GameEvent::PhaseChange {
            phase: Phase::GameOver,
            round: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "phase_change", "phase": "game_over", "round": 2})
        );
    }

    #[test]
    fn test_role_assignment_carries_catalog_text() {
        let GameEvent::RoleAssignment {
            name,
            team,
            description,
            ..
        } = GameEvent::role_assignment(Role::Conductor)
        else {
            panic!("wrong variant");
        };
        assert_eq!(name, "Conductor");
        assert_eq!(team, Team::Good);
        assert_eq!(description, Role::Conductor.description());
    }
}
