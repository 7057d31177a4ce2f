//! The state of one room.

use std::collections::HashMap;

use invaders_protocol::{PlayerId, RoomCode};
use invaders_rules::{
    GameEvent, NightAction, Phase, PlayerSummary, Role, RoleReveal, Roster,
};
use tracing::debug;

use crate::{RoomError, RoomSettings};

/// Everything a room knows, owned by exactly one room actor.
///
/// Membership lives in the [`Roster`] (join order, alive/dead sets).
/// Pending night actions and votes are keyed by the submitting player,
/// so a second submission in the same phase replaces the first.
#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    host: Option<PlayerId>,
    settings: RoomSettings,
    pub(crate) phase: Phase,
    pub(crate) round: u32,
    pub(crate) roster: Roster,
    pub(crate) night_actions: HashMap<PlayerId, NightAction>,
    pub(crate) votes: HashMap<PlayerId, PlayerId>,
    pub(crate) log: Vec<String>,
}

impl Room {
    /// An empty room in the lobby.
    pub fn new(code: RoomCode, settings: RoomSettings) -> Self {
        Self {
            code,
            host: None,
            settings,
            phase: Phase::Lobby,
            round: 0,
            roster: Roster::new(),
            night_actions: HashMap::new(),
            votes: HashMap::new(),
            log: Vec::new(),
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn host(&self) -> Option<PlayerId> {
        self.host
    }

    pub fn settings(&self) -> RoomSettings {
        self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn is_full(&self) -> bool {
        self.roster.len() >= self.settings.capacity
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Seats a player. The first player to sit becomes host.
    pub fn join(
        &mut self,
        player_id: PlayerId,
        name: impl Into<String>,
    ) -> Result<(), RoomError> {
        if !self.phase.is_joinable() {
            return Err(RoomError::InvalidState(format!(
                "cannot join room in phase {}",
                self.phase
            )));
        }
        if self.roster.contains(player_id) {
            return Err(RoomError::AlreadyInRoom(player_id, self.code.clone()));
        }
        if self.is_full() {
            return Err(RoomError::RoomFull(self.code.clone()));
        }

        self.roster.add(player_id, name);
        if self.host.is_none() {
            self.host = Some(player_id);
        }
        Ok(())
    }

    /// Removes a player. If they were host, the earliest-joined remaining
    /// player takes over.
    pub fn leave(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        if self.roster.remove(player_id).is_none() {
            return Err(RoomError::NotInRoom(player_id, self.code.clone()));
        }
        self.night_actions.remove(&player_id);
        self.votes.remove(&player_id);

        if self.host == Some(player_id) {
            self.host = self.roster.first();
            debug!(room = %self.code, host = ?self.host, "host passed on");
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Submissions
    // -----------------------------------------------------------------------

    /// Records a night action. Returns `false` (recording nothing) unless
    /// it is night, the actor is alive, `role` is the actor's role, and
    /// the target is seated.
    pub fn submit_night_action(
        &mut self,
        actor: PlayerId,
        role: Role,
        target: PlayerId,
    ) -> bool {
        let valid = self.phase == Phase::Night
            && self.roster.is_alive(actor)
            && self.roster.role_of(actor) == Some(role)
            && self.roster.contains(target);
        if valid {
            self.night_actions.insert(actor, NightAction { role, target });
        }
        valid
    }

    /// Records a vote. Returns `false` (recording nothing) unless voting
    /// is open and the voter is alive. Targets are checked when the vote
    /// is resolved.
    pub fn submit_vote(&mut self, voter: PlayerId, target: PlayerId) -> bool {
        let valid = self.phase == Phase::Voting && self.roster.is_alive(voter);
        if valid {
            self.votes.insert(voter, target);
        }
        valid
    }

    pub fn pending_action(&self, actor: PlayerId) -> Option<&NightAction> {
        self.night_actions.get(&actor)
    }

    pub fn pending_vote(&self, voter: PlayerId) -> Option<PlayerId> {
        self.votes.get(&voter).copied()
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// The roster broadcast sent after every membership change.
    pub fn players_update(&self) -> GameEvent {
        GameEvent::PlayersUpdate {
            players: self
                .roster
                .players()
                .map(|p| PlayerSummary {
                    id: p.id,
                    name: p.name.clone(),
                })
                .collect(),
            host: self.host,
        }
    }

    /// Every dealt role, in join order.
    pub fn role_reveal(&self) -> Vec<RoleReveal> {
        self.roster
            .players()
            .filter_map(|p| {
                p.role.map(|role| RoleReveal {
                    id: p.id,
                    name: p.name.clone(),
                    role,
                    team: role.team(),
                })
            })
            .collect()
    }

    /// The last `n` log lines.
    pub fn log_tail(&self, n: usize) -> Vec<String> {
        let start = self.log.len().saturating_sub(n);
        self.log[start..].to_vec()
    }
}
