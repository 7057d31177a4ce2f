//! The phase scheduler: what happens at each phase boundary.
//!
//! Everything here is synchronous. Each entry point mutates a [`Room`] and
//! returns a [`Step`]: the events to fan out and the next transition to
//! arm on the room's timer. The room actor owns the timer and the RNG;
//! the scheduler owns the rules configuration.
//!
//! ```text
//! start_game ─▶ WAITING ─(waiting)─▶ BeginNight ─▶ NIGHT ─(night)─▶ EndNight
//!   ─▶ DAY ─(day)─▶ BeginVoting ─▶ VOTING ─(voting)─▶ EndVoting ─▶ RESULTS
//!   ─┬─ winner ─▶ GAME_OVER
//!    └─(results)─▶ BeginNight ─▶ ...
//! ```

use std::time::Duration;

use invaders_protocol::{PlayerId, Recipient};
use invaders_rules::{
    GameCommand, GameEvent, Phase, RoleAssigner, TieBreak, evaluate_winner,
    resolve_night, resolve_votes,
};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::{EngineConfig, PhaseDurations, Room, RoomError};

/// A timed phase boundary. One is pending per room at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// From WAITING or RESULTS into NIGHT.
    BeginNight,
    /// Resolve the night, enter DAY.
    EndNight,
    /// Enter VOTING.
    BeginVoting,
    /// Resolve votes, enter RESULTS, maybe GAME_OVER.
    EndVoting,
}

impl Transition {
    /// Whether this transition may fire while the room is in `phase`.
    fn expected_in(self, phase: Phase) -> bool {
        match self {
            Self::BeginNight => matches!(phase, Phase::Waiting | Phase::Results),
            Self::EndNight => phase == Phase::Night,
            Self::BeginVoting => phase == Phase::Day,
            Self::EndVoting => phase == Phase::Voting,
        }
    }
}

/// The result of one scheduler step.
#[derive(Debug, Default)]
pub struct Step {
    /// Outbound events in emission order.
    pub events: Vec<(Recipient, GameEvent)>,
    /// The transition to arm next, and when. `None` leaves the timer idle.
    pub next: Option<(Transition, Duration)>,
}

impl Step {
    fn broadcast(&mut self, event: GameEvent) {
        self.events.push((Recipient::All, event));
    }

    fn send_to(&mut self, player: PlayerId, event: GameEvent) {
        self.events.push((Recipient::Player(player), event));
    }
}

/// Drives rooms through their phases.
#[derive(Debug, Clone)]
pub struct PhaseScheduler {
    durations: PhaseDurations,
    tie_break: TieBreak,
    log_tail: usize,
    assigner: RoleAssigner,
}

impl PhaseScheduler {
    pub fn new(config: &EngineConfig, assigner: RoleAssigner) -> Self {
        Self {
            durations: config.durations,
            tie_break: config.tie_break,
            log_tail: config.log_tail,
            assigner,
        }
    }

    /// Handles a command from a seated player.
    ///
    /// Only `StartGame` can fail. Night actions and votes that are not
    /// valid right now are dropped and yield an empty step.
    pub fn handle_command<R: Rng>(
        &self,
        room: &mut Room,
        player: PlayerId,
        command: GameCommand,
        rng: &mut R,
    ) -> Result<Step, RoomError> {
        match command {
            GameCommand::StartGame => self.start_game(room, player, rng),
            GameCommand::NightAction { role, target } => {
                if !room.submit_night_action(player, role, target) {
                    debug!(room = %room.code(), %player, ?role, "night action dropped");
                }
                Ok(Step::default())
            }
            GameCommand::Vote { target } => {
                if !room.submit_vote(player, target) {
                    debug!(room = %room.code(), %player, "vote dropped");
                }
                Ok(Step::default())
            }
        }
    }

    /// Host starts the game with every seat taken.
    ///
    /// Deals roles, arms every Alien King ability, announces the start,
    /// tells each player their role privately and enters WAITING.
    pub fn start_game<R: Rng>(
        &self,
        room: &mut Room,
        requester: PlayerId,
        rng: &mut R,
    ) -> Result<Step, RoomError> {
        if room.host() != Some(requester) {
            return Err(RoomError::NotHost(requester));
        }
        if room.phase != Phase::Lobby {
            return Err(RoomError::InvalidState(format!(
                "cannot start a game in phase {}",
                room.phase
            )));
        }
        let capacity = room.settings().capacity;
        if room.roster.len() < capacity {
            return Err(RoomError::NotEnoughPlayers {
                have: room.roster.len(),
                need: capacity,
            });
        }

        let roles = self.assigner.assign(room.roster.len(), rng)?;
        room.roster.start_game(&roles);
        room.round = 0;
        room.log.clear();
        room.night_actions.clear();
        room.votes.clear();

        let mut step = Step::default();
        step.broadcast(GameEvent::GameStarted);
        send_roles(room, &mut step);
        enter(room, Phase::Waiting, &mut step);
        step.next = Some((Transition::BeginNight, self.durations.waiting));

        info!(room = %room.code(), players = room.roster.len(), "game started");
        Ok(step)
    }

    /// Applies a timed transition.
    ///
    /// A transition that does not match the room's phase is stale and
    /// produces an empty step.
    pub fn advance<R: Rng>(
        &self,
        room: &mut Room,
        transition: Transition,
        rng: &mut R,
    ) -> Step {
        if room.phase.is_terminal() {
            debug!(room = %room.code(), ?transition, "game over, transition ignored");
            return Step::default();
        }
        if !transition.expected_in(room.phase) {
            warn!(
                room = %room.code(),
                ?transition,
                phase = %room.phase,
                "stale transition ignored"
            );
            return Step::default();
        }

        match transition {
            Transition::BeginNight => self.begin_night(room, rng),
            Transition::EndNight => self.end_night(room),
            Transition::BeginVoting => self.begin_voting(room),
            Transition::EndVoting => self.end_voting(room),
        }
    }

    fn begin_night<R: Rng>(&self, room: &mut Room, rng: &mut R) -> Step {
        let mut step = Step::default();

        if room.phase == Phase::Results && room.settings().randomize_roles {
            match self.assigner.assign(room.roster.len(), rng) {
                Ok(roles) => {
                    room.roster.deal(&roles);
                    send_roles(room, &mut step);
                    debug!(room = %room.code(), "roles reshuffled");
                }
                Err(e) => {
                    warn!(room = %room.code(), error = %e, "reshuffle skipped, keeping roles");
                }
            }
        }

        room.night_actions.clear();
        room.round += 1;
        room.log.push(format!("Night {} begins", room.round));
        enter(room, Phase::Night, &mut step);
        step.next = Some((Transition::EndNight, self.durations.night));
        step
    }

    fn end_night(&self, room: &mut Room) -> Step {
        let outcome = resolve_night(&mut room.roster, &room.night_actions);
        room.log.extend(outcome.log.iter().cloned());

        let mut step = Step::default();
        step.broadcast(GameEvent::NightResults {
            results: outcome.log,
            dead_players: outcome.dead.into_iter().collect(),
        });
        for investigation in outcome.investigations {
            step.send_to(
                investigation.investigator,
                GameEvent::InvestigationResult {
                    target: investigation.target,
                    target_name: investigation.target_name,
                    is_good: investigation.is_good,
                },
            );
        }
        enter(room, Phase::Day, &mut step);
        step.next = Some((Transition::BeginVoting, self.durations.day));
        step
    }

    fn begin_voting(&self, room: &mut Room) -> Step {
        room.votes.clear();
        let mut step = Step::default();
        enter(room, Phase::Voting, &mut step);
        step.next = Some((Transition::EndVoting, self.durations.voting));
        step
    }

    fn end_voting(&self, room: &mut Room) -> Step {
        let outcome = resolve_votes(&mut room.roster, &room.votes, self.tie_break);
        room.log.extend(outcome.log);

        let mut step = Step::default();
        step.broadcast(GameEvent::VoteResults {
            votes: outcome.counts,
            executed: outcome.executed,
            game_log: room.log_tail(self.log_tail),
        });
        enter(room, Phase::Results, &mut step);

        match evaluate_winner(&room.roster) {
            Some(winner) => {
                room.log.push(format!("The {winner} team wins"));
                step.broadcast(GameEvent::GameOver {
                    winner,
                    player_roles: room.role_reveal(),
                    game_log: room.log.clone(),
                });
                enter(room, Phase::GameOver, &mut step);
                info!(room = %room.code(), %winner, round = room.round, "game over");
            }
            None => {
                step.next = Some((Transition::BeginNight, self.durations.results));
            }
        }
        step
    }
}

/// Moves the room to `next` and announces it.
fn enter(room: &mut Room, next: Phase, step: &mut Step) {
    debug_assert!(
        room.phase.can_transition_to(next),
        "illegal transition {} -> {next}",
        room.phase
    );
    debug!(room = %room.code(), from = %room.phase, to = %next, round = room.round, "phase change");
    room.phase = next;
    step.broadcast(GameEvent::PhaseChange {
        phase: next,
        round: room.round,
    });
}

/// Queues each player's private role assignment.
fn send_roles(room: &Room, step: &mut Step) {
    for player in room.roster.players() {
        if let Some(role) = player.role {
            step.send_to(player.id, GameEvent::role_assignment(role));
        }
    }
}
