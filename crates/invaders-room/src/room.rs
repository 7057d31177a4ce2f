//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. The actor handles one command or one timer
//! expiry at a time, so every mutation of a room is atomic and nothing
//! needs a lock.

use std::collections::HashMap;

use invaders_protocol::{PlayerId, Recipient, RoomCode};
use invaders_rules::{GameCommand, GameEvent, Phase};
use invaders_timer::PhaseTimer;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};

use crate::{PhaseScheduler, Room, RoomError, RoomSettings, Step, Transition};

/// Channel sender for delivering outbound events to a player.
pub type PlayerSender = mpsc::UnboundedSender<GameEvent>;

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in some variants is a reply channel: the caller
/// sends a command and waits for the response on it.
enum RoomCommand {
    Join {
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Replies with the number of players left in the room.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },

    Game {
        player_id: PlayerId,
        command: GameCommand,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    Shutdown,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub phase: Phase,
    pub round: u32,
    pub host: Option<PlayerId>,
    /// Members in join order.
    pub players: Vec<PlayerId>,
    pub alive: Vec<PlayerId>,
    pub dead: Vec<PlayerId>,
    pub settings: RoomSettings,
}

impl RoomInfo {
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn max_players(&self) -> usize {
        self.settings.capacity
    }
}

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone: it wraps an `mpsc::Sender`. The registry holds one
/// per room.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    fn unavailable<T>(&self, _: T) -> RoomError {
        RoomError::Unavailable(self.code.clone())
    }

    /// Seats a player. Their events arrive on `sender` from now on.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: impl Into<String>,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player_id,
                name: name.into(),
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|e| self.unavailable(e))?;
        reply_rx.await.map_err(|e| self.unavailable(e))?
    }

    /// Removes a player. Returns how many players remain.
    pub async fn leave(&self, player_id: PlayerId) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|e| self.unavailable(e))?;
        reply_rx.await.map_err(|e| self.unavailable(e))?
    }

    /// Delivers a game command from a seated player.
    ///
    /// Only a rejected `StartGame` comes back as an error; night actions
    /// and votes are accepted or dropped silently.
    pub async fn command(
        &self,
        player_id: PlayerId,
        command: GameCommand,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Game {
                player_id,
                command,
                reply: reply_tx,
            })
            .await
            .map_err(|e| self.unavailable(e))?;
        reply_rx.await.map_err(|e| self.unavailable(e))?
    }

    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|e| self.unavailable(e))?;
        reply_rx.await.map_err(|e| self.unavailable(e))
    }

    /// Tells the room to shut down. Pending timers die with it.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|e| self.unavailable(e))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    scheduler: PhaseScheduler,
    timer: PhaseTimer<Transition>,
    rng: StdRng,
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop until shutdown or until every handle is gone.
    async fn run(mut self) {
        tracing::info!(room = %self.room.code(), "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.handle(cmd) {
                        break;
                    }
                }
                transition = self.timer.fired() => {
                    let step = self.scheduler.advance(&mut self.room, transition, &mut self.rng);
                    self.apply(step);
                }
            }
        }

        tracing::info!(room = %self.room.code(), "room actor stopped");
    }

    /// Handles one command. Returns `false` when the actor should stop.
    fn handle(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                player_id,
                name,
                sender,
                reply,
            } => {
                let result = self.handle_join(player_id, name, sender);
                let _ = reply.send(result);
            }
            RoomCommand::Leave { player_id, reply } => {
                let result = self.handle_leave(player_id);
                let _ = reply.send(result);
            }
            RoomCommand::Game {
                player_id,
                command,
                reply,
            } => {
                let result = self.handle_command(player_id, command);
                let _ = reply.send(result);
            }
            RoomCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
            }
            RoomCommand::Shutdown => {
                tracing::info!(room = %self.room.code(), "room shutting down");
                self.timer.cancel();
                return false;
            }
        }
        true
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        self.room.join(player_id, name)?;
        self.senders.insert(player_id, sender);
        tracing::info!(
            room = %self.room.code(),
            %player_id,
            players = self.room.roster().len(),
            "player joined"
        );
        self.dispatch(vec![(Recipient::All, self.room.players_update())]);
        Ok(())
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<usize, RoomError> {
        self.room.leave(player_id)?;
        self.senders.remove(&player_id);
        let remaining = self.room.roster().len();
        tracing::info!(
            room = %self.room.code(),
            %player_id,
            players = remaining,
            "player left"
        );
        if remaining > 0 {
            self.dispatch(vec![(Recipient::All, self.room.players_update())]);
        }
        Ok(remaining)
    }

    fn handle_command(
        &mut self,
        player_id: PlayerId,
        command: GameCommand,
    ) -> Result<(), RoomError> {
        if !self.room.roster().contains(player_id) {
            tracing::debug!(
                room = %self.room.code(),
                %player_id,
                "command from non-member, ignoring"
            );
            return Ok(());
        }
        let step = self.scheduler.handle_command(
            &mut self.room,
            player_id,
            command,
            &mut self.rng,
        )?;
        self.apply(step);
        Ok(())
    }

    /// Sends a step's events and arms its next transition.
    fn apply(&mut self, step: Step) {
        let Step { events, next } = step;
        self.dispatch(events);
        if let Some((transition, after)) = next {
            self.timer.schedule(transition, after);
        }
    }

    /// Fans events out to their recipients. A player whose connection is
    /// gone is skipped.
    fn dispatch(&self, events: Vec<(Recipient, GameEvent)>) {
        for (recipient, event) in events {
            for player_id in self.room.roster().ids() {
                if !recipient.includes(player_id) {
                    continue;
                }
                if let Some(sender) = self.senders.get(&player_id) {
                    let _ = sender.send(event.clone());
                }
            }
        }
    }

    fn info(&self) -> RoomInfo {
        let roster = self.room.roster();
        RoomInfo {
            code: self.room.code().clone(),
            phase: self.room.phase(),
            round: self.room.round(),
            host: self.room.host(),
            players: roster.ids().collect(),
            alive: roster.alive().iter().copied().collect(),
            dead: roster.dead().iter().copied().collect(),
            settings: self.room.settings(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
///
/// `channel_size` controls backpressure: if the channel fills up, senders
/// wait. `seed` fixes the room's RNG; `None` seeds it from the thread RNG.
pub(crate) fn spawn_room(
    code: RoomCode,
    settings: RoomSettings,
    scheduler: PhaseScheduler,
    channel_size: usize,
    seed: Option<u64>,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));

    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let actor = RoomActor {
        room: Room::new(code.clone(), settings),
        scheduler,
        timer: PhaseTimer::new(),
        rng,
        senders: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
