//! Room registry: creates, tracks, and routes players to rooms.

use std::collections::HashMap;

use invaders_protocol::{PlayerId, ProtocolError, RoomCode};
use invaders_rules::{GameCommand, RoleAssigner};
use rand::Rng;

use crate::room::spawn_room;
use crate::{
    EngineConfig, PhaseScheduler, PlayerSender, RoomError, RoomHandle,
    RoomInfo, RoomSettings,
};

/// Collisions tolerated before room creation gives up on random codes.
const MAX_CODE_ATTEMPTS: usize = 32;

/// Manages all live rooms and tracks which player is in which room.
///
/// This is the entry point for room operations from the server. It is a
/// plain value, not a global: the server wraps it in a mutex and hands it
/// to every connection.
pub struct RoomRegistry {
    config: EngineConfig,
    assigner: RoleAssigner,

    /// Live rooms, keyed by code.
    rooms: HashMap<RoomCode, RoomHandle>,

    /// Maps each player to the room they're currently in.
    /// A player can be in at most ONE room at a time.
    player_rooms: HashMap<PlayerId, RoomCode>,

    next_player_id: u64,
}

impl RoomRegistry {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_assigner(config, RoleAssigner::default())
    }

    /// A registry whose rooms deal roles from a custom table.
    pub fn with_assigner(config: EngineConfig, assigner: RoleAssigner) -> Self {
        Self {
            config,
            assigner,
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
            next_player_id: 1,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Hands out a fresh player id. Ids are never reused by a registry.
    pub fn allocate_player_id(&mut self) -> PlayerId {
        let id = PlayerId(self.next_player_id);
        self.next_player_id += 1;
        id
    }

    /// Opens a new room with `host` as its first member.
    ///
    /// # Errors
    /// - [`RoomError::UnsupportedCapacity`] for sizes without a role row.
    /// - [`RoomError::AlreadyInRoom`] if `host` is seated elsewhere.
    pub async fn create_room(
        &mut self,
        host: PlayerId,
        host_name: impl Into<String>,
        settings: RoomSettings,
        sender: PlayerSender,
    ) -> Result<RoomCode, RoomError> {
        settings.validate(self.assigner.table())?;
        if let Some(current) = self.player_rooms.get(&host) {
            return Err(RoomError::AlreadyInRoom(host, current.clone()));
        }

        let code = self.fresh_code()?;
        let scheduler = PhaseScheduler::new(&self.config, self.assigner.clone());
        let handle = spawn_room(
            code.clone(),
            settings,
            scheduler,
            self.config.channel_size,
            self.config.seed,
        );

        if let Err(e) = handle.join(host, host_name, sender).await {
            let _ = handle.shutdown().await;
            return Err(e);
        }

        self.rooms.insert(code.clone(), handle);
        self.player_rooms.insert(host, code.clone());
        tracing::info!(room = %code, %host, capacity = settings.capacity, "room created");
        Ok(code)
    }

    /// Seats a player in an existing room.
    ///
    /// Enforces the "one room at a time" invariant.
    pub async fn join_room(
        &mut self,
        player_id: PlayerId,
        code: &RoomCode,
        name: impl Into<String>,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        if let Some(current) = self.player_rooms.get(&player_id) {
            return Err(RoomError::AlreadyInRoom(player_id, current.clone()));
        }

        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        handle.join(player_id, name, sender).await?;
        self.player_rooms.insert(player_id, code.clone());
        Ok(())
    }

    /// Removes a player from their current room. A room left empty is
    /// destroyed.
    pub async fn leave_room(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        let code = self
            .player_rooms
            .remove(&player_id)
            .ok_or(RoomError::NoRoom(player_id))?;

        let Some(handle) = self.rooms.get(&code).cloned() else {
            return Ok(());
        };

        let result = handle.leave(player_id).await;
        match result {
            Ok(0) | Err(RoomError::Unavailable(_)) => {
                self.destroy_room(&code).await?;
            }
            Ok(_) => {}
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Routes a game command from a player to their current room.
    ///
    /// Votes and night actions from a player with no room are dropped
    /// with `Ok(())`; only `StartGame` reports `NoRoom`.
    pub async fn dispatch(
        &self,
        player_id: PlayerId,
        command: GameCommand,
    ) -> Result<(), RoomError> {
        match self.handle_for(player_id) {
            Ok(handle) => handle.command(player_id, command).await,
            Err(e) if command.is_submission() => {
                tracing::debug!(%player_id, error = %e, "submission outside a room dropped");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// The handle of the room a player sits in.
    ///
    /// Lets callers talk to the room without holding the registry lock.
    pub fn handle_for(&self, player_id: PlayerId) -> Result<RoomHandle, RoomError> {
        let code = self
            .player_rooms
            .get(&player_id)
            .ok_or(RoomError::NoRoom(player_id))?;
        self.rooms
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    /// Returns info about a specific room.
    pub async fn get_room_info(&self, code: &RoomCode) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        handle.get_info().await
    }

    /// Shuts down a room and removes all its players from the index.
    pub async fn destroy_room(&mut self, code: &RoomCode) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let _ = handle.shutdown().await;
        self.player_rooms.retain(|_, c| c != code);

        tracing::info!(room = %code, "room destroyed");
        Ok(())
    }

    /// Lists rooms still in their lobby, ordered by code.
    ///
    /// Rooms that fail to respond (e.g., shutting down) are skipped.
    pub async fn list_rooms(&self) -> Vec<RoomInfo> {
        list_joinable(self.room_handles()).await
    }

    /// Returns cloned handles to all live rooms.
    ///
    /// Useful when callers need to perform async operations on rooms
    /// without holding the registry lock.
    pub fn room_handles(&self) -> Vec<RoomHandle> {
        self.rooms.values().cloned().collect()
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn fresh_code(&self) -> Result<RoomCode, RoomError> {
        let mut rng = rand::rng();
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = random_code(&mut rng)
                .map_err(|e| RoomError::InvalidState(e.to_string()))?;
            if !self.rooms.contains_key(&code) {
                return Ok(code);
            }
        }
        Err(RoomError::InvalidState(
            "could not allocate a free room code".into(),
        ))
    }
}

/// Queries `handles` and keeps the rooms still accepting players.
pub async fn list_joinable(handles: Vec<RoomHandle>) -> Vec<RoomInfo> {
    let mut infos = Vec::with_capacity(handles.len());
    for handle in &handles {
        if let Ok(info) = handle.get_info().await {
            if info.phase.is_joinable() {
                infos.push(info);
            }
        }
    }
    infos.sort_by(|a, b| a.code.as_str().cmp(b.code.as_str()));
    infos
}

/// A random six-character code from `A-Z0-9`.
fn random_code<R: Rng>(rng: &mut R) -> Result<RoomCode, ProtocolError> {
    let code: String = (0..RoomCode::LEN)
        .map(|_| {
            let i = rng.random_range(0..RoomCode::ALPHABET.len());
            RoomCode::ALPHABET[i] as char
        })
        .collect();
    RoomCode::new(code)
}
