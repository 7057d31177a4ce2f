//! Room membership and life/death bookkeeping.

use std::collections::BTreeSet;

use invaders_protocol::PlayerId;

use crate::Role;

/// A seated player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// `None` until the game starts.
    pub role: Option<Role>,
    /// Set by an Eating Heads night action; cleared after the next vote.
    pub cant_vote_next_day: bool,
    /// Armed at game start, consumed by the first Alien King vote.
    pub can_use_alien_king: bool,
}

impl Player {
    fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            role: None,
            cant_vote_next_day: false,
            can_use_alien_king: false,
        }
    }
}

/// The members of one room, in join order, split into alive and dead.
///
/// Invariant: `alive` and `dead` are disjoint and together hold exactly
/// the member ids. Players are alive from the moment they sit down;
/// only night kills and executions move them to `dead`.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: Vec<Player>,
    alive: BTreeSet<PlayerId>,
    dead: BTreeSet<PlayerId>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats a new player at the end of the join order.
    ///
    /// Returns `false` (and changes nothing) if the id is already seated.
    pub fn add(&mut self, id: PlayerId, name: impl Into<String>) -> bool {
        if self.contains(id) {
            return false;
        }
        self.players.push(Player::new(id, name.into()));
        self.alive.insert(id);
        self.debug_check();
        true
    }

    /// Removes a player entirely. Returns the removed player.
    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == id)?;
        self.alive.remove(&id);
        self.dead.remove(&id);
        let player = self.players.remove(index);
        self.debug_check();
        Some(player)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Players in join order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Member ids in join order.
    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().map(|p| p.id)
    }

    /// The member who joined first, if any.
    pub fn first(&self) -> Option<PlayerId> {
        self.players.first().map(|p| p.id)
    }

    pub fn role_of(&self, id: PlayerId) -> Option<Role> {
        self.get(id).and_then(|p| p.role)
    }

    /// Display name, or a placeholder for ids that are not seated.
    pub fn name_of(&self, id: PlayerId) -> &str {
        self.get(id).map_or("an unknown player", |p| p.name.as_str())
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.alive.contains(&id)
    }

    pub fn is_dead(&self, id: PlayerId) -> bool {
        self.dead.contains(&id)
    }

    pub fn alive(&self) -> &BTreeSet<PlayerId> {
        &self.alive
    }

    pub fn dead(&self) -> &BTreeSet<PlayerId> {
        &self.dead
    }

    /// Moves a living player to the dead set. Returns `false` if the
    /// player was not alive, which makes repeated kills no-ops.
    pub fn kill(&mut self, id: PlayerId) -> bool {
        if !self.alive.remove(&id) {
            return false;
        }
        self.dead.insert(id);
        self.debug_check();
        true
    }

    /// Moves a dead player back to the alive set. Returns `false` if the
    /// player was not dead.
    pub fn revive(&mut self, id: PlayerId) -> bool {
        if !self.dead.remove(&id) {
            return false;
        }
        self.alive.insert(id);
        self.debug_check();
        true
    }

    /// Starts a fresh game: deals `roles` in join order, revives
    /// everyone, arms every Alien King ability and clears vote bans.
    ///
    /// Extra roles are ignored; players beyond the end of `roles` keep
    /// whatever role they had.
    pub fn start_game(&mut self, roles: &[Role]) {
        self.deal(roles);
        for player in &mut self.players {
            player.cant_vote_next_day = false;
            player.can_use_alien_king = true;
        }
        self.dead.clear();
        self.alive = self.players.iter().map(|p| p.id).collect();
        self.debug_check();
    }

    /// Replaces roles in join order without touching life state or
    /// ability flags. Dead players are dealt a role too.
    pub fn deal(&mut self, roles: &[Role]) {
        for (player, role) in self.players.iter_mut().zip(roles) {
            player.role = Some(*role);
        }
    }

    /// Bars a player from voting in the next voting phase.
    pub fn silence(&mut self, id: PlayerId) {
        if let Some(player) = self.get_mut(id) {
            player.cant_vote_next_day = true;
        }
    }

    pub fn is_silenced(&self, id: PlayerId) -> bool {
        self.get(id).is_some_and(|p| p.cant_vote_next_day)
    }

    /// Lifts every vote ban.
    pub fn clear_silences(&mut self) {
        for player in &mut self.players {
            player.cant_vote_next_day = false;
        }
    }

    /// Checks that `alive` and `dead` partition the membership.
    pub fn is_consistent(&self) -> bool {
        self.alive.is_disjoint(&self.dead)
            && self.alive.len() + self.dead.len() == self.players.len()
            && self
                .players
                .iter()
                .all(|p| self.alive.contains(&p.id) || self.dead.contains(&p.id))
    }

    fn debug_check(&self) {
        debug_assert!(self.is_consistent(), "roster invariant broken: {self:?}");
    }
}
