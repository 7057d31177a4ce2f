//! Random role assignment.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::warn;

use crate::{DistributionTable, Role, RulesError};

/// Draws a role list for a room from a [`DistributionTable`].
///
/// The assigner holds no random state of its own; callers pass the RNG,
/// so a room seeded for tests gets reproducible games.
#[derive(Debug, Clone, Default)]
pub struct RoleAssigner {
    table: DistributionTable,
}

impl RoleAssigner {
    pub fn new(table: DistributionTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &DistributionTable {
        &self.table
    }

    /// Produces `player_count` roles in random order.
    ///
    /// Evil: the basic quota is filled with copies of the evil basic role,
    /// then each variable slot draws independently (with replacement) from
    /// the evil variable pool. Good: basic and variable slots each draw
    /// independently from their pool. Evil and good lists are concatenated
    /// and shuffled so seat position says nothing about the role.
    ///
    /// A row that does not sum to `player_count` is padded with
    /// [`Role::FILLER`] or truncated from the end.
    ///
    /// # Errors
    /// [`RulesError::UnsupportedRoomSize`] if the table has no row for
    /// `player_count`.
    pub fn assign<R: Rng>(
        &self,
        player_count: usize,
        rng: &mut R,
    ) -> Result<Vec<Role>, RulesError> {
        let row = self
            .table
            .get(player_count)
            .ok_or(RulesError::UnsupportedRoomSize(player_count))?;

        let mut roles = Vec::with_capacity(player_count);

        for i in 0..row.evil.basic {
            roles.push(Role::EVIL_BASIC[i % Role::EVIL_BASIC.len()]);
        }
        for _ in 0..row.evil.variable {
            roles.push(draw(Role::EVIL_VARIABLE, rng));
        }
        for _ in 0..row.good.basic {
            roles.push(draw(Role::GOOD_BASIC, rng));
        }
        for _ in 0..row.good.variable {
            roles.push(draw(Role::GOOD_VARIABLE, rng));
        }

        if roles.len() != player_count {
            warn!(
                roles = roles.len(),
                players = player_count,
                "role distribution does not match room size, correcting"
            );
            roles.resize(player_count, Role::FILLER);
        }

        roles.shuffle(rng);
        Ok(roles)
    }
}

fn draw<R: Rng>(pool: &[Role], rng: &mut R) -> Role {
    pool[rng.random_range(0..pool.len())]
}
