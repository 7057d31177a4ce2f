//! Game rules for Invaders.
//!
//! Everything in this crate is synchronous and free of I/O: it takes a
//! [`Roster`] plus whatever players submitted and returns what happened.
//! The room actor in `invaders-room` decides *when* each rule runs.
//!
//! # Key types
//!
//! - [`Role`] / [`Team`]: the closed role catalog
//! - [`DistributionTable`]: how many of each kind of role per room size
//! - [`RoleAssigner`]: draws and shuffles a role list
//! - [`Roster`]: members, alive/dead sets, per-player flags
//! - [`resolve_night`], [`resolve_votes`], [`evaluate_winner`]: one
//!   function per resolution step
//! - [`GameCommand`] / [`GameEvent`]: what players send and receive

mod assign;
mod distribution;
mod error;
mod event;
mod night;
mod phase;
mod role;
mod roster;
mod vote;
mod win;

pub use assign::RoleAssigner;
pub use distribution::{
    DistributionTable, RoleDistribution, SUPPORTED_ROOM_SIZES, TeamQuota,
};
pub use error::RulesError;
pub use event::{GameCommand, GameEvent, PlayerSummary, RoleReveal};
pub use night::{Investigation, NightAction, NightOutcome, resolve_night};
pub use phase::Phase;
pub use role::{NightEffect, Role, Team};
pub use roster::{Player, Roster};
pub use vote::{TieBreak, VoteCount, VoteOutcome, resolve_votes};
pub use win::evaluate_winner;
