//! Room lifecycle management for Invaders.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! [`Room`] state and a single phase timer. Rules come from
//! `invaders-rules`; this crate decides when they run.
//!
//! # Key types
//!
//! - [`Room`]: membership, phase, pending submissions, game log
//! - [`PhaseScheduler`]: start, submissions, and timed phase transitions
//! - [`RoomRegistry`]: creates/destroys rooms, routes players
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`EngineConfig`] / [`RoomSettings`]: durations, tie policy, seats

mod config;
mod error;
mod registry;
mod room;
mod scheduler;
mod state;

pub use config::{EngineConfig, PhaseDurations, RoomSettings};
pub use error::RoomError;
pub use registry::{RoomRegistry, list_joinable};
pub use room::{PlayerSender, RoomHandle, RoomInfo};
pub use scheduler::{PhaseScheduler, Step, Transition};
pub use state::Room;
