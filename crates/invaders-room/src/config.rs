//! Room and engine configuration.

use std::time::Duration;

use invaders_rules::{DistributionTable, TieBreak};
use serde::{Deserialize, Serialize};

use crate::RoomError;

// ---------------------------------------------------------------------------
// RoomSettings
// ---------------------------------------------------------------------------

/// What the host chose when opening the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSettings {
    /// Seats in the room. Must be a size the distribution table knows.
    pub capacity: usize,

    /// Deal fresh roles to everyone before every night after the first.
    pub randomize_roles: bool,
}

impl RoomSettings {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            randomize_roles: false,
        }
    }

    pub fn randomize_roles(mut self, on: bool) -> Self {
        self.randomize_roles = on;
        self
    }

    /// Rejects capacities the distribution table has no row for.
    pub fn validate(&self, table: &DistributionTable) -> Result<(), RoomError> {
        if table.supports(self.capacity) {
            Ok(())
        } else {
            Err(RoomError::UnsupportedCapacity(self.capacity))
        }
    }
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self::new(5)
    }
}

// ---------------------------------------------------------------------------
// PhaseDurations
// ---------------------------------------------------------------------------

/// How long each timed phase lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseDurations {
    /// Grace period between the host starting and the first night.
    pub waiting: Duration,
    pub night: Duration,
    pub day: Duration,
    pub voting: Duration,
    /// Pause after the vote results before the next night.
    pub results: Duration,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            waiting: Duration::from_secs(5),
            night: Duration::from_secs(40),
            day: Duration::from_secs(90),
            voting: Duration::from_secs(60),
            results: Duration::from_secs(10),
        }
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Settings shared by every room a registry creates.
///
/// Missing fields fall back to their defaults when deserializing, so a
/// config file only needs the values it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub durations: PhaseDurations,

    /// How vote ties are settled.
    pub tie_break: TieBreak,

    /// Command channel size per room actor. Senders wait when it fills.
    pub channel_size: usize,

    /// Seed for role assignment. Every room seeded with the same value
    /// deals the same roles for the same sequence of games. `None` seeds
    /// from the OS.
    pub seed: Option<u64>,

    /// Number of trailing log lines sent with vote results.
    pub log_tail: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            durations: PhaseDurations::default(),
            tie_break: TieBreak::default(),
            channel_size: 64,
            seed: None,
            log_tail: 10,
        }
    }
}
