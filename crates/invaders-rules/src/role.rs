//! The role catalog.
//!
//! Ten fixed roles split across two teams. Each role knows its team,
//! whether it fills a "basic" slot in the distribution table, and what it
//! does at night. Adding a role means adding a variant here; every
//! `match` on [`Role`] then fails to compile until the new role is
//! handled.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Team alignment. The game ends when one team has the numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Good,
    Evil,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Good => write!(f, "good"),
            Self::Evil => write!(f, "evil"),
        }
    }
}

/// What a role's night action does when the night is resolved.
///
/// Resolution runs the effects in a fixed order: protection, then kills,
/// then investigation, silencing and revival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NightEffect {
    /// Shields the target from kills this night.
    Protect,
    /// Kills the target unless protected.
    Kill,
    /// Privately reveals whether the target reads as good.
    Investigate,
    /// Stops the target from voting in the next voting phase.
    Silence,
    /// Brings a dead good-team target back.
    Revive,
    /// Nothing happens at night.
    None,
}

/// One of the ten role kinds.
///
/// Serialized in SCREAMING_SNAKE_CASE (`"THE_STRANGER"`), which is also
/// the tag clients send with a night action.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    // -- Evil --
    Visitor,
    EatingHeads,
    Nemesis,
    AlienKing,

    // -- Good --
    Conductor,
    Doctor,
    Almodamer,
    Merchant,
    Traveler,
    TheStranger,
}

impl Role {
    /// Every role, evil first.
    pub const ALL: [Role; 10] = [
        Role::Visitor,
        Role::EatingHeads,
        Role::Nemesis,
        Role::AlienKing,
        Role::Conductor,
        Role::Doctor,
        Role::Almodamer,
        Role::Merchant,
        Role::Traveler,
        Role::TheStranger,
    ];

    /// Evil roles that fill basic slots.
    pub const EVIL_BASIC: &'static [Role] = &[Role::Visitor];

    /// Evil roles drawn for variable slots.
    pub const EVIL_VARIABLE: &'static [Role] =
        &[Role::EatingHeads, Role::Nemesis, Role::AlienKing];

    /// Good roles drawn for basic slots.
    pub const GOOD_BASIC: &'static [Role] = &[Role::Conductor, Role::Doctor];

    /// Good roles drawn for variable slots.
    pub const GOOD_VARIABLE: &'static [Role] = &[
        Role::Almodamer,
        Role::Merchant,
        Role::Traveler,
        Role::TheStranger,
    ];

    /// The role used to pad a role list that came out too short.
    pub const FILLER: Role = Role::Traveler;

    pub fn team(self) -> Team {
        match self {
            Self::Visitor | Self::EatingHeads | Self::Nemesis | Self::AlienKing => {
                Team::Evil
            }
            Self::Conductor
            | Self::Doctor
            | Self::Almodamer
            | Self::Merchant
            | Self::Traveler
            | Self::TheStranger => Team::Good,
        }
    }

    /// Whether the role counts toward a team's basic quota.
    pub fn is_basic(self) -> bool {
        matches!(self, Self::Visitor | Self::Conductor | Self::Doctor)
    }

    /// The team a Conductor's investigation reports.
    ///
    /// The Visitor is disguised and always reads as good.
    pub fn apparent_team(self) -> Team {
        match self {
            Self::Visitor => Team::Good,
            other => other.team(),
        }
    }

    pub fn night_effect(self) -> NightEffect {
        match self {
            Self::Doctor => NightEffect::Protect,
            Self::Visitor => NightEffect::Kill,
            Self::Conductor => NightEffect::Investigate,
            Self::EatingHeads => NightEffect::Silence,
            Self::TheStranger => NightEffect::Revive,
            Self::Nemesis
            | Self::AlienKing
            | Self::Almodamer
            | Self::Merchant
            | Self::Traveler => NightEffect::None,
        }
    }

    /// Display name shown to players.
    pub fn name(self) -> &'static str {
        match self {
            Self::Visitor => "Visitor",
            Self::EatingHeads => "Eating heads",
            Self::Nemesis => "Nemesis",
            Self::AlienKing => "Alien king",
            Self::Conductor => "Conductor",
            Self::Doctor => "Doctor",
            Self::Almodamer => "Almodamer",
            Self::Merchant => "Merchant",
            Self::Traveler => "Traveler",
            Self::TheStranger => "The Stranger",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Visitor => "An alien who reads as good when investigated. Kills one player each night.",
            Self::EatingHeads => "Eats a player's brain at night so they cannot vote the next day.",
            Self::Nemesis => "Copies the ability of a good character.",
            Self::AlienKing => "Once per game, the player this role votes for dies on the spot.",
            Self::Conductor => "Investigates a player each night to learn their team.",
            Self::Doctor => "Protects one player from being killed during the night.",
            Self::Almodamer => "Turns a killed evil player good, and the reverse.",
            Self::Merchant => "Reveals a good role upon death.",
            Self::Traveler => "Has no special ability.",
            Self::TheStranger => "Brings a dead good player back to life.",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
