//! Error types for the rules layer.

/// Errors raised by the rules engine.
///
/// Only configuration problems surface as errors. Bad player input is
/// never an error here: the room drops it before it reaches the rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// The distribution table has no row for this number of players.
    #[error("no role distribution for {0} players")]
    UnsupportedRoomSize(usize),
}
