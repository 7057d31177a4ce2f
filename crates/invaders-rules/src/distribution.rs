//! Role distribution per room size.

use std::collections::BTreeMap;

/// Room sizes the standard table supports.
pub const SUPPORTED_ROOM_SIZES: [usize; 3] = [5, 7, 9];

/// How many basic and variable roles one team receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamQuota {
    pub basic: usize,
    pub variable: usize,
}

impl TeamQuota {
    pub const fn new(basic: usize, variable: usize) -> Self {
        Self { basic, variable }
    }

    pub fn total(&self) -> usize {
        self.basic + self.variable
    }
}

/// The role mix for one room size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleDistribution {
    pub evil: TeamQuota,
    pub good: TeamQuota,
}

impl RoleDistribution {
    /// Total number of roles this row produces.
    pub fn total(&self) -> usize {
        self.evil.total() + self.good.total()
    }
}

/// Maps room size to its [`RoleDistribution`].
///
/// [`DistributionTable::standard`] is the table the game ships with and
/// the single source of truth for which room sizes exist. Every row
/// sums exactly to its room size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionTable {
    rows: BTreeMap<usize, RoleDistribution>,
}

impl DistributionTable {
    /// The shipped table:
    ///
    /// | size | evil basic | evil variable | good basic | good variable |
    /// |------|-----------:|--------------:|-----------:|--------------:|
    /// | 5    | 1          | 0             | 2          | 2             |
    /// | 7    | 1          | 1             | 3          | 2             |
    /// | 9    | 1          | 2             | 2          | 4             |
    pub fn standard() -> Self {
        Self::empty()
            .with_row(5, TeamQuota::new(1, 0), TeamQuota::new(2, 2))
            .with_row(7, TeamQuota::new(1, 1), TeamQuota::new(3, 2))
            .with_row(9, TeamQuota::new(1, 2), TeamQuota::new(2, 4))
    }

    /// A table with no rows.
    pub fn empty() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    /// Adds or replaces the row for `size`.
    ///
    /// Rows are not required to sum to `size`; the assigner corrects a
    /// mismatch at draw time and logs a warning.
    pub fn with_row(
        mut self,
        size: usize,
        evil: TeamQuota,
        good: TeamQuota,
    ) -> Self {
        self.rows.insert(size, RoleDistribution { evil, good });
        self
    }

    pub fn get(&self, size: usize) -> Option<&RoleDistribution> {
        self.rows.get(&size)
    }

    pub fn supports(&self, size: usize) -> bool {
        self.rows.contains_key(&size)
    }
}

impl Default for DistributionTable {
    fn default() -> Self {
        Self::standard()
    }
}
