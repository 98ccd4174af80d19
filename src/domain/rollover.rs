//! Season rollover policy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a new season's ledger rows pick their starting rating.
///
/// Entry identity always carries forward; only the starting rating differs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloverPolicy {
    /// Every row starts at the baseline rating.
    #[default]
    Reset,
    /// Rows start at the entry's rating from the immediately preceding
    /// season, or the baseline if it had no row there.
    CarryForward,
}

impl fmt::Display for RolloverPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => f.write_str("reset"),
            Self::CarryForward => f.write_str("carry_forward"),
        }
    }
}
