//! Vote audit records and vote outcomes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{LedgerRow, RatedEntry};

/// Raw request metadata behind a vote.
///
/// Append-only and deliberately decoupled from entry identity: it records
/// what the requester sent, not what it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteAudit {
    /// Requester address as seen by the server.
    pub requester_address: Option<String>,
    /// `User-Agent` header, if any.
    pub requester_agent: Option<String>,
    /// Path and query of the originating request.
    pub request_path: String,
}

/// A stored audit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredVoteAudit {
    /// Store-assigned row id.
    pub id: i64,
    /// The recorded request metadata.
    pub audit: VoteAudit,
    /// When the row was written.
    pub created_at: DateTime<Utc>,
}

/// One side of a recorded vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct VoteSide {
    /// Ledger row read under lock before the update.
    pub before: LedgerRow,
    /// Entry with its ledger fields after the update.
    pub after: RatedEntry,
}

/// Result of an atomically applied vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct VoteOutcome {
    /// Winner before and after.
    pub winner: VoteSide,
    /// Loser before and after.
    pub loser: VoteSide,
    /// K-factor applied to both sides.
    pub k_factor: i32,
}

impl VoteOutcome {
    /// Rating change of the winner.
    #[must_use]
    pub const fn winner_delta(&self) -> i32 {
        self.winner.after.rating - self.winner.before.rating
    }

    /// Rating change of the loser.
    #[must_use]
    pub const fn loser_delta(&self) -> i32 {
        self.loser.after.rating - self.loser.before.rating
    }
}
