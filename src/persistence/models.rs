//! Row shapes returned by the PostgreSQL queries and their conversions.
//!
//! PostgreSQL has no unsigned integers, so counters travel as `INTEGER`
//! / `BIGINT` and are checked on the way in and out.

use chrono::{DateTime, Utc};

use crate::domain::{EntryId, LedgerRow, RatedEntry, Season, StoredVoteAudit, VoteAudit};
use crate::error::EngineError;

/// `(entry_id, author, content, season, wins, losses, rating)`
pub type RatedEntryRow = (String, String, String, i32, i32, i32, i32);

/// `(author, ratio, total_wins, total_losses, total_entries)`
pub type AuthorAggregateRow = (String, f64, i64, i64, i64);

/// `(total_entries, total_authors, total_votes)`
pub type PoolStatsRow = (i64, i64, i64);

/// `(id, requester_address, requester_agent, request_path, created_at)`
pub type VoteAuditRow = (i64, Option<String>, Option<String>, String, DateTime<Utc>);

/// Column list matching [`RatedEntryRow`], for `entries e JOIN season_ledger l`.
pub const RATED_ENTRY_COLUMNS: &str =
    "e.id, e.author, e.content, l.season, l.wins, l.losses, l.rating";

/// Converts a stored counter to its domain type.
///
/// # Errors
///
/// Returns [`EngineError::Internal`] if the stored value is negative.
pub fn counter_from_db<T: TryFrom<i64>>(value: impl Into<i64>, column: &str) -> Result<T, EngineError> {
    let value = value.into();
    T::try_from(value)
        .map_err(|_| EngineError::Internal(format!("stored {column} out of range: {value}")))
}

/// Converts a domain counter to its column type.
///
/// # Errors
///
/// Returns [`EngineError::Internal`] if the counter exceeds `i32::MAX`.
pub fn counter_to_db(value: u32, column: &str) -> Result<i32, EngineError> {
    i32::try_from(value)
        .map_err(|_| EngineError::Internal(format!("{column} overflowed: {value}")))
}

/// Builds a [`RatedEntry`] from a joined row.
///
/// # Errors
///
/// Returns [`EngineError::Internal`] on negative counters.
pub fn rated_entry_from_row(row: RatedEntryRow) -> Result<RatedEntry, EngineError> {
    let (id, author, content, season, wins, losses, rating) = row;
    let ledger = LedgerRow {
        entry_id: EntryId::new(id),
        season: Season::new(season),
        wins: counter_from_db(wins, "wins")?,
        losses: counter_from_db(losses, "losses")?,
        rating,
    };
    Ok(RatedEntry::from_parts(author, content, ledger))
}

/// Builds a [`StoredVoteAudit`] from a row.
#[must_use]
pub fn vote_audit_from_row(row: VoteAuditRow) -> StoredVoteAudit {
    let (id, requester_address, requester_agent, request_path, created_at) = row;
    StoredVoteAudit {
        id,
        audit: VoteAudit {
            requester_address,
            requester_agent,
            request_path,
        },
        created_at,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn negative_counter_is_rejected() {
        let row = ("1".to_string(), "a".to_string(), "c".to_string(), 1, -1, 0, 1500);
        assert!(rated_entry_from_row(row).is_err());
    }

    #[test]
    fn joined_row_maps_every_column() {
        let row = ("7".to_string(), "tony".to_string(), "soup".to_string(), 2, 3, 4, 1512);
        let Ok(entry) = rated_entry_from_row(row) else {
            panic!("conversion failed");
        };
        assert_eq!(entry.id.as_str(), "7");
        assert_eq!(entry.season, Season::new(2));
        assert_eq!((entry.wins, entry.losses, entry.rating), (3, 4, 1512));
    }

    #[test]
    fn large_counter_does_not_fit_column() {
        assert!(counter_to_db(u32::MAX, "wins").is_err());
        assert_eq!(counter_to_db(12, "wins").ok(), Some(12));
    }
}
