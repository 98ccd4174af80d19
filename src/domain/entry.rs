//! Entries and their per-season ledger rows.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EntryId, Season};

/// Rating every ledger row starts a season with.
pub const BASELINE_RATING: i32 = 1500;

/// An entry as handed over by the ingestion source.
///
/// Entries are immutable once stored: there is no update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewEntry {
    /// Source-assigned identifier.
    pub id: EntryId,
    /// Free-text attribution.
    pub author: String,
    /// The text being rated.
    pub content: String,
}

/// Result of a batch insert from the ingestion source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InsertReport {
    /// Entries stored by this batch.
    pub inserted: Vec<EntryId>,
    /// Entries skipped because their id already existed.
    pub skipped: Vec<EntryId>,
}

/// Mutable per-entry, per-season rating record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LedgerRow {
    /// Entry the row belongs to.
    pub entry_id: EntryId,
    /// Season the row belongs to.
    pub season: Season,
    /// Decided votes this entry won in the season.
    pub wins: u32,
    /// Decided votes this entry lost in the season.
    pub losses: u32,
    /// Current rating. Unclamped, may in principle go negative.
    pub rating: i32,
}

impl LedgerRow {
    /// Creates a fresh row at the season baseline.
    #[must_use]
    pub fn fresh(entry_id: EntryId, season: Season) -> Self {
        Self::starting_at(entry_id, season, BASELINE_RATING)
    }

    /// Creates a row with no games played at the given starting rating.
    #[must_use]
    pub fn starting_at(entry_id: EntryId, season: Season, rating: i32) -> Self {
        Self {
            entry_id,
            season,
            wins: 0,
            losses: 0,
            rating,
        }
    }

    /// Total decided votes involving this entry in the season.
    #[must_use]
    pub const fn games_played(&self) -> u32 {
        self.wins.saturating_add(self.losses)
    }
}

/// An entry joined with its ledger row for one season.
///
/// This is the shape the leaderboard, the pairing endpoint and the vote
/// response all return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RatedEntry {
    /// Entry identifier.
    pub id: EntryId,
    /// Entry author.
    pub author: String,
    /// Entry content.
    pub content: String,
    /// Season the ledger fields refer to.
    pub season: Season,
    /// Wins this season.
    pub wins: u32,
    /// Losses this season.
    pub losses: u32,
    /// Rating this season.
    pub rating: i32,
}

impl RatedEntry {
    /// Joins an entry's descriptive fields with a ledger row.
    #[must_use]
    pub fn from_parts(author: String, content: String, row: LedgerRow) -> Self {
        Self {
            id: row.entry_id,
            author,
            content,
            season: row.season,
            wins: row.wins,
            losses: row.losses,
            rating: row.rating,
        }
    }

    /// Returns the ledger half of this entry.
    #[must_use]
    pub fn ledger_row(&self) -> LedgerRow {
        LedgerRow {
            entry_id: self.id.clone(),
            season: self.season,
            wins: self.wins,
            losses: self.losses,
            rating: self.rating,
        }
    }

    /// Copies the ledger fields of `row` into this entry.
    #[must_use]
    pub fn with_ledger(mut self, row: &LedgerRow) -> Self {
        self.season = row.season;
        self.wins = row.wins;
        self.losses = row.losses;
        self.rating = row.rating;
        self
    }
}

/// Orders entries the way the leaderboard does: rating descending, then id
/// ascending.
pub fn leaderboard_order(a: &RatedEntry, b: &RatedEntry) -> std::cmp::Ordering {
    b.rating.cmp(&a.rating).then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rated(id: &str, rating: i32) -> RatedEntry {
        RatedEntry::from_parts(
            "clive".to_string(),
            format!("paste {id}"),
            LedgerRow::starting_at(EntryId::new(id), Season::FIRST, rating),
        )
    }

    #[test]
    fn fresh_row_starts_at_baseline() {
        let row = LedgerRow::fresh(EntryId::new("1"), Season::new(2));
        assert_eq!(row.rating, BASELINE_RATING);
        assert_eq!(row.games_played(), 0);
    }

    #[test]
    fn leaderboard_order_breaks_ties_by_id() {
        let mut entries = vec![rated("b", 1500), rated("c", 1600), rated("a", 1500)];
        entries.sort_by(leaderboard_order);
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn with_ledger_replaces_counters_only() {
        let entry = rated("a", 1500);
        let mut row = entry.ledger_row();
        row.wins = 3;
        row.rating = 1530;
        let updated = entry.with_ledger(&row);
        assert_eq!(updated.wins, 3);
        assert_eq!(updated.rating, 1530);
        assert_eq!(updated.author, "clive");
    }
}
