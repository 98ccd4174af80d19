//! Read-only projections over one season's ledger.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::{RatedEntry, Season};

/// Per-author totals for one season.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AuthorAggregate {
    /// Author name.
    pub author: String,
    /// `total_wins / total_losses`, or `total_wins` when there are no losses.
    pub ratio: f64,
    /// Wins across all of the author's entries.
    pub total_wins: u64,
    /// Losses across all of the author's entries.
    pub total_losses: u64,
    /// Number of the author's entries in the season.
    pub total_entries: u64,
}

/// Win ratio with the no-loss fallback: the raw win count, not infinity.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn win_ratio(wins: u64, losses: u64) -> f64 {
    if losses > 0 {
        wins as f64 / losses as f64
    } else {
        wins as f64
    }
}

/// Orders aggregates by ratio descending, then author ascending.
pub fn author_order(a: &AuthorAggregate, b: &AuthorAggregate) -> std::cmp::Ordering {
    b.ratio
        .total_cmp(&a.ratio)
        .then_with(|| a.author.cmp(&b.author))
}

/// Groups a season's entries by author.
#[must_use]
pub fn aggregate_authors(entries: &[RatedEntry], limit: Option<usize>) -> Vec<AuthorAggregate> {
    let mut totals: BTreeMap<&str, (u64, u64, u64)> = BTreeMap::new();
    for entry in entries {
        let t = totals.entry(entry.author.as_str()).or_default();
        t.0 += u64::from(entry.wins);
        t.1 += u64::from(entry.losses);
        t.2 += 1;
    }

    let mut aggregates: Vec<AuthorAggregate> = totals
        .into_iter()
        .map(|(author, (wins, losses, count))| AuthorAggregate {
            author: author.to_string(),
            ratio: win_ratio(wins, losses),
            total_wins: wins,
            total_losses: losses,
            total_entries: count,
        })
        .collect();
    aggregates.sort_by(author_order);
    if let Some(limit) = limit {
        aggregates.truncate(limit);
    }
    aggregates
}

/// Pool-wide totals for one season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PoolStats {
    /// Season the totals cover.
    pub season: Season,
    /// Entries with a ledger row in the season.
    pub total_entries: u64,
    /// Distinct authors among those entries.
    pub total_authors: u64,
    /// `(sum(wins) + sum(losses)) / 2`.
    pub total_votes: u64,
}

impl PoolStats {
    /// Computes the totals from a season's entries.
    #[must_use]
    pub fn from_entries(season: Season, entries: &[RatedEntry]) -> Self {
        let mut authors: Vec<&str> = entries.iter().map(|e| e.author.as_str()).collect();
        authors.sort_unstable();
        authors.dedup();

        let decided: u64 = entries
            .iter()
            .map(|e| u64::from(e.wins) + u64::from(e.losses))
            .sum();

        Self {
            season,
            total_entries: entries.len() as u64,
            total_authors: authors.len() as u64,
            total_votes: decided / 2,
        }
    }
}

/// Historical view of one season.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SeasonSummary {
    /// Pool-wide totals.
    pub stats: PoolStats,
    /// Highest-rated entry, ties broken by id. `None` for an empty season.
    pub champion: Option<RatedEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntryId, LedgerRow};

    fn entry(id: &str, author: &str, wins: u32, losses: u32) -> RatedEntry {
        let mut row = LedgerRow::fresh(EntryId::new(id), Season::FIRST);
        row.wins = wins;
        row.losses = losses;
        RatedEntry::from_parts(author.to_string(), String::new(), row)
    }

    #[test]
    fn ratio_without_losses_is_the_win_count() {
        assert!((win_ratio(5, 0) - 5.0).abs() < f64::EPSILON);
        assert!((win_ratio(0, 0)).abs() < f64::EPSILON);
    }

    #[test]
    fn ratio_with_losses_divides() {
        assert!((win_ratio(6, 4) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn authors_are_summed_and_ordered() {
        let entries = vec![
            entry("1", "tony", 2, 2),
            entry("2", "clive", 5, 0),
            entry("3", "tony", 4, 1),
            entry("4", "nigel", 1, 1),
        ];
        let aggregates = aggregate_authors(&entries, None);
        let names: Vec<&str> = aggregates.iter().map(|a| a.author.as_str()).collect();
        assert_eq!(names, vec!["clive", "tony", "nigel"]);

        let clive = aggregates.first().map(|a| (a.ratio, a.total_entries));
        assert_eq!(clive, Some((5.0, 1)));
        let tony = aggregates.get(1).map(|a| (a.total_wins, a.total_losses, a.total_entries));
        assert_eq!(tony, Some((6, 3, 2)));
    }

    #[test]
    fn equal_ratios_order_by_author() {
        let entries = vec![entry("1", "zed", 1, 1), entry("2", "amy", 2, 2)];
        let aggregates = aggregate_authors(&entries, Some(1));
        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates.first().map(|a| a.author.as_str()), Some("amy"));
    }

    #[test]
    fn stats_recover_vote_count() {
        let entries = vec![
            entry("1", "tony", 3, 1),
            entry("2", "clive", 1, 2),
            entry("3", "tony", 0, 1),
        ];
        let stats = PoolStats::from_entries(Season::FIRST, &entries);
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.total_authors, 2);
        assert_eq!(stats.total_votes, 4);
    }
}
