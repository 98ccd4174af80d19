//! In-memory ledger store.
//!
//! Used when persistence is disabled (dev mode) and by the test suite.
//! Votes are serialized by a single write lock over the whole state, which
//! makes each vote trivially linearizable.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::LedgerStore;
use crate::domain::aggregate::aggregate_authors;
use crate::domain::entry::leaderboard_order;
use crate::domain::{
    AuthorAggregate, BASELINE_RATING, EloPolicy, EntryId, InsertReport, LedgerRow, NewEntry,
    PoolStats, RatedEntry, RolloverPolicy, Season, StoredVoteAudit, VoteAudit, VoteOutcome,
    VoteSide,
};
use crate::error::EngineError;

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<EntryId, NewEntry>,
    insertion_order: Vec<EntryId>,
    ledger: BTreeMap<(Season, EntryId), LedgerRow>,
    audits: Vec<StoredVoteAudit>,
}

impl MemoryState {
    fn rated(&self, row: &LedgerRow) -> Result<RatedEntry, EngineError> {
        let entry = self.entries.get(&row.entry_id).ok_or_else(|| {
            EngineError::Internal(format!("ledger row without entry {}", row.entry_id))
        })?;
        Ok(RatedEntry::from_parts(
            entry.author.clone(),
            entry.content.clone(),
            row.clone(),
        ))
    }

    fn season_rows(&self, season: Season) -> impl Iterator<Item = &LedgerRow> {
        self.ledger
            .range((season, EntryId::new(""))..)
            .take_while(move |((s, _), _)| *s == season)
            .map(|(_, row)| row)
    }

    fn season_entries(&self, season: Season) -> Result<Vec<RatedEntry>, EngineError> {
        let mut entries = self
            .season_rows(season)
            .map(|row| self.rated(row))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by(leaderboard_order);
        Ok(entries)
    }

    fn locked_row(&self, season: Season, id: &EntryId) -> Result<LedgerRow, EngineError> {
        self.ledger
            .get(&(season, id.clone()))
            .cloned()
            .ok_or_else(|| EngineError::EntryNotFound {
                entry_id: id.clone(),
                season,
            })
    }
}

/// Thread-safe in-memory [`LedgerStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    fail_audit_writes: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent audit write fail, as if the store went away
    /// in the middle of a vote. Used to check votes are all-or-nothing.
    pub fn fail_audit_writes(&self, fail: bool) {
        self.fail_audit_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of ledger rows across all seasons.
    pub async fn ledger_len(&self) -> usize {
        self.state.read().await.ledger.len()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn insert_entries(
        &self,
        season: Season,
        entries: &[NewEntry],
    ) -> Result<InsertReport, EngineError> {
        let mut state = self.state.write().await;
        let mut report = InsertReport::default();

        for entry in entries {
            if state.entries.contains_key(&entry.id) {
                tracing::warn!(entry_id = %entry.id, "entry already exists, skipping");
                report.skipped.push(entry.id.clone());
                continue;
            }
            state.entries.insert(entry.id.clone(), entry.clone());
            state.insertion_order.push(entry.id.clone());
            state.ledger.insert(
                (season, entry.id.clone()),
                LedgerRow::fresh(entry.id.clone(), season),
            );
            report.inserted.push(entry.id.clone());
        }

        Ok(report)
    }

    async fn entry(
        &self,
        season: Season,
        id: &EntryId,
    ) -> Result<Option<RatedEntry>, EngineError> {
        let state = self.state.read().await;
        state
            .ledger
            .get(&(season, id.clone()))
            .map(|row| state.rated(row))
            .transpose()
    }

    async fn season_entries(
        &self,
        season: Season,
        limit: Option<u32>,
    ) -> Result<Vec<RatedEntry>, EngineError> {
        let mut entries = self.state.read().await.season_entries(season)?;
        if let Some(limit) = limit {
            entries.truncate(limit as usize);
        }
        Ok(entries)
    }

    async fn record_vote(
        &self,
        season: Season,
        winner: &EntryId,
        loser: &EntryId,
        policy: &EloPolicy,
        audit: &VoteAudit,
    ) -> Result<VoteOutcome, EngineError> {
        let mut state = self.state.write().await;

        let winner_before = state.locked_row(season, winner)?;
        let loser_before = state.locked_row(season, loser)?;
        let (winner_after, loser_after, k_factor) = policy.apply(&winner_before, &loser_before);

        if self.fail_audit_writes.load(Ordering::SeqCst) {
            return Err(EngineError::StoreUnavailable(
                "audit write failed".to_string(),
            ));
        }

        let outcome = VoteOutcome {
            winner: VoteSide {
                after: state.rated(&winner_after)?,
                before: winner_before,
            },
            loser: VoteSide {
                after: state.rated(&loser_after)?,
                before: loser_before,
            },
            k_factor,
        };

        state
            .ledger
            .insert((season, winner.clone()), winner_after);
        state.ledger.insert((season, loser.clone()), loser_after);
        let id = i64::try_from(state.audits.len())
            .map_err(|e| EngineError::Internal(e.to_string()))?
            + 1;
        state.audits.push(StoredVoteAudit {
            id,
            audit: audit.clone(),
            created_at: Utc::now(),
        });

        Ok(outcome)
    }

    async fn open_season(
        &self,
        season: Season,
        policy: RolloverPolicy,
    ) -> Result<u64, EngineError> {
        let mut state = self.state.write().await;
        let previous = season.previous();
        let mut created = 0u64;

        for id in state.insertion_order.clone() {
            let key = (season, id.clone());
            if state.ledger.contains_key(&key) {
                continue;
            }
            let rating = match (policy, previous) {
                (RolloverPolicy::CarryForward, Some(prev)) => state
                    .ledger
                    .get(&(prev, id.clone()))
                    .map_or(BASELINE_RATING, |row| row.rating),
                _ => BASELINE_RATING,
            };
            state
                .ledger
                .insert(key, LedgerRow::starting_at(id, season, rating));
            created += 1;
        }

        Ok(created)
    }

    async fn author_aggregates(
        &self,
        season: Season,
        limit: Option<u32>,
    ) -> Result<Vec<AuthorAggregate>, EngineError> {
        let entries = self.state.read().await.season_entries(season)?;
        Ok(aggregate_authors(&entries, limit.map(|l| l as usize)))
    }

    async fn pool_stats(&self, season: Season) -> Result<PoolStats, EngineError> {
        let entries = self.state.read().await.season_entries(season)?;
        Ok(PoolStats::from_entries(season, &entries))
    }

    async fn latest_entry_id(&self) -> Result<Option<EntryId>, EngineError> {
        Ok(self.state.read().await.insertion_order.last().cloned())
    }

    async fn recent_audits(&self, limit: u32) -> Result<Vec<StoredVoteAudit>, EngineError> {
        let state = self.state.read().await;
        Ok(state
            .audits
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
