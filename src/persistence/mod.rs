//! Persistence layer: the season-scoped ledger store.
//!
//! [`LedgerStore`] is the only shared mutable resource in the service.
//! Every method takes the season explicitly; nothing here knows which
//! season is "current". Two backends implement it:
//!
//! - [`postgres::PostgresStore`] over `sqlx::PgPool`, the production store.
//! - [`memory::MemoryStore`] behind a `tokio` lock, for dev mode and tests.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{
    AuthorAggregate, EloPolicy, EntryId, InsertReport, NewEntry, PoolStats, RatedEntry,
    RolloverPolicy, Season, StoredVoteAudit, VoteAudit, VoteOutcome,
};
use crate::error::EngineError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Durable store for entries, season ledger rows and the vote audit log.
#[async_trait]
pub trait LedgerStore: Send + Sync + std::fmt::Debug {
    /// Stores new entries and gives each a fresh ledger row in `season`.
    ///
    /// Ids that already exist are skipped and reported, never overwritten.
    async fn insert_entries(
        &self,
        season: Season,
        entries: &[NewEntry],
    ) -> Result<InsertReport, EngineError>;

    /// Reads one entry with its ledger row for `season`.
    async fn entry(&self, season: Season, id: &EntryId)
    -> Result<Option<RatedEntry>, EngineError>;

    /// Reads a season's entries, rating descending then id ascending.
    async fn season_entries(
        &self,
        season: Season,
        limit: Option<u32>,
    ) -> Result<Vec<RatedEntry>, EngineError>;

    /// Applies a decided vote as one atomic unit.
    ///
    /// Both rows are re-read under lock, `policy` computes the new ratings,
    /// both rows and the audit record are written, and nothing is visible
    /// unless all of it is.
    async fn record_vote(
        &self,
        season: Season,
        winner: &EntryId,
        loser: &EntryId,
        policy: &EloPolicy,
        audit: &VoteAudit,
    ) -> Result<VoteOutcome, EngineError>;

    /// Creates a ledger row in `season` for every entry lacking one.
    ///
    /// Idempotent; leaves existing rows of every season untouched. Returns
    /// the number of rows created.
    async fn open_season(&self, season: Season, policy: RolloverPolicy)
    -> Result<u64, EngineError>;

    /// Per-author totals, ratio descending then author ascending.
    async fn author_aggregates(
        &self,
        season: Season,
        limit: Option<u32>,
    ) -> Result<Vec<AuthorAggregate>, EngineError>;

    /// Pool-wide totals for a season.
    async fn pool_stats(&self, season: Season) -> Result<PoolStats, EngineError>;

    /// Id of the most recently inserted entry, used as the import watermark.
    async fn latest_entry_id(&self) -> Result<Option<EntryId>, EngineError>;

    /// Most recent audit records, newest first.
    async fn recent_audits(&self, limit: u32) -> Result<Vec<StoredVoteAudit>, EngineError>;
}
