//! PostgreSQL implementation of the ledger store.
//!
//! Votes lock both ledger rows with `SELECT ... FOR UPDATE` in `entry_id`
//! order inside one transaction, so concurrent votes touching the same
//! entry queue behind each other instead of losing an update, and two
//! votes over the same pair in opposite roles cannot deadlock.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::LedgerStore;
use super::models::{
    AuthorAggregateRow, PoolStatsRow, RATED_ENTRY_COLUMNS, RatedEntryRow, VoteAuditRow,
    counter_from_db, counter_to_db, rated_entry_from_row, vote_audit_from_row,
};
use crate::config::EngineConfig;
use crate::domain::{
    AuthorAggregate, BASELINE_RATING, EloPolicy, EntryId, InsertReport, NewEntry, PoolStats,
    RatedEntry, RolloverPolicy, Season, StoredVoteAudit, VoteAudit, VoteOutcome, VoteSide,
};
use crate::error::EngineError;

fn store_err(e: sqlx::Error) -> EngineError {
    EngineError::StoreUnavailable(e.to_string())
}

/// PostgreSQL-backed ledger store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StoreUnavailable`] if the database cannot be
    /// reached.
    pub async fn connect(config: &EngineConfig) -> Result<Self, EngineError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(store_err)?;
        Ok(Self::new(pool))
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StoreUnavailable`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), EngineError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| EngineError::StoreUnavailable(e.to_string()))
    }
}

#[async_trait]
impl LedgerStore for PostgresStore {
    async fn insert_entries(
        &self,
        season: Season,
        entries: &[NewEntry],
    ) -> Result<InsertReport, EngineError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;
        let mut report = InsertReport::default();

        for entry in entries {
            let inserted = sqlx::query(
                "INSERT INTO entries (id, author, content) VALUES ($1, $2, $3) \
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(entry.id.as_str())
            .bind(&entry.author)
            .bind(&entry.content)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?
            .rows_affected();

            if inserted == 0 {
                tracing::warn!(entry_id = %entry.id, "entry already exists, skipping");
                report.skipped.push(entry.id.clone());
                continue;
            }

            sqlx::query(
                "INSERT INTO season_ledger (entry_id, season, rating) VALUES ($1, $2, $3) \
                 ON CONFLICT (entry_id, season) DO NOTHING",
            )
            .bind(entry.id.as_str())
            .bind(season.number())
            .bind(BASELINE_RATING)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;

            report.inserted.push(entry.id.clone());
        }

        tx.commit().await.map_err(store_err)?;
        Ok(report)
    }

    async fn entry(
        &self,
        season: Season,
        id: &EntryId,
    ) -> Result<Option<RatedEntry>, EngineError> {
        let sql = format!(
            "SELECT {RATED_ENTRY_COLUMNS} FROM entries e \
             JOIN season_ledger l ON l.entry_id = e.id AND l.season = $1 \
             WHERE e.id = $2"
        );
        sqlx::query_as::<_, RatedEntryRow>(&sql)
            .bind(season.number())
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?
            .map(rated_entry_from_row)
            .transpose()
    }

    async fn season_entries(
        &self,
        season: Season,
        limit: Option<u32>,
    ) -> Result<Vec<RatedEntry>, EngineError> {
        let sql = format!(
            "SELECT {RATED_ENTRY_COLUMNS} FROM entries e \
             JOIN season_ledger l ON l.entry_id = e.id AND l.season = $1 \
             ORDER BY l.rating DESC, l.entry_id COLLATE \"C\" ASC \
             LIMIT $2"
        );
        sqlx::query_as::<_, RatedEntryRow>(&sql)
            .bind(season.number())
            .bind(limit.map(i64::from))
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(rated_entry_from_row)
            .collect()
    }

    async fn record_vote(
        &self,
        season: Season,
        winner: &EntryId,
        loser: &EntryId,
        policy: &EloPolicy,
        audit: &VoteAudit,
    ) -> Result<VoteOutcome, EngineError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let sql = format!(
            "SELECT {RATED_ENTRY_COLUMNS} FROM entries e \
             JOIN season_ledger l ON l.entry_id = e.id AND l.season = $1 \
             WHERE e.id IN ($2, $3) \
             ORDER BY l.entry_id COLLATE \"C\" \
             FOR UPDATE OF l"
        );
        let locked: Vec<RatedEntry> = sqlx::query_as::<_, RatedEntryRow>(&sql)
            .bind(season.number())
            .bind(winner.as_str())
            .bind(loser.as_str())
            .fetch_all(&mut *tx)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(rated_entry_from_row)
            .collect::<Result<_, _>>()?;

        let find = |id: &EntryId| {
            locked
                .iter()
                .find(|e| &e.id == id)
                .cloned()
                .ok_or_else(|| EngineError::EntryNotFound {
                    entry_id: id.clone(),
                    season,
                })
        };
        let winner_entry = find(winner)?;
        let loser_entry = find(loser)?;

        let winner_before = winner_entry.ledger_row();
        let loser_before = loser_entry.ledger_row();
        let (winner_after, loser_after, k_factor) = policy.apply(&winner_before, &loser_before);

        for row in [&winner_after, &loser_after] {
            sqlx::query(
                "UPDATE season_ledger SET rating = $1, wins = $2, losses = $3 \
                 WHERE entry_id = $4 AND season = $5",
            )
            .bind(row.rating)
            .bind(counter_to_db(row.wins, "wins")?)
            .bind(counter_to_db(row.losses, "losses")?)
            .bind(row.entry_id.as_str())
            .bind(season.number())
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;
        }

        sqlx::query(
            "INSERT INTO vote_audit (requester_address, requester_agent, request_path) \
             VALUES ($1, $2, $3)",
        )
        .bind(audit.requester_address.as_deref())
        .bind(audit.requester_agent.as_deref())
        .bind(&audit.request_path)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;

        Ok(VoteOutcome {
            winner: VoteSide {
                after: winner_entry.with_ledger(&winner_after),
                before: winner_before,
            },
            loser: VoteSide {
                after: loser_entry.with_ledger(&loser_after),
                before: loser_before,
            },
            k_factor,
        })
    }

    async fn open_season(
        &self,
        season: Season,
        policy: RolloverPolicy,
    ) -> Result<u64, EngineError> {
        // Plain inserts only: existing rows are never locked, so votes on
        // the current season keep flowing while this runs.
        let result = match policy {
            RolloverPolicy::Reset => {
                sqlx::query(
                    "INSERT INTO season_ledger (entry_id, season, rating) \
                     SELECT id, $1, $2 FROM entries \
                     ON CONFLICT (entry_id, season) DO NOTHING",
                )
                .bind(season.number())
                .bind(BASELINE_RATING)
                .execute(&self.pool)
                .await
            }
            RolloverPolicy::CarryForward => {
                sqlx::query(
                    "INSERT INTO season_ledger (entry_id, season, rating) \
                     SELECT e.id, $1, COALESCE(p.rating, $2) FROM entries e \
                     LEFT JOIN season_ledger p ON p.entry_id = e.id AND p.season = $1 - 1 \
                     ON CONFLICT (entry_id, season) DO NOTHING",
                )
                .bind(season.number())
                .bind(BASELINE_RATING)
                .execute(&self.pool)
                .await
            }
        }
        .map_err(store_err)?;

        Ok(result.rows_affected())
    }

    async fn author_aggregates(
        &self,
        season: Season,
        limit: Option<u32>,
    ) -> Result<Vec<AuthorAggregate>, EngineError> {
        let rows = sqlx::query_as::<_, AuthorAggregateRow>(
            "SELECT e.author, \
                    COALESCE(SUM(l.wins)::float8 / NULLIF(SUM(l.losses), 0), SUM(l.wins)::float8) AS ratio, \
                    SUM(l.wins)::bigint, SUM(l.losses)::bigint, COUNT(*)::bigint \
             FROM entries e \
             JOIN season_ledger l ON l.entry_id = e.id AND l.season = $1 \
             GROUP BY e.author \
             ORDER BY ratio DESC, e.author COLLATE \"C\" ASC \
             LIMIT $2",
        )
        .bind(season.number())
        .bind(limit.map(i64::from))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.into_iter()
            .map(|(author, ratio, wins, losses, count)| -> Result<_, EngineError> {
                Ok(AuthorAggregate {
                    author,
                    ratio,
                    total_wins: counter_from_db(wins, "total_wins")?,
                    total_losses: counter_from_db(losses, "total_losses")?,
                    total_entries: counter_from_db(count, "total_entries")?,
                })
            })
            .collect()
    }

    async fn pool_stats(&self, season: Season) -> Result<PoolStats, EngineError> {
        let (entries, authors, votes) = sqlx::query_as::<_, PoolStatsRow>(
            "SELECT COUNT(*)::bigint, COUNT(DISTINCT e.author)::bigint, \
                    ((COALESCE(SUM(l.wins), 0) + COALESCE(SUM(l.losses), 0)) / 2)::bigint \
             FROM season_ledger l \
             JOIN entries e ON e.id = l.entry_id \
             WHERE l.season = $1",
        )
        .bind(season.number())
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(PoolStats {
            season,
            total_entries: counter_from_db(entries, "total_entries")?,
            total_authors: counter_from_db(authors, "total_authors")?,
            total_votes: counter_from_db(votes, "total_votes")?,
        })
    }

    async fn latest_entry_id(&self) -> Result<Option<EntryId>, EngineError> {
        let id = sqlx::query_scalar::<_, String>(
            "SELECT id FROM entries ORDER BY created_at DESC, id COLLATE \"C\" DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(id.map(EntryId::new))
    }

    async fn recent_audits(&self, limit: u32) -> Result<Vec<StoredVoteAudit>, EngineError> {
        let rows = sqlx::query_as::<_, VoteAuditRow>(
            "SELECT id, requester_address, requester_agent, request_path, created_at \
             FROM vote_audit ORDER BY id DESC LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows.into_iter().map(vote_audit_from_row).collect())
    }
}
