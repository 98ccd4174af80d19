//! Rating service: pairs entries, records votes, serves aggregates.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::config::EngineSettings;
use crate::domain::{
    AuthorAggregate, EntryId, InsertReport, Matchup, NewEntry, PoolStats, RandomSource,
    RatedEntry, RngSource, RolloverPolicy, Season, SeasonSummary, VoteAudit, VoteOutcome,
};
use crate::error::EngineError;
use crate::persistence::LedgerStore;

/// How many entries and authors the stats view lists.
pub const STATS_TOP_N: u32 = 10;

/// Composite view behind the stats endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StatsSnapshot {
    /// Pool-wide totals for the current season.
    pub stats: PoolStats,
    /// Top entries of the current season.
    pub top_entries: Vec<RatedEntry>,
    /// Top authors of the current season.
    pub top_authors: Vec<AuthorAggregate>,
    /// Highest-rated entry of the previous season, if there was one.
    pub last_season_winner: Option<RatedEntry>,
}

/// Coordination layer for all engine operations.
///
/// Holds no ratings between calls: every operation reads the store, so a
/// vote always starts from the authoritative rows. Request-time operations
/// are scoped to `settings.season`; historical ones take a season.
#[derive(Debug, Clone)]
pub struct RatingService {
    store: Arc<dyn LedgerStore>,
    settings: EngineSettings,
}

impl RatingService {
    /// Creates a new `RatingService`.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, settings: EngineSettings) -> Self {
        Self { store, settings }
    }

    /// Returns the season request-time operations are scoped to.
    #[must_use]
    pub const fn season(&self) -> Season {
        self.settings.season
    }

    /// Returns the engine settings.
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns a reference to the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// Returns a service over the same store scoped to another season.
    #[must_use]
    pub fn with_season(&self, season: Season) -> Self {
        Self {
            store: Arc::clone(&self.store),
            settings: EngineSettings {
                season,
                ..self.settings
            },
        }
    }

    /// Picks the next pair to present.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InsufficientEntries`] when the season has
    /// fewer than two entries, or a store error.
    pub async fn select_pair(&self) -> Result<Matchup, EngineError> {
        let pool = self.store.season_entries(self.settings.season, None).await?;
        let mut rng = RngSource::thread();
        self.settings.matchmaker.select_pair(&pool, &mut rng)
    }

    /// Picks the next pair using the given random source.
    ///
    /// # Errors
    ///
    /// Same as [`RatingService::select_pair`].
    pub async fn select_pair_with<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Matchup, EngineError> {
        let pool = self.store.season_entries(self.settings.season, None).await?;
        self.settings.matchmaker.select_pair(&pool, rng)
    }

    /// Records a decided vote and returns both sides before and after.
    ///
    /// The store re-reads both ledger rows under lock; ratings passed in by
    /// callers are never trusted.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] if winner and loser are the
    /// same entry, [`EngineError::EntryNotFound`] if either has no row in
    /// the current season, or a store error. On error neither row changes.
    pub async fn record_vote(
        &self,
        winner: &EntryId,
        loser: &EntryId,
        audit: VoteAudit,
    ) -> Result<VoteOutcome, EngineError> {
        if winner == loser {
            return Err(EngineError::InvalidRequest(format!(
                "entry {winner} cannot be voted against itself"
            )));
        }

        let outcome = self
            .store
            .record_vote(
                self.settings.season,
                winner,
                loser,
                &self.settings.elo,
                &audit,
            )
            .await?;

        tracing::info!(
            season = %self.settings.season,
            %winner,
            %loser,
            k = outcome.k_factor,
            winner_rating = outcome.winner.after.rating,
            loser_rating = outcome.loser.after.rating,
            "vote recorded"
        );
        Ok(outcome)
    }

    /// Reads one entry of the current season.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EntryNotFound`] if the entry has no row in the
    /// current season, or a store error.
    pub async fn entry(&self, id: &EntryId) -> Result<RatedEntry, EngineError> {
        self.store
            .entry(self.settings.season, id)
            .await?
            .ok_or_else(|| EngineError::EntryNotFound {
                entry_id: id.clone(),
                season: self.settings.season,
            })
    }

    /// Current-season leaderboard.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn leaderboard(&self, limit: Option<u32>) -> Result<Vec<RatedEntry>, EngineError> {
        self.store.season_entries(self.settings.season, limit).await
    }

    /// Current-season author aggregates.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn authors(&self, limit: Option<u32>) -> Result<Vec<AuthorAggregate>, EngineError> {
        self.store
            .author_aggregates(self.settings.season, limit)
            .await
    }

    /// Current-season pool totals.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn pool_stats(&self) -> Result<PoolStats, EngineError> {
        self.store.pool_stats(self.settings.season).await
    }

    /// Highest-rated entry of the season before the current one.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn last_season_winner(&self) -> Result<Option<RatedEntry>, EngineError> {
        let Some(previous) = self.settings.season.previous() else {
            return Ok(None);
        };
        self.champion(previous).await
    }

    /// Everything the stats view shows, read concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered.
    pub async fn stats(&self) -> Result<StatsSnapshot, EngineError> {
        let (stats, top_entries, top_authors, last_season_winner) = tokio::try_join!(
            self.pool_stats(),
            self.leaderboard(Some(STATS_TOP_N)),
            self.authors(Some(STATS_TOP_N)),
            self.last_season_winner(),
        )?;

        Ok(StatsSnapshot {
            stats,
            top_entries,
            top_authors,
            last_season_winner,
        })
    }

    /// Totals and champion of any season, current or historical.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn season_summary(&self, season: Season) -> Result<SeasonSummary, EngineError> {
        let (stats, champion) =
            tokio::try_join!(self.store.pool_stats(season), self.champion(season))?;
        Ok(SeasonSummary { stats, champion })
    }

    async fn champion(&self, season: Season) -> Result<Option<RatedEntry>, EngineError> {
        Ok(self
            .store
            .season_entries(season, Some(1))
            .await?
            .into_iter()
            .next())
    }

    /// Stores a batch of new entries in the current season.
    ///
    /// Existing ids are skipped and reported; the batch carries on.
    ///
    /// # Errors
    ///
    /// Returns a store error; nothing from the batch is kept in that case.
    pub async fn insert_entries(&self, entries: &[NewEntry]) -> Result<InsertReport, EngineError> {
        let report = self
            .store
            .insert_entries(self.settings.season, entries)
            .await?;
        tracing::info!(
            season = %self.settings.season,
            inserted = report.inserted.len(),
            skipped = report.skipped.len(),
            "entries ingested"
        );
        Ok(report)
    }

    /// Stores one new entry and returns it with its fresh ledger row.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EntryConflict`] if the id already exists, or a
    /// store error.
    pub async fn insert_entry(&self, entry: NewEntry) -> Result<RatedEntry, EngineError> {
        let report = self
            .store
            .insert_entries(self.settings.season, std::slice::from_ref(&entry))
            .await?;
        if !report.skipped.is_empty() {
            return Err(EngineError::EntryConflict(entry.id));
        }
        self.entry(&entry.id).await
    }

    /// Opens `season` for every known entry. Safe to re-run.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn open_season(
        &self,
        season: Season,
        policy: RolloverPolicy,
    ) -> Result<u64, EngineError> {
        let created = self.store.open_season(season, policy).await?;
        tracing::info!(%season, %policy, created, "season opened");
        Ok(created)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::MatchKind;
    use crate::persistence::MemoryStore;

    fn entries(ids: &[(&str, &str)]) -> Vec<NewEntry> {
        ids.iter()
            .map(|(id, author)| NewEntry {
                id: EntryId::new(*id),
                author: (*author).to_string(),
                content: format!("meal {id}"),
            })
            .collect()
    }

    fn audit() -> VoteAudit {
        VoteAudit {
            requester_address: None,
            requester_agent: None,
            request_path: "/api/v1/votes".to_string(),
        }
    }

    async fn make_service(ids: &[(&str, &str)]) -> RatingService {
        let store: Arc<dyn LedgerStore> = Arc::new(MemoryStore::new());
        let service = RatingService::new(store, EngineSettings::for_season(Season::FIRST));
        let Ok(_) = service.insert_entries(&entries(ids)).await else {
            panic!("seed failed");
        };
        service
    }

    /// Always explores, always picks the first two indices.
    struct AlwaysExplore;

    impl RandomSource for AlwaysExplore {
        fn chance(&mut self) -> f64 {
            0.0
        }

        fn index(&mut self, _len: usize) -> usize {
            0
        }
    }

    #[test]
    fn with_season_shares_the_store() {
        tokio_test::block_on(async {
            let service = make_service(&[("1", "clive"), ("2", "tony")]).await;
            let next = service.with_season(Season::new(2));
            assert_eq!(next.season(), Season::new(2));
            assert_eq!(next.settings().matchmaker, service.settings().matchmaker);

            let Ok(created) = next.open_season(Season::new(2), RolloverPolicy::Reset).await else {
                panic!("rollover failed");
            };
            assert_eq!(created, 2);
            let Ok(board) = next.leaderboard(None).await else {
                panic!("leaderboard failed");
            };
            assert_eq!(board.len(), 2);
        });
    }

    #[tokio::test]
    async fn first_vote_scenario() {
        let service = make_service(&[("1", "clive"), ("2", "tony")]).await;
        let Ok(outcome) = service
            .record_vote(&EntryId::new("1"), &EntryId::new("2"), audit())
            .await
        else {
            panic!("vote failed");
        };
        assert_eq!(outcome.k_factor, 32);
        assert_eq!(outcome.winner.after.rating, 1516);
        assert_eq!(outcome.loser.after.rating, 1484);
        assert_eq!(outcome.winner_delta(), 16);
        assert_eq!(outcome.loser_delta(), -16);
    }

    #[tokio::test]
    async fn self_vote_is_rejected() {
        let service = make_service(&[("1", "clive"), ("2", "tony")]).await;
        let result = service
            .record_vote(&EntryId::new("1"), &EntryId::new("1"), audit())
            .await;
        assert!(matches!(result, Err(EngineError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn vote_reads_fresh_rows_each_time() {
        let service = make_service(&[("1", "clive"), ("2", "tony")]).await;
        for _ in 0..5 {
            let _ = service
                .record_vote(&EntryId::new("1"), &EntryId::new("2"), audit())
                .await;
        }
        // Sixth vote: winner has 5 games, so K drops to 16.
        let Ok(outcome) = service
            .record_vote(&EntryId::new("1"), &EntryId::new("2"), audit())
            .await
        else {
            panic!("vote failed");
        };
        assert_eq!(outcome.k_factor, 16);
        assert_eq!(outcome.winner.before.wins, 5);
        assert_eq!(outcome.winner.after.wins, 6);
    }

    #[tokio::test]
    async fn vote_outside_current_season_is_not_found() {
        let service = make_service(&[("1", "clive"), ("2", "tony")]).await;
        let next = service.with_season(Season::new(2));
        let result = next
            .record_vote(&EntryId::new("1"), &EntryId::new("2"), audit())
            .await;
        assert!(matches!(result, Err(EngineError::EntryNotFound { .. })));
    }

    #[tokio::test]
    async fn scripted_pairing_takes_explore_branch() {
        let service = make_service(&[("1", "clive"), ("2", "tony"), ("3", "nigel")]).await;
        let Ok(matchup) = service.select_pair_with(&mut AlwaysExplore).await else {
            panic!("pairing failed");
        };
        assert_eq!(matchup.kind, MatchKind::Explore);
        assert_ne!(matchup.first.id, matchup.second.id);
    }

    #[tokio::test]
    async fn pairing_a_lonely_season_fails_loudly() {
        let service = make_service(&[("1", "clive")]).await;
        let result = service.select_pair().await;
        assert!(matches!(result, Err(EngineError::InsufficientEntries(1))));
    }

    #[tokio::test]
    async fn author_ratio_without_losses_is_win_count() {
        let service =
            make_service(&[("1", "clive"), ("2", "tony"), ("3", "tony"), ("4", "tony")]).await;
        for loser in ["2", "3", "4", "2", "3"] {
            let _ = service
                .record_vote(&EntryId::new("1"), &EntryId::new(loser), audit())
                .await;
        }
        let Ok(authors) = service.authors(None).await else {
            panic!("authors failed");
        };
        let Some(clive) = authors.iter().find(|a| a.author == "clive") else {
            panic!("clive missing");
        };
        assert!((clive.ratio - 5.0).abs() < f64::EPSILON);
        assert_eq!(authors.first().map(|a| a.author.as_str()), Some("clive"));
    }

    #[tokio::test]
    async fn stats_include_last_season_winner() {
        let service = make_service(&[("1", "clive"), ("2", "tony")]).await;
        let _ = service
            .record_vote(&EntryId::new("2"), &EntryId::new("1"), audit())
            .await;
        let _ = service.open_season(Season::new(2), RolloverPolicy::Reset).await;

        let next = service.with_season(Season::new(2));
        let Ok(snapshot) = next.stats().await else {
            panic!("stats failed");
        };
        assert_eq!(snapshot.stats.total_entries, 2);
        assert_eq!(snapshot.stats.total_votes, 0);
        assert_eq!(
            snapshot.last_season_winner.map(|e| e.id),
            Some(EntryId::new("2"))
        );

        let Ok(first) = service.stats().await else {
            panic!("stats failed");
        };
        assert_eq!(first.stats.total_votes, 1);
        assert!(first.last_season_winner.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_votes_lose_no_update() {
        let service = make_service(&[("a", "clive"), ("b", "tony"), ("c", "nigel")]).await;
        let pairs = [("a", "b"), ("b", "a"), ("a", "c"), ("c", "b")];

        let mut handles = Vec::new();
        for (winner, loser) in pairs.iter().cycle().take(50).copied() {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .record_vote(&EntryId::new(winner), &EntryId::new(loser), audit())
                    .await
            }));
        }
        for handle in handles {
            let Ok(Ok(_)) = handle.await else {
                panic!("concurrent vote failed");
            };
        }

        let Ok(board) = service.leaderboard(None).await else {
            panic!("leaderboard failed");
        };
        let wins: u32 = board.iter().map(|e| e.wins).sum();
        let losses: u32 = board.iter().map(|e| e.losses).sum();
        assert_eq!(wins, 50);
        assert_eq!(losses, 50);
        // Every update is zero-sum, so no lost write can hide here.
        let total: i32 = board.iter().map(|e| e.rating).sum();
        assert_eq!(total, 3 * 1500);
    }

    #[tokio::test]
    async fn single_insert_surfaces_conflict() {
        let service = make_service(&[("1", "clive")]).await;
        let fresh = NewEntry {
            id: EntryId::new("2"),
            author: "tony".to_string(),
            content: "stew".to_string(),
        };
        let Ok(stored) = service.insert_entry(fresh).await else {
            panic!("insert failed");
        };
        assert_eq!(stored.rating, 1500);

        let duplicate = NewEntry {
            id: EntryId::new("1"),
            author: "someone else".to_string(),
            content: "overwrite attempt".to_string(),
        };
        let result = service.insert_entry(duplicate).await;
        assert!(matches!(result, Err(EngineError::EntryConflict(_))));
        let Ok(original) = service.entry(&EntryId::new("1")).await else {
            panic!("entry lost");
        };
        assert_eq!(original.author, "clive");
    }

    #[tokio::test]
    async fn historical_summary_reads_requested_season() {
        let service = make_service(&[("1", "clive"), ("2", "tony")]).await;
        let _ = service
            .record_vote(&EntryId::new("1"), &EntryId::new("2"), audit())
            .await;
        let Ok(summary) = service.season_summary(Season::FIRST).await else {
            panic!("summary failed");
        };
        assert_eq!(summary.stats.total_votes, 1);
        assert_eq!(summary.champion.map(|e| e.id), Some(EntryId::new("1")));

        let Ok(empty) = service.season_summary(Season::new(9)).await else {
            panic!("summary failed");
        };
        assert_eq!(empty.stats.total_entries, 0);
        assert!(empty.champion.is_none());
    }
}
