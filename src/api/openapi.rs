//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use crate::api::dto::{AuthorListResponse, EntryListResponse, PairResponse, VoteRequest};
use crate::api::handlers::{entry, leaderboard, pair, season, system, vote};
use crate::domain::{
    AuthorAggregate, EntryId, LedgerRow, MatchKind, PoolStats, RatedEntry, Season, SeasonSummary,
    VoteOutcome, VoteSide,
};
use crate::error::{ErrorBody, ErrorResponse};
use crate::service::StatsSnapshot;

/// Generated OpenAPI description of every endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "season-elo",
        description = "Season-scoped pairwise Elo rating engine."
    ),
    paths(
        pair::select_pair,
        vote::record_vote,
        leaderboard::leaderboard,
        leaderboard::authors,
        leaderboard::stats,
        entry::list_entries,
        entry::get_entry,
        season::season_summary,
        system::health_handler,
    ),
    components(schemas(
        AuthorAggregate,
        AuthorListResponse,
        EntryId,
        EntryListResponse,
        ErrorBody,
        ErrorResponse,
        LedgerRow,
        MatchKind,
        PairResponse,
        PoolStats,
        RatedEntry,
        Season,
        SeasonSummary,
        StatsSnapshot,
        system::HealthResponse,
        VoteOutcome,
        VoteRequest,
        VoteSide,
    )),
    tags(
        (name = "Voting", description = "Pairing and vote recording"),
        (name = "Rankings", description = "Leaderboard, authors, and stats"),
        (name = "Entries", description = "Entry lookup"),
        (name = "Seasons", description = "Historical season summaries"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/pair",
            "/api/v1/votes",
            "/api/v1/leaderboard",
            "/api/v1/authors",
            "/api/v1/stats",
            "/api/v1/entries",
            "/api/v1/entries/{id}",
            "/api/v1/seasons/{season}",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
