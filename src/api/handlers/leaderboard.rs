//! Read-side handlers: leaderboard, authors, stats.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{AuthorListResponse, EntryListResponse, LimitParams};
use crate::app_state::AppState;
use crate::error::{EngineError, ErrorResponse};
use crate::service::StatsSnapshot;

/// `GET /leaderboard` — Current-season ranking.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRequest`] for `limit=0`, or a store error.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    tag = "Rankings",
    summary = "Leaderboard",
    description = "Entries of the current season by rating descending, ties broken by id.",
    params(LimitParams),
    responses(
        (status = 200, description = "Ranked entries", body = EntryListResponse),
        (status = 400, description = "Invalid limit", body = ErrorResponse),
    )
)]
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, EngineError> {
    let limit = params.resolved()?;
    let service = &state.rating_service;
    let entries = service.leaderboard(limit).await?;
    Ok(Json(EntryListResponse {
        season: service.season(),
        entries,
    }))
}

/// `GET /authors` — Current-season author aggregates.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRequest`] for `limit=0`, or a store error.
#[utoipa::path(
    get,
    path = "/api/v1/authors",
    tag = "Rankings",
    summary = "Author aggregates",
    description = "Per-author win and loss totals with win ratio. An author without losses ranks by total wins.",
    params(LimitParams),
    responses(
        (status = 200, description = "Ranked authors", body = AuthorListResponse),
        (status = 400, description = "Invalid limit", body = ErrorResponse),
    )
)]
pub async fn authors(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, EngineError> {
    let limit = params.resolved()?;
    let service = &state.rating_service;
    let authors = service.authors(limit).await?;
    Ok(Json(AuthorListResponse {
        season: service.season(),
        authors,
    }))
}

/// `GET /stats` — Pool totals plus top entries and authors.
///
/// # Errors
///
/// Returns a store error.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "Rankings",
    summary = "Season stats",
    description = "Totals for the current season, the top 10 entries and authors, and the previous season's winner.",
    responses(
        (status = 200, description = "Stats snapshot", body = StatsSnapshot),
    )
)]
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, EngineError> {
    let snapshot = state.rating_service.stats().await?;
    Ok(Json(snapshot))
}

/// Ranking routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leaderboard", get(leaderboard))
        .route("/authors", get(authors))
        .route("/stats", get(stats))
}
