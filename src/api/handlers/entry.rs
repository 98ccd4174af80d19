//! Entry lookup handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::EntryListResponse;
use crate::app_state::AppState;
use crate::domain::{EntryId, RatedEntry};
use crate::error::{EngineError, ErrorResponse};

/// `GET /entries` — Every entry of the current season.
///
/// # Errors
///
/// Returns a store error.
#[utoipa::path(
    get,
    path = "/api/v1/entries",
    tag = "Entries",
    summary = "List entries",
    responses(
        (status = 200, description = "All rated entries, leaderboard order", body = EntryListResponse),
    )
)]
pub async fn list_entries(State(state): State<AppState>) -> Result<impl IntoResponse, EngineError> {
    let service = &state.rating_service;
    let entries = service.leaderboard(None).await?;
    Ok(Json(EntryListResponse {
        season: service.season(),
        entries,
    }))
}

/// `GET /entries/{id}` — One entry with its current-season ledger.
///
/// # Errors
///
/// Returns [`EngineError::EntryNotFound`] if the entry has no row in the
/// current season.
#[utoipa::path(
    get,
    path = "/api/v1/entries/{id}",
    tag = "Entries",
    summary = "Get entry",
    params(
        ("id" = String, Path, description = "Entry id"),
    ),
    responses(
        (status = 200, description = "Rated entry", body = RatedEntry),
        (status = 404, description = "Entry not in the current season", body = ErrorResponse),
    )
)]
pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, EngineError> {
    let entry = state.rating_service.entry(&EntryId::new(id)).await?;
    Ok(Json(entry))
}

/// Entry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/entries", get(list_entries))
        .route("/entries/{id}", get(get_entry))
}
