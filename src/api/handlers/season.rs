//! Historical season summaries.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::{Season, SeasonSummary};
use crate::error::{EngineError, ErrorResponse};

/// `GET /seasons/{season}` — Totals and champion of any season.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRequest`] for a season below 1, or a
/// store error. An unopened season yields zero totals and no champion.
#[utoipa::path(
    get,
    path = "/api/v1/seasons/{season}",
    tag = "Seasons",
    summary = "Season summary",
    params(
        ("season" = i32, Path, description = "Season number, starting at 1"),
    ),
    responses(
        (status = 200, description = "Season summary", body = SeasonSummary),
        (status = 400, description = "Invalid season", body = ErrorResponse),
    )
)]
pub async fn season_summary(
    State(state): State<AppState>,
    Path(season): Path<i32>,
) -> Result<impl IntoResponse, EngineError> {
    if season < Season::FIRST.number() {
        return Err(EngineError::InvalidRequest(format!(
            "season must be at least 1, got {season}"
        )));
    }
    let summary = state
        .rating_service
        .season_summary(Season::new(season))
        .await?;
    Ok(Json(summary))
}

/// Season routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/seasons/{season}", get(season_summary))
}
