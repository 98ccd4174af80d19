//! Pairing handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::PairResponse;
use crate::app_state::AppState;
use crate::error::{EngineError, ErrorResponse};

/// `GET /pair` — Next pair of entries to present.
///
/// # Errors
///
/// Returns [`EngineError::InsufficientEntries`] when the current season has
/// fewer than two entries.
#[utoipa::path(
    get,
    path = "/api/v1/pair",
    tag = "Voting",
    summary = "Select a pair",
    description = "Usually pairs two entries rated within the match tolerance of each other; occasionally explores a uniformly random pair.",
    responses(
        (status = 200, description = "Pair selected", body = PairResponse),
        (status = 422, description = "Fewer than two entries in the season", body = ErrorResponse),
    )
)]
pub async fn select_pair(State(state): State<AppState>) -> Result<impl IntoResponse, EngineError> {
    let matchup = state.rating_service.select_pair().await?;
    Ok(Json(PairResponse::from(matchup)))
}

/// Pairing routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/pair", get(select_pair))
}
