//! Vote handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::VoteRequest;
use crate::api::request_meta::RequestMeta;
use crate::app_state::AppState;
use crate::domain::VoteOutcome;
use crate::error::{EngineError, ErrorResponse};

/// `POST /votes` — Record the outcome of one comparison.
///
/// # Errors
///
/// Returns [`EngineError`] if either entry is unknown in the current
/// season, if both ids are the same, or if the store fails.
#[utoipa::path(
    post,
    path = "/api/v1/votes",
    tag = "Voting",
    summary = "Record a vote",
    description = "Applies one Elo update to the winner and loser of the current season and logs the request for audit. Ratings are always re-read server-side.",
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote recorded", body = VoteOutcome),
        (status = 400, description = "Malformed vote", body = ErrorResponse),
        (status = 404, description = "Entry not in the current season", body = ErrorResponse),
    )
)]
pub async fn record_vote(
    State(state): State<AppState>,
    meta: RequestMeta,
    Json(req): Json<VoteRequest>,
) -> Result<impl IntoResponse, EngineError> {
    let outcome = state
        .rating_service
        .record_vote(&req.winner_id, &req.loser_id, meta.into_audit())
        .await?;
    Ok(Json(outcome))
}

/// Vote routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/votes", post(record_vote))
}
