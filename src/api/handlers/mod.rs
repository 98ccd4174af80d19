//! REST endpoint handlers organized by resource.

pub mod entry;
pub mod leaderboard;
pub mod pair;
pub mod season;
pub mod system;
pub mod vote;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(pair::routes())
        .merge(vote::routes())
        .merge(leaderboard::routes())
        .merge(entry::routes())
        .merge(season::routes())
}
