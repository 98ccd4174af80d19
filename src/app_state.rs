//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::RatingService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Rating service for all engine operations.
    pub rating_service: Arc<RatingService>,
}
