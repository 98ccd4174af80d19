//! Service layer: business logic orchestration.
//!
//! [`RatingService`] threads the current season and engine knobs into
//! every store call and composes the read-side views.

pub mod rating_service;

pub use rating_service::{RatingService, STATS_TOP_N, StatsSnapshot};
