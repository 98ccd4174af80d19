//! Data Transfer Objects for REST request/response serialization.
//!
//! Engine views that already have a stable wire shape (`RatedEntry`,
//! `VoteOutcome`, `StatsSnapshot`, `SeasonSummary`) are returned as-is.

pub mod common_dto;
pub mod entry_dto;
pub mod vote_dto;

pub use common_dto::*;
pub use entry_dto::*;
pub use vote_dto::*;
