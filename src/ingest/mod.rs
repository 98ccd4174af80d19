//! Periodic entry import.
//!
//! An [`EntrySource`] yields entries newer than a watermark; the
//! [`ImportJob`] polls it on its own task and feeds the batch through
//! [`RatingService::insert_entries`](crate::service::RatingService::insert_entries).
//! The job shares nothing with the vote path except the store.

pub mod job;
pub mod json_file;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::{EntryId, NewEntry};

pub use job::ImportJob;
pub use json_file::JsonFileSource;

/// Somewhere new entries come from.
#[async_trait]
pub trait EntrySource: Send + Sync + Debug {
    /// Returns entries published after `watermark`, oldest first.
    ///
    /// With no watermark, or one the source no longer knows, returns
    /// everything it has; duplicates are skipped downstream.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or decoded.
    async fn fetch_since(&self, watermark: Option<&EntryId>) -> anyhow::Result<Vec<NewEntry>>;
}
