//! Interval-driven import job.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::EntrySource;
use crate::domain::InsertReport;
use crate::service::RatingService;

/// Polls an [`EntrySource`] and stores what it returns.
#[derive(Debug, Clone)]
pub struct ImportJob {
    service: Arc<RatingService>,
    source: Arc<dyn EntrySource>,
    every: Duration,
}

impl ImportJob {
    /// Creates a job that runs every `every`.
    #[must_use]
    pub fn new(service: Arc<RatingService>, source: Arc<dyn EntrySource>, every: Duration) -> Self {
        Self {
            service,
            source,
            every,
        }
    }

    /// Runs one import: read the watermark, fetch, insert.
    ///
    /// # Errors
    ///
    /// Returns an error if the watermark, the source, or the insert fails.
    pub async fn run_once(&self) -> anyhow::Result<InsertReport> {
        let watermark = self.service.store().latest_entry_id().await?;
        let batch = self.source.fetch_since(watermark.as_ref()).await?;
        if batch.is_empty() {
            tracing::debug!(watermark = ?watermark, "no new entries");
            return Ok(InsertReport::default());
        }
        Ok(self.service.insert_entries(&batch).await?)
    }

    /// Spawns the job on its own task. The first run happens immediately.
    ///
    /// Failures are logged and the next tick retries; the task only ends
    /// when aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    tracing::error!(error = ?e, "entry import failed");
                }
            }
        })
    }
}
