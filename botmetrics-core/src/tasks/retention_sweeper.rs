// src/tasks/retention_sweeper.rs

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};

use botmetrics_common::traits::PerformanceSampleRepository;

use crate::utils::time::retention_cutoff;
use crate::Error;

/// Delete performance samples older than `max_age_days`. Returns how many
/// rows were removed. Conversation metrics and daily rollups are never
/// touched. Safe to run repeatedly or concurrently.
pub async fn cleanup_old_metrics(
    samples: &dyn PerformanceSampleRepository,
    max_age_days: u32,
) -> Result<u64, Error> {
    let cutoff = retention_cutoff(Utc::now(), max_age_days);
    let deleted = samples.delete_samples_before(cutoff).await?;
    info!(
        "Retention sweep removed {} sample(s) older than {} day(s) (cutoff {})",
        deleted, max_age_days, cutoff
    );
    Ok(deleted)
}

/// Spawns a background task that sweeps expired samples every `interval`.
/// A failed sweep is logged and retried on the next tick.
pub fn spawn_retention_sweeper(
    samples: Arc<dyn PerformanceSampleRepository>,
    max_age_days: u32,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = cleanup_old_metrics(samples.as_ref(), max_age_days).await {
                error!("Retention sweep failed (retryable={}): {:?}", e.is_retryable(), e);
            }
        }
    })
}
