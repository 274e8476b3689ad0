// src/tasks/daily_rollup.rs

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use tracing::{error, info};

use botmetrics_common::traits::ChatbotDirectory;

use crate::services::AggregationService;
use crate::utils::time::local_date;
use crate::Error;

/// Regenerate `date` for every known chatbot. A failure for one chatbot is
/// logged and the rest still run. Returns how many rollups were written.
pub async fn run_daily_rollup(
    engine: &AggregationService,
    directory: &dyn ChatbotDirectory,
    date: NaiveDate,
) -> Result<usize, Error> {
    let chatbots = directory.list_chatbot_ids().await?;
    let mut written = 0;
    for chatbot_id in &chatbots {
        match engine.generate_daily_analytics(*chatbot_id, date).await {
            Ok(_) => written += 1,
            Err(e) => error!("Daily rollup for chatbot {} on {} failed: {:?}", chatbot_id, date, e),
        }
    }
    info!("Daily rollup for {}: {}/{} chatbot(s) done", date, written, chatbots.len());
    Ok(written)
}

/// The most recent fully elapsed day in the engine's timezone.
pub fn yesterday(engine: &AggregationService) -> Option<NaiveDate> {
    local_date(Utc::now(), engine.timezone()).checked_sub_days(Days::new(1))
}

/// Spawns a background task that rolls up yesterday once per `interval`.
pub fn spawn_daily_rollup_task(
    engine: Arc<AggregationService>,
    directory: Arc<dyn ChatbotDirectory>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let Some(date) = yesterday(&engine) else {
                error!("Could not determine yesterday's date; skipping rollup.");
                continue;
            };
            if let Err(e) = run_daily_rollup(&engine, directory.as_ref(), date).await {
                error!("Daily rollup task failed: {:?}", e);
            }
        }
    })
}
