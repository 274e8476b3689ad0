// src/config.rs

use std::time::Duration;

use chrono_tz::Tz;

/// Runtime settings for the metrics engine. The server binary fills this
/// from flags/env; tests use `Default`.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Samples older than this many days are removed by the sweeper.
    pub retention_days: u32,
    pub sweep_interval: Duration,
    pub rollup_interval: Duration,
    /// Timezone that defines calendar days and hour buckets.
    pub reference_timezone: Tz,
    /// Upper bound for any single store call.
    pub store_timeout: Duration,
    pub max_connections: u32,
    /// Cap on popular queries, top intents and top topics.
    pub top_items: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            retention_days: 30,
            sweep_interval: Duration::from_secs(24 * 3600),
            rollup_interval: Duration::from_secs(24 * 3600),
            reference_timezone: Tz::UTC,
            store_timeout: Duration::from_secs(5),
            max_connections: 5,
            top_items: 10,
        }
    }
}
