use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::performance::PerformanceSample;

/// Closed interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, Error> {
        if start > end {
            return Err(Error::Validation(format!(
                "time range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The `period` leading up to now.
    pub fn last(period: Duration) -> Self {
        let end = Utc::now();
        Self { start: end - period, end }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}

/// Accepts the dashboard presets: `24h`, `7d`, `30d`, `90d`.
impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let period = match s.trim() {
            "24h" => Duration::hours(24),
            "7d" => Duration::days(7),
            "30d" => Duration::days(30),
            "90d" => Duration::days(90),
            other => {
                return Err(Error::Validation(format!("unknown time range '{}'", other)));
            }
        };
        Ok(TimeRange::last(period))
    }
}

/// Optional narrowing applied to performance sample queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleFilter {
    pub time_range: Option<TimeRange>,
    pub min_response_time: Option<f64>,
    pub max_response_time: Option<f64>,
    pub status_code: Option<i32>,
    pub endpoint: Option<String>,
}

impl SampleFilter {
    pub fn in_range(range: TimeRange) -> Self {
        Self {
            time_range: Some(range),
            ..Default::default()
        }
    }

    pub fn matches(&self, sample: &PerformanceSample) -> bool {
        if let Some(range) = &self.time_range {
            if !range.contains(sample.timestamp) {
                return false;
            }
        }
        if let Some(min) = self.min_response_time {
            if sample.response_time_seconds < min {
                return false;
            }
        }
        if let Some(max) = self.max_response_time {
            if sample.response_time_seconds > max {
                return false;
            }
        }
        if let Some(code) = self.status_code {
            if sample.status_code != code {
                return false;
            }
        }
        if let Some(endpoint) = &self.endpoint {
            if sample.endpoint.as_deref() != Some(endpoint.as_str()) {
                return false;
            }
        }
        true
    }
}
