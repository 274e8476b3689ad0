use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub average_response_time: f64,
    pub median_response_time: f64,
    pub p95_response_time: f64,
    pub p99_response_time: f64,
    pub total_requests: u64,
    /// Percentage (0-100) of samples with status >= 400.
    pub error_rate: f64,
    pub total_token_usage: i64,
    pub average_token_usage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatisfactionStats {
    pub average_satisfaction: f64,
    pub total_ratings: u64,
    /// Always carries keys 1 through 5.
    pub satisfaction_distribution: BTreeMap<i32, u64>,
}

impl Default for SatisfactionStats {
    fn default() -> Self {
        Self {
            average_satisfaction: 0.0,
            total_ratings: 0,
            satisfaction_distribution: (1..=5).map(|rating| (rating, 0)).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationLengthStats {
    pub average_length: f64,
    pub median_length: f64,
    pub total_conversations: u64,
}

/// A distinct value and how often it was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyCount {
    pub value: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorStats {
    pub total_errors: u64,
    pub errors_by_status_code: BTreeMap<i32, u64>,
    pub errors_by_endpoint: BTreeMap<String, u64>,
    pub common_errors: Vec<FrequencyCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyTrend {
    /// Start of the hour bucket.
    pub hour: DateTime<Utc>,
    pub average_response_time: f64,
    pub request_count: u64,
}
