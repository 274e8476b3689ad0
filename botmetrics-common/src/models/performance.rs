use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const DEFAULT_STATUS_CODE: i32 = 200;

/// One observation of a single inference/request. Never updated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub sample_id: Uuid,
    pub chatbot_id: Uuid,
    pub response_time_seconds: f64,
    pub token_usage: i64,
    pub model_version: Option<String>,
    pub endpoint: Option<String>,
    pub status_code: i32,
    pub error_message: Option<String>,
    pub metadata: HashMap<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl PerformanceSample {
    /// Anything in the 4xx/5xx range counts as an error.
    pub fn is_error(&self) -> bool {
        self.status_code >= 400
    }
}

/// Optional fields accepted when recording a sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleOptions {
    pub token_usage: Option<i64>,
    pub model_version: Option<String>,
    pub endpoint: Option<String>,
    pub status_code: Option<i32>,
    pub error_message: Option<String>,
    pub metadata: Option<HashMap<String, Value>>,
    /// Defaults to the time of recording.
    pub timestamp: Option<DateTime<Utc>>,
}
