use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::query::TimeRange;
use crate::models::stats::{FrequencyCount, PerformanceStats, SatisfactionStats};

/// Dashboard summary: daily rollups summed over a range, plus live
/// performance numbers for the same range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub time_range: TimeRange,
    pub days_covered: u64,
    pub total_conversations: i64,
    pub total_messages: i64,
    pub unique_users: i64,
    pub avg_conversation_length: f64,
    pub avg_response_time: f64,
    pub user_satisfaction_score: f64,
    pub total_ratings: i64,
    pub performance_metrics: PerformanceStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationInsights {
    pub total_conversations: u64,
    pub average_length: f64,
    pub median_length: f64,
    pub satisfaction_stats: SatisfactionStats,
    pub top_intents: Vec<FrequencyCount>,
    pub top_topics: Vec<FrequencyCount>,
    /// achieved / total conversations, 0 when there are none.
    pub goal_achievement_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(Error::Validation(format!("unsupported export format '{}'", other))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
        }
    }
}
