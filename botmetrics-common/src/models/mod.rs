// File: botmetrics-common/src/models/mod.rs
pub mod performance;
pub mod conversation_metric;
pub mod daily_analytics;
pub mod conversation;
pub mod query;
pub mod stats;
pub mod reporting;

pub use performance::{PerformanceSample, SampleOptions};
pub use conversation_metric::{
    ConversationMetric, ConversationMetricPatch, ConversationMetricUpdate, SentimentPoint,
};
pub use daily_analytics::{DailyAnalytics, PopularQuery, ResponseCategory};
pub use conversation::{CategoryCount, ConversationRecord, MessageClassification};
pub use query::{SampleFilter, TimeRange};
pub use stats::{
    ConversationLengthStats, ErrorStats, FrequencyCount, HourlyTrend, PerformanceStats,
    SatisfactionStats,
};
pub use reporting::{ConversationInsights, DashboardMetrics, ExportFormat};
