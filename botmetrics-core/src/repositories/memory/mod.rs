// src/repositories/memory/mod.rs
//
// DashMap-backed implementations of the repository and collaborator traits.
// Each key is guarded by its shard lock, so upserts through the entry API are
// atomic per key just like `ON CONFLICT` on the Postgres side.

pub mod performance_samples;
pub mod conversation_metrics;
pub mod daily_analytics;
pub mod conversations;

pub use performance_samples::InMemoryPerformanceSampleRepository;
pub use conversation_metrics::InMemoryConversationMetricRepository;
pub use daily_analytics::InMemoryDailyAnalyticsRepository;
pub use conversations::{InMemoryChatbotDirectory, InMemoryConversationSource, MessageRecord};
