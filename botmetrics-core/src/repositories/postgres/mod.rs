// src/repositories/postgres/mod.rs

pub mod performance_samples;
pub mod conversation_metrics;
pub mod daily_analytics;
pub mod conversations;
pub mod chatbots;

pub use performance_samples::PostgresPerformanceSampleRepository;
pub use conversation_metrics::PostgresConversationMetricRepository;
pub use daily_analytics::PostgresDailyAnalyticsRepository;
pub use conversations::PostgresConversationSource;
pub use chatbots::PostgresChatbotDirectory;
