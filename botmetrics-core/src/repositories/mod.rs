// src/repositories/mod.rs

pub use botmetrics_common::traits::{
    ChatbotDirectory, ConversationMetricRepository, ConversationSource,
    DailyAnalyticsRepository, PerformanceSampleRepository,
};

pub mod memory;
pub mod postgres;

pub use postgres::{
    PostgresChatbotDirectory, PostgresConversationMetricRepository, PostgresConversationSource,
    PostgresDailyAnalyticsRepository, PostgresPerformanceSampleRepository,
};
