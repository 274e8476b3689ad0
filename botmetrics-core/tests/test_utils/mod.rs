// File: botmetrics-core/tests/test_utils/mod.rs
//
// Shared fixtures. Each test file pulls this in with `mod test_utils;` and
// uses only part of it.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use botmetrics_common::models::{ConversationRecord, DailyAnalytics, SampleOptions};
use botmetrics_core::repositories::memory::{
    InMemoryChatbotDirectory, InMemoryConversationMetricRepository, InMemoryConversationSource,
    InMemoryDailyAnalyticsRepository, InMemoryPerformanceSampleRepository, MessageRecord,
};
use botmetrics_core::services::{
    AggregationService, IngestionService, ReportingService, StatisticsService,
};
use botmetrics_core::{Database, Error, MetricsConfig};

/// Every service wired to in-memory stores.
pub struct Harness {
    pub config: MetricsConfig,
    pub samples: Arc<InMemoryPerformanceSampleRepository>,
    pub metrics: Arc<InMemoryConversationMetricRepository>,
    pub daily: Arc<InMemoryDailyAnalyticsRepository>,
    pub source: Arc<InMemoryConversationSource>,
    pub chatbots: Arc<InMemoryChatbotDirectory>,
    pub ingestion: Arc<IngestionService>,
    pub aggregation: Arc<AggregationService>,
    pub statistics: Arc<StatisticsService>,
    pub reporting: ReportingService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(MetricsConfig::default())
    }

    pub fn with_config(config: MetricsConfig) -> Self {
        let samples = Arc::new(InMemoryPerformanceSampleRepository::new());
        let metrics = Arc::new(InMemoryConversationMetricRepository::new());
        let daily = Arc::new(InMemoryDailyAnalyticsRepository::new());
        let source = Arc::new(InMemoryConversationSource::new());
        let chatbots = Arc::new(InMemoryChatbotDirectory::new());

        let ingestion = Arc::new(IngestionService::new(samples.clone(), metrics.clone()));
        let aggregation = Arc::new(AggregationService::new(
            source.clone(),
            metrics.clone(),
            daily.clone(),
            &config,
        ));
        let statistics = Arc::new(StatisticsService::new(
            samples.clone(),
            metrics.clone(),
            config.reference_timezone,
        ));
        let reporting = ReportingService::new(daily.clone(), metrics.clone(), statistics.clone(), &config);

        Self {
            config,
            samples,
            metrics,
            daily,
            source,
            chatbots,
            ingestion,
            aggregation,
            statistics,
            reporting,
        }
    }

    /// Register a conversation and give it `user_messages` user turns, each
    /// followed by a bot reply tagged with `category`.
    pub fn add_conversation(
        &self,
        chatbot_id: Uuid,
        session_id: &str,
        started_at: DateTime<Utc>,
        user_messages: &[&str],
        category: Option<&str>,
    ) -> Uuid {
        let conversation_id = Uuid::new_v4();
        self.source.add_conversation(ConversationRecord {
            conversation_id,
            chatbot_id,
            session_id: session_id.to_string(),
            started_at,
        });
        for text in user_messages {
            self.source.add_message(conversation_id, MessageRecord::user(*text, started_at));
            self.source
                .add_message(conversation_id, MessageRecord::bot("ok", category, started_at));
        }
        conversation_id
    }

    pub async fn record(
        &self,
        chatbot_id: Uuid,
        response_time: f64,
        options: SampleOptions,
    ) -> Result<(), Error> {
        self.ingestion
            .record_sample(&chatbot_id.to_string(), response_time, options)
            .await?;
        Ok(())
    }
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .expect("valid test timestamp")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn at(timestamp: DateTime<Utc>) -> SampleOptions {
    SampleOptions { timestamp: Some(timestamp), ..Default::default() }
}

pub fn failed_at(timestamp: DateTime<Utc>, status: i32, endpoint: &str, message: &str) -> SampleOptions {
    SampleOptions {
        timestamp: Some(timestamp),
        status_code: Some(status),
        endpoint: Some(endpoint.to_string()),
        error_message: Some(message.to_string()),
        ..Default::default()
    }
}

/// Hand-built rollup for reporting tests.
pub fn daily_row(
    chatbot_id: Uuid,
    day: NaiveDate,
    conversations: i64,
    messages: i64,
    avg_response_time: f64,
    satisfaction: f64,
    ratings: i64,
) -> DailyAnalytics {
    DailyAnalytics {
        total_conversations: conversations,
        total_messages: messages,
        unique_users: conversations,
        avg_conversation_length: if conversations > 0 {
            messages as f64 / conversations as f64
        } else {
            0.0
        },
        avg_response_time,
        user_satisfaction_score: satisfaction,
        total_ratings: ratings,
        ..DailyAnalytics::empty(chatbot_id, day, Utc::now())
    }
}

/// Create a connection pool to the test DB.
/// Looks for `TEST_DATABASE_URL` in env, else a local default.
pub async fn create_test_db_pool() -> Result<Pool<Postgres>, Error> {
    let url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgres://botmetrics@localhost/botmetrics_test".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    Ok(pool)
}

/// Wipes out test data so each test can start fresh.
pub async fn clean_database(pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query(
        r#"
        TRUNCATE TABLE
            performance_samples,
            conversation_metrics,
            daily_analytics,
            messages,
            conversations,
            chatbots
        RESTART IDENTITY CASCADE;
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// A migrated, empty database.
pub async fn setup_test_database() -> Result<Database, Error> {
    let pool = create_test_db_pool().await?;
    let db = Database::from_pool(pool);
    db.migrate().await?;
    clean_database(db.pool()).await?;
    Ok(db)
}
