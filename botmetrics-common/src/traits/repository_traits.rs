use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::Error;
use crate::models::{
    ConversationMetric, ConversationMetricPatch, DailyAnalytics, PerformanceSample, SampleFilter,
    TimeRange,
};

/// Append-only store of performance samples.
#[async_trait]
pub trait PerformanceSampleRepository: Send + Sync {
    /// Plain insert. Samples are never updated.
    async fn insert_sample(&self, sample: &PerformanceSample) -> Result<(), Error>;

    async fn get_sample(&self, sample_id: Uuid) -> Result<Option<PerformanceSample>, Error>;

    /// Samples for a chatbot that match `filter`, oldest first.
    async fn list_samples(
        &self,
        chatbot_id: Uuid,
        filter: &SampleFilter,
    ) -> Result<Vec<PerformanceSample>, Error>;

    /// Delete every sample with `timestamp < cutoff`; returns the number removed.
    async fn delete_samples_before(&self, cutoff: DateTime<Utc>) -> Result<u64, Error>;
}

#[async_trait]
pub trait ConversationMetricRepository: Send + Sync {
    /// Single atomic insert-or-merge keyed on `conversation_id`.
    /// Returns the row as stored after the write.
    async fn upsert_metric(&self, patch: &ConversationMetricPatch) -> Result<ConversationMetric, Error>;

    async fn get_metric(&self, conversation_id: Uuid) -> Result<Option<ConversationMetric>, Error>;

    async fn list_for_conversations(
        &self,
        conversation_ids: &[Uuid],
    ) -> Result<Vec<ConversationMetric>, Error>;

    /// Metrics for a chatbot, optionally limited by `created_at`, oldest first.
    async fn list_for_chatbot(
        &self,
        chatbot_id: Uuid,
        range: Option<&TimeRange>,
    ) -> Result<Vec<ConversationMetric>, Error>;
}

#[async_trait]
pub trait DailyAnalyticsRepository: Send + Sync {
    /// Insert-or-overwrite keyed on `(chatbot_id, date)`.
    async fn upsert_daily(&self, row: &DailyAnalytics) -> Result<DailyAnalytics, Error>;

    async fn get_daily(&self, chatbot_id: Uuid, date: NaiveDate) -> Result<Option<DailyAnalytics>, Error>;

    /// Rows with `start <= date <= end`, ascending by date.
    async fn list_daily(
        &self,
        chatbot_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyAnalytics>, Error>;
}
