// src/services/ingestion_service.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use botmetrics_common::models::{
    ConversationMetric, ConversationMetricUpdate, PerformanceSample, SampleOptions,
};
use botmetrics_common::models::performance::DEFAULT_STATUS_CODE;
use botmetrics_common::traits::{ConversationMetricRepository, PerformanceSampleRepository};
use botmetrics_common::validation::{validate_metric_update, validate_sample};

use crate::Error;

/// Write side of the engine, called at the end of each inference call or
/// conversation turn.
pub struct IngestionService {
    samples: Arc<dyn PerformanceSampleRepository>,
    metrics: Arc<dyn ConversationMetricRepository>,
}

impl IngestionService {
    pub fn new(
        samples: Arc<dyn PerformanceSampleRepository>,
        metrics: Arc<dyn ConversationMetricRepository>,
    ) -> Self {
        Self { samples, metrics }
    }

    /// Validate and append a new sample. Existing samples are never touched.
    pub async fn record_sample(
        &self,
        chatbot_id: &str,
        response_time_seconds: f64,
        options: SampleOptions,
    ) -> Result<PerformanceSample, Error> {
        let chatbot_id = validate_sample(chatbot_id, response_time_seconds, &options)
            .inspect_err(|e| warn!("Rejected performance sample: {}", e))?;

        let sample = PerformanceSample {
            sample_id: Uuid::new_v4(),
            chatbot_id,
            response_time_seconds,
            token_usage: options.token_usage.unwrap_or(0),
            model_version: options.model_version,
            endpoint: options.endpoint,
            status_code: options.status_code.unwrap_or(DEFAULT_STATUS_CODE),
            error_message: options.error_message,
            metadata: options.metadata.unwrap_or_default(),
            timestamp: options.timestamp.unwrap_or_else(Utc::now),
        };

        self.samples.insert_sample(&sample).await?;
        debug!(
            "Recorded sample {} for chatbot {} ({}s, status {})",
            sample.sample_id, sample.chatbot_id, sample.response_time_seconds, sample.status_code
        );
        Ok(sample)
    }

    /// Create the conversation's metric row, or merge supplied fields into
    /// the existing one. Delegates atomicity to the repository's single
    /// conditional write.
    pub async fn upsert_conversation_metric(
        &self,
        update: &ConversationMetricUpdate,
    ) -> Result<ConversationMetric, Error> {
        let patch = validate_metric_update(update)
            .inspect_err(|e| warn!("Rejected conversation metric update: {}", e))?;

        let stored = self.metrics.upsert_metric(&patch).await?;
        debug!(
            "Upserted metric for conversation {} (messages={})",
            stored.conversation_id, stored.message_count
        );
        Ok(stored)
    }
}
