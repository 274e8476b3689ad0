// src/services/statistics_service.rs
//
// Read-only queries over samples and conversation metrics. Empty inputs
// produce zero-filled results, never errors.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use botmetrics_common::models::{
    ConversationLengthStats, ConversationMetric, ErrorStats, HourlyTrend, PerformanceSample,
    PerformanceStats, SampleFilter, SatisfactionStats, TimeRange,
};
use botmetrics_common::traits::{ConversationMetricRepository, PerformanceSampleRepository};

use crate::utils::stats::{mean, median, percentile, rank_by_frequency, ratio, sorted};
use crate::utils::time::hour_bucket;
use crate::Error;

pub struct StatisticsService {
    samples: Arc<dyn PerformanceSampleRepository>,
    metrics: Arc<dyn ConversationMetricRepository>,
    timezone: Tz,
}

impl StatisticsService {
    pub fn new(
        samples: Arc<dyn PerformanceSampleRepository>,
        metrics: Arc<dyn ConversationMetricRepository>,
        timezone: Tz,
    ) -> Self {
        Self { samples, metrics, timezone }
    }

    pub async fn get_performance_stats(
        &self,
        chatbot_id: Uuid,
        filter: Option<&SampleFilter>,
    ) -> Result<PerformanceStats, Error> {
        let default_filter = SampleFilter::default();
        let samples = self
            .samples
            .list_samples(chatbot_id, filter.unwrap_or(&default_filter))
            .await?;
        Ok(performance_stats(&samples))
    }

    pub async fn get_satisfaction_stats(&self, chatbot_id: Uuid) -> Result<SatisfactionStats, Error> {
        let metrics = self.metrics.list_for_chatbot(chatbot_id, None).await?;
        Ok(satisfaction_stats(&metrics))
    }

    pub async fn get_conversation_length_stats(
        &self,
        chatbot_id: Uuid,
    ) -> Result<ConversationLengthStats, Error> {
        let metrics = self.metrics.list_for_chatbot(chatbot_id, None).await?;
        Ok(length_stats(&metrics))
    }

    pub async fn get_error_stats(&self, chatbot_id: Uuid) -> Result<ErrorStats, Error> {
        let samples = self
            .samples
            .list_samples(chatbot_id, &SampleFilter::default())
            .await?;
        Ok(error_stats(&samples))
    }

    /// One entry per hour in `[start, end]` that saw at least one sample.
    pub async fn get_hourly_trends(
        &self,
        chatbot_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HourlyTrend>, Error> {
        let filter = SampleFilter::in_range(TimeRange::new(start, end)?);
        let samples = self.samples.list_samples(chatbot_id, &filter).await?;
        Ok(hourly_trends(&samples, self.timezone))
    }
}

pub fn performance_stats(samples: &[PerformanceSample]) -> PerformanceStats {
    if samples.is_empty() {
        return PerformanceStats::default();
    }
    let n = samples.len();
    let times = sorted(samples.iter().map(|s| s.response_time_seconds));
    let errors = samples.iter().filter(|s| s.is_error()).count();
    let total_tokens: i64 = samples.iter().map(|s| s.token_usage).sum();

    PerformanceStats {
        average_response_time: mean(&times),
        median_response_time: median(&times),
        p95_response_time: percentile(&times, 0.95),
        p99_response_time: percentile(&times, 0.99),
        total_requests: n as u64,
        error_rate: ratio(errors as f64, n as f64) * 100.0,
        total_token_usage: total_tokens,
        average_token_usage: ratio(total_tokens as f64, n as f64),
    }
}

/// Only rows with a rating count toward the mean and the histogram.
pub fn satisfaction_stats(metrics: &[ConversationMetric]) -> SatisfactionStats {
    let mut stats = SatisfactionStats::default();
    let ratings: Vec<i32> = metrics.iter().filter_map(|m| m.user_satisfaction).collect();
    if ratings.is_empty() {
        return stats;
    }
    for rating in &ratings {
        *stats.satisfaction_distribution.entry(*rating).or_insert(0) += 1;
    }
    let as_f64: Vec<f64> = ratings.iter().map(|r| f64::from(*r)).collect();
    stats.average_satisfaction = mean(&as_f64);
    stats.total_ratings = ratings.len() as u64;
    stats
}

pub fn length_stats(metrics: &[ConversationMetric]) -> ConversationLengthStats {
    if metrics.is_empty() {
        return ConversationLengthStats::default();
    }
    let lengths = sorted(metrics.iter().map(|m| m.message_count as f64));
    ConversationLengthStats {
        average_length: mean(&lengths),
        median_length: median(&lengths),
        total_conversations: metrics.len() as u64,
    }
}

/// `samples` must be oldest first so ties in `common_errors` resolve to the
/// earliest occurrence.
pub fn error_stats(samples: &[PerformanceSample]) -> ErrorStats {
    let failed: Vec<&PerformanceSample> = samples.iter().filter(|s| s.is_error()).collect();
    if failed.is_empty() {
        return ErrorStats::default();
    }

    let mut by_status: BTreeMap<i32, u64> = BTreeMap::new();
    let mut by_endpoint: BTreeMap<String, u64> = BTreeMap::new();
    for s in &failed {
        *by_status.entry(s.status_code).or_insert(0) += 1;
        if let Some(endpoint) = &s.endpoint {
            *by_endpoint.entry(endpoint.clone()).or_insert(0) += 1;
        }
    }

    ErrorStats {
        total_errors: failed.len() as u64,
        errors_by_status_code: by_status,
        errors_by_endpoint: by_endpoint,
        common_errors: rank_by_frequency(failed.iter().filter_map(|s| s.error_message.as_deref())),
    }
}

pub fn hourly_trends(samples: &[PerformanceSample], timezone: Tz) -> Vec<HourlyTrend> {
    let mut buckets: BTreeMap<DateTime<Utc>, Vec<f64>> = BTreeMap::new();
    for s in samples {
        buckets
            .entry(hour_bucket(s.timestamp, timezone))
            .or_default()
            .push(s.response_time_seconds);
    }
    buckets
        .into_iter()
        .map(|(hour, times)| HourlyTrend {
            hour,
            average_response_time: mean(&times),
            request_count: times.len() as u64,
        })
        .collect()
}
