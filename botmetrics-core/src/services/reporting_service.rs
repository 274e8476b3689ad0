// src/services/reporting_service.rs

use std::sync::Arc;

use chrono_tz::Tz;
use tracing::info;
use uuid::Uuid;

use botmetrics_common::models::{
    ConversationInsights, DailyAnalytics, DashboardMetrics, ExportFormat, SampleFilter, TimeRange,
};
use botmetrics_common::traits::{ConversationMetricRepository, DailyAnalyticsRepository};

use crate::config::MetricsConfig;
use crate::services::statistics_service::{length_stats, satisfaction_stats, StatisticsService};
use crate::utils::stats::{rank_by_frequency, ratio};
use crate::utils::time::local_date;
use crate::Error;

/// Column order and header text of the CSV export. Consumers match on it.
pub const CSV_HEADER: [&str; 7] = [
    "Date",
    "Total Conversations",
    "Total Messages",
    "Avg Conversation Length",
    "Avg Response Time",
    "Satisfaction Score",
    "Total Ratings",
];

pub struct ReportingService {
    daily: Arc<dyn DailyAnalyticsRepository>,
    metrics: Arc<dyn ConversationMetricRepository>,
    statistics: Arc<StatisticsService>,
    timezone: Tz,
    top_items: usize,
}

impl ReportingService {
    pub fn new(
        daily: Arc<dyn DailyAnalyticsRepository>,
        metrics: Arc<dyn ConversationMetricRepository>,
        statistics: Arc<StatisticsService>,
        config: &MetricsConfig,
    ) -> Self {
        Self {
            daily,
            metrics,
            statistics,
            timezone: config.reference_timezone,
            top_items: config.top_items,
        }
    }

    /// Rollups whose calendar day falls inside `range`.
    async fn daily_rows(&self, chatbot_id: Uuid, range: &TimeRange) -> Result<Vec<DailyAnalytics>, Error> {
        let first = local_date(range.start, self.timezone);
        let last = local_date(range.end, self.timezone);
        self.daily.list_daily(chatbot_id, first, last).await
    }

    pub async fn get_dashboard_metrics(
        &self,
        chatbot_id: Uuid,
        range: TimeRange,
    ) -> Result<DashboardMetrics, Error> {
        let rows = self.daily_rows(chatbot_id, &range).await?;
        let performance = self
            .statistics
            .get_performance_stats(chatbot_id, Some(&SampleFilter::in_range(range)))
            .await?;

        let total_conversations: i64 = rows.iter().map(|r| r.total_conversations).sum();
        let total_messages: i64 = rows.iter().map(|r| r.total_messages).sum();
        let unique_users: i64 = rows.iter().map(|r| r.unique_users).sum();
        let total_ratings: i64 = rows.iter().map(|r| r.total_ratings).sum();

        // Per-day averages are weighted by the population they were taken over.
        let weighted_response: f64 = rows
            .iter()
            .map(|r| r.avg_response_time * r.total_conversations as f64)
            .sum();
        let weighted_satisfaction: f64 = rows
            .iter()
            .map(|r| r.user_satisfaction_score * r.total_ratings as f64)
            .sum();

        Ok(DashboardMetrics {
            time_range: range,
            days_covered: rows.len() as u64,
            total_conversations,
            total_messages,
            unique_users,
            avg_conversation_length: ratio(total_messages as f64, total_conversations as f64),
            avg_response_time: ratio(weighted_response, total_conversations as f64),
            user_satisfaction_score: ratio(weighted_satisfaction, total_ratings as f64),
            total_ratings,
            performance_metrics: performance,
        })
    }

    pub async fn get_conversation_insights(
        &self,
        chatbot_id: Uuid,
        range: TimeRange,
    ) -> Result<ConversationInsights, Error> {
        let metrics = self.metrics.list_for_chatbot(chatbot_id, Some(&range)).await?;

        let lengths = length_stats(&metrics);
        let mut top_intents = rank_by_frequency(metrics.iter().filter_map(|m| m.user_intent.as_deref()));
        top_intents.truncate(self.top_items);
        let mut top_topics = rank_by_frequency(
            metrics
                .iter()
                .flat_map(|m| m.topics_discussed.iter().map(String::as_str)),
        );
        top_topics.truncate(self.top_items);
        let achieved = metrics.iter().filter(|m| m.goal_achieved == Some(true)).count();

        Ok(ConversationInsights {
            total_conversations: lengths.total_conversations,
            average_length: lengths.average_length,
            median_length: lengths.median_length,
            satisfaction_stats: satisfaction_stats(&metrics),
            top_intents,
            top_topics,
            goal_achievement_rate: ratio(achieved as f64, metrics.len() as f64),
        })
    }

    /// Serialize the rollups in `range`, oldest first.
    pub async fn export_analytics_data(
        &self,
        chatbot_id: Uuid,
        range: TimeRange,
        format: ExportFormat,
    ) -> Result<String, Error> {
        let rows = self.daily_rows(chatbot_id, &range).await?;
        let out = match format {
            ExportFormat::Json => serde_json::to_string_pretty(&rows)?,
            ExportFormat::Csv => rows_to_csv(&rows)?,
        };
        info!(
            "Exported {} day(s) of analytics for chatbot {} as {}",
            rows.len(),
            chatbot_id,
            format
        );
        Ok(out)
    }
}

/// Header plus one line per day. The csv writer quotes any field holding a
/// comma, quote or newline.
pub fn rows_to_csv(rows: &[DailyAnalytics]) -> Result<String, Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|e| Error::Csv(e.to_string()))?;

    for row in rows {
        writer
            .write_record([
                row.date.format("%Y-%m-%d").to_string(),
                row.total_conversations.to_string(),
                row.total_messages.to_string(),
                row.avg_conversation_length.to_string(),
                row.avg_response_time.to_string(),
                row.user_satisfaction_score.to_string(),
                row.total_ratings.to_string(),
            ])
            .map_err(|e| Error::Csv(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::Csv(e.to_string()))
}
