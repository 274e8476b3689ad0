// src/services/aggregation_service.rs

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, error, info};
use uuid::Uuid;

use botmetrics_common::models::{
    CategoryCount, ConversationMetric, DailyAnalytics, MessageClassification, PopularQuery,
    ResponseCategory,
};
use botmetrics_common::traits::{
    ConversationMetricRepository, ConversationSource, DailyAnalyticsRepository,
};

use crate::config::MetricsConfig;
use crate::utils::stats::{mean, ratio};
use crate::utils::time::{day_window, days_inclusive};
use crate::utils::timeout::bounded;
use crate::Error;

/// Builds the per-(chatbot, day) rollups.
pub struct AggregationService {
    source: Arc<dyn ConversationSource>,
    metrics: Arc<dyn ConversationMetricRepository>,
    daily: Arc<dyn DailyAnalyticsRepository>,
    timezone: Tz,
    store_timeout: Duration,
    top_items: usize,
}

impl AggregationService {
    pub fn new(
        source: Arc<dyn ConversationSource>,
        metrics: Arc<dyn ConversationMetricRepository>,
        daily: Arc<dyn DailyAnalyticsRepository>,
        config: &MetricsConfig,
    ) -> Self {
        Self {
            source,
            metrics,
            daily,
            timezone: config.reference_timezone,
            store_timeout: config.store_timeout,
            top_items: config.top_items,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Recompute and upsert the rollup for one day. Running it twice for the
    /// same key overwrites the first result.
    pub async fn generate_daily_analytics(
        &self,
        chatbot_id: Uuid,
        date: NaiveDate,
    ) -> Result<DailyAnalytics, Error> {
        let window = day_window(date, self.timezone)?;
        let limit = self.store_timeout;

        let conversations = bounded(limit, self.source.list_conversations(chatbot_id, &window)).await?;

        let rollup = if conversations.is_empty() {
            DailyAnalytics::empty(chatbot_id, date, Utc::now())
        } else {
            let mut total_messages = 0i64;
            for conversation in &conversations {
                total_messages += bounded(limit, self.source.count_messages(conversation.conversation_id)).await?;
            }

            let unique_users = conversations
                .iter()
                .map(|c| c.session_id.as_str())
                .collect::<HashSet<_>>()
                .len() as i64;

            let ids: Vec<Uuid> = conversations.iter().map(|c| c.conversation_id).collect();
            let metrics = self.metrics.list_for_conversations(&ids).await?;
            let classification = bounded(limit, self.source.classify_messages(chatbot_id, &window)).await?;

            self.build_rollup(chatbot_id, date, conversations.len() as i64, total_messages, unique_users, &metrics, classification)
        };

        let stored = self.daily.upsert_daily(&rollup).await?;
        debug!(
            "Daily analytics for chatbot {} on {}: conversations={}, messages={}",
            chatbot_id, date, stored.total_conversations, stored.total_messages
        );
        Ok(stored)
    }

    /// Regenerate every day in `start..=end`, oldest first. Stops at the
    /// first failure; days already written stay written.
    pub async fn batch_generate_analytics(
        &self,
        chatbot_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyAnalytics>, Error> {
        if start > end {
            return Err(Error::Validation(format!(
                "batch start {} is after end {}",
                start, end
            )));
        }

        let mut results = Vec::new();
        for date in days_inclusive(start, end) {
            match self.generate_daily_analytics(chatbot_id, date).await {
                Ok(row) => results.push(row),
                Err(e) => {
                    error!(
                        "Batch analytics for chatbot {} aborted at {} after {} day(s): {:?}",
                        chatbot_id,
                        date,
                        results.len(),
                        e
                    );
                    return Err(e);
                }
            }
        }

        info!(
            "Generated {} day(s) of analytics for chatbot {} ({}..={})",
            results.len(),
            chatbot_id,
            start,
            end
        );
        Ok(results)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_rollup(
        &self,
        chatbot_id: Uuid,
        date: NaiveDate,
        total_conversations: i64,
        total_messages: i64,
        unique_users: i64,
        metrics: &[ConversationMetric],
        classification: MessageClassification,
    ) -> DailyAnalytics {
        let response_times: Vec<f64> = metrics.iter().filter_map(|m| m.avg_response_time).collect();
        let ratings: Vec<f64> = metrics
            .iter()
            .filter_map(|m| m.user_satisfaction)
            .map(f64::from)
            .collect();

        DailyAnalytics {
            chatbot_id,
            date,
            total_conversations,
            total_messages,
            unique_users,
            avg_conversation_length: ratio(total_messages as f64, total_conversations as f64),
            avg_response_time: mean(&response_times),
            user_satisfaction_score: mean(&ratings),
            total_ratings: ratings.len() as i64,
            popular_queries: rank_queries(classification.queries, self.top_items),
            response_categories: category_shares(classification.categories),
            generated_at: Utc::now(),
        }
    }
}

/// Merge duplicate queries, order by count (stable), keep the first `limit`.
fn rank_queries(queries: Vec<PopularQuery>, limit: usize) -> Vec<PopularQuery> {
    let mut merged: Vec<PopularQuery> = Vec::with_capacity(queries.len());
    for q in queries {
        match merged.iter_mut().find(|m| m.query == q.query) {
            Some(existing) => existing.count += q.count,
            None => merged.push(q),
        }
    }
    merged.sort_by(|a, b| b.count.cmp(&a.count));
    merged.truncate(limit);
    merged
}

/// Attach each category's share of the total, as a percentage.
fn category_shares(categories: Vec<CategoryCount>) -> Vec<ResponseCategory> {
    let total: i64 = categories.iter().map(|c| c.count).sum();
    let mut shares: Vec<ResponseCategory> = categories
        .into_iter()
        .map(|c| ResponseCategory {
            percentage: ratio(c.count as f64, total as f64) * 100.0,
            category: c.category,
            count: c.count,
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_merge_and_rank() {
        let ranked = rank_queries(
            vec![
                PopularQuery { query: "pricing".into(), count: 2 },
                PopularQuery { query: "hours".into(), count: 3 },
                PopularQuery { query: "pricing".into(), count: 2 },
                PopularQuery { query: "refund".into(), count: 1 },
            ],
            2,
        );
        assert_eq!(
            ranked,
            vec![
                PopularQuery { query: "pricing".into(), count: 4 },
                PopularQuery { query: "hours".into(), count: 3 },
            ]
        );
    }

    #[test]
    fn category_percentages() {
        let shares = category_shares(vec![
            CategoryCount { category: "faq".into(), count: 1 },
            CategoryCount { category: "support".into(), count: 3 },
        ]);
        assert_eq!(shares[0].category, "support");
        assert_eq!(shares[0].percentage, 75.0);
        assert_eq!(shares[1].percentage, 25.0);
        assert!(category_shares(Vec::new()).is_empty());
    }
}
