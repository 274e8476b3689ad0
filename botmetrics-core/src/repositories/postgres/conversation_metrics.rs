// src/repositories/postgres/conversation_metrics.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use botmetrics_common::models::{
    ConversationMetric, ConversationMetricPatch, SentimentPoint, TimeRange,
};
use botmetrics_common::traits::ConversationMetricRepository;

use crate::Error;

#[derive(Clone)]
pub struct PostgresConversationMetricRepository {
    pool: Pool<Postgres>,
}

impl PostgresConversationMetricRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn metric_from_row(row: &PgRow) -> Result<ConversationMetric, Error> {
    let timeline: Json<Vec<SentimentPoint>> = row.try_get("sentiment_timeline")?;
    Ok(ConversationMetric {
        conversation_id: row.try_get("conversation_id")?,
        chatbot_id: row.try_get("chatbot_id")?,
        message_count: row.try_get("message_count")?,
        duration_seconds: row.try_get("duration_seconds")?,
        avg_response_time: row.try_get("avg_response_time")?,
        user_satisfaction: row.try_get("user_satisfaction")?,
        user_intent: row.try_get("user_intent")?,
        goal_achieved: row.try_get("goal_achieved")?,
        topics_discussed: row.try_get("topics_discussed")?,
        sentiment_timeline: timeline.0,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

#[async_trait]
impl ConversationMetricRepository for PostgresConversationMetricRepository {
    async fn upsert_metric(&self, patch: &ConversationMetricPatch) -> Result<ConversationMetric, Error> {
        // One statement: a NULL parameter keeps the stored value on conflict
        // and falls back to the column default on insert.
        let row = sqlx::query(
            r#"
            INSERT INTO conversation_metrics (
                conversation_id, chatbot_id, message_count, duration_seconds,
                avg_response_time, user_satisfaction, user_intent, goal_achieved,
                topics_discussed, sentiment_timeline, created_at, updated_at
            )
            VALUES (
                $1, $2, COALESCE($3, 0), $4,
                $5, $6, $7, $8,
                COALESCE($9, ARRAY[]::TEXT[]), COALESCE($10, '[]'::JSONB), $11, $11
            )
            ON CONFLICT (conversation_id) DO UPDATE
              SET message_count      = COALESCE($3, conversation_metrics.message_count),
                  duration_seconds   = COALESCE($4, conversation_metrics.duration_seconds),
                  avg_response_time  = COALESCE($5, conversation_metrics.avg_response_time),
                  user_satisfaction  = COALESCE($6, conversation_metrics.user_satisfaction),
                  user_intent        = COALESCE($7, conversation_metrics.user_intent),
                  goal_achieved      = COALESCE($8, conversation_metrics.goal_achieved),
                  topics_discussed   = COALESCE($9, conversation_metrics.topics_discussed),
                  sentiment_timeline = COALESCE($10, conversation_metrics.sentiment_timeline),
                  updated_at         = $11
            RETURNING conversation_id, chatbot_id, message_count, duration_seconds,
                      avg_response_time, user_satisfaction, user_intent, goal_achieved,
                      topics_discussed, sentiment_timeline, created_at, updated_at
            "#
        )
            .bind(patch.conversation_id)
            .bind(patch.chatbot_id)
            .bind(patch.message_count)
            .bind(patch.duration_seconds)
            .bind(patch.avg_response_time)
            .bind(patch.user_satisfaction)
            .bind(&patch.user_intent)
            .bind(patch.goal_achieved)
            .bind(&patch.topics_discussed)
            .bind(patch.sentiment_timeline.as_ref().map(Json))
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        metric_from_row(&row)
    }

    async fn get_metric(&self, conversation_id: Uuid) -> Result<Option<ConversationMetric>, Error> {
        let row = sqlx::query(
            r#"
            SELECT conversation_id, chatbot_id, message_count, duration_seconds,
                   avg_response_time, user_satisfaction, user_intent, goal_achieved,
                   topics_discussed, sentiment_timeline, created_at, updated_at
            FROM conversation_metrics
            WHERE conversation_id = $1
            "#
        )
            .bind(conversation_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(metric_from_row).transpose()
    }

    async fn list_for_conversations(
        &self,
        conversation_ids: &[Uuid],
    ) -> Result<Vec<ConversationMetric>, Error> {
        if conversation_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(
            r#"
            SELECT conversation_id, chatbot_id, message_count, duration_seconds,
                   avg_response_time, user_satisfaction, user_intent, goal_achieved,
                   topics_discussed, sentiment_timeline, created_at, updated_at
            FROM conversation_metrics
            WHERE conversation_id = ANY($1)
            ORDER BY created_at ASC
            "#
        )
            .bind(conversation_ids)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(metric_from_row).collect()
    }

    async fn list_for_chatbot(
        &self,
        chatbot_id: Uuid,
        range: Option<&TimeRange>,
    ) -> Result<Vec<ConversationMetric>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT conversation_id, chatbot_id, message_count, duration_seconds,
                   avg_response_time, user_satisfaction, user_intent, goal_achieved,
                   topics_discussed, sentiment_timeline, created_at, updated_at
            FROM conversation_metrics
            WHERE chatbot_id = $1
              AND ($2::TIMESTAMPTZ IS NULL OR created_at >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR created_at <= $3)
            ORDER BY created_at ASC
            "#
        )
            .bind(chatbot_id)
            .bind(range.map(|r| r.start))
            .bind(range.map(|r| r.end))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(metric_from_row).collect()
    }
}
