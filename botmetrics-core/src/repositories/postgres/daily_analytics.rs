// src/repositories/postgres/daily_analytics.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use botmetrics_common::models::{DailyAnalytics, PopularQuery, ResponseCategory};
use botmetrics_common::traits::DailyAnalyticsRepository;

use crate::Error;

#[derive(Clone)]
pub struct PostgresDailyAnalyticsRepository {
    pool: Pool<Postgres>,
}

impl PostgresDailyAnalyticsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn daily_from_row(row: &PgRow) -> Result<DailyAnalytics, Error> {
    let queries: Json<Vec<PopularQuery>> = row.try_get("popular_queries")?;
    let categories: Json<Vec<ResponseCategory>> = row.try_get("response_categories")?;
    Ok(DailyAnalytics {
        chatbot_id: row.try_get("chatbot_id")?,
        date: row.try_get::<NaiveDate, _>("date")?,
        total_conversations: row.try_get("total_conversations")?,
        total_messages: row.try_get("total_messages")?,
        unique_users: row.try_get("unique_users")?,
        avg_conversation_length: row.try_get("avg_conversation_length")?,
        avg_response_time: row.try_get("avg_response_time")?,
        user_satisfaction_score: row.try_get("user_satisfaction_score")?,
        total_ratings: row.try_get("total_ratings")?,
        popular_queries: queries.0,
        response_categories: categories.0,
        generated_at: row.try_get::<DateTime<Utc>, _>("generated_at")?,
    })
}

#[async_trait]
impl DailyAnalyticsRepository for PostgresDailyAnalyticsRepository {
    async fn upsert_daily(&self, daily: &DailyAnalytics) -> Result<DailyAnalytics, Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO daily_analytics (
                chatbot_id, date, total_conversations, total_messages, unique_users,
                avg_conversation_length, avg_response_time, user_satisfaction_score,
                total_ratings, popular_queries, response_categories, generated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (chatbot_id, date) DO UPDATE
              SET total_conversations     = EXCLUDED.total_conversations,
                  total_messages          = EXCLUDED.total_messages,
                  unique_users            = EXCLUDED.unique_users,
                  avg_conversation_length = EXCLUDED.avg_conversation_length,
                  avg_response_time       = EXCLUDED.avg_response_time,
                  user_satisfaction_score = EXCLUDED.user_satisfaction_score,
                  total_ratings           = EXCLUDED.total_ratings,
                  popular_queries         = EXCLUDED.popular_queries,
                  response_categories     = EXCLUDED.response_categories,
                  generated_at            = EXCLUDED.generated_at
            RETURNING chatbot_id, date, total_conversations, total_messages, unique_users,
                      avg_conversation_length, avg_response_time, user_satisfaction_score,
                      total_ratings, popular_queries, response_categories, generated_at
            "#
        )
            .bind(daily.chatbot_id)
            .bind(daily.date)
            .bind(daily.total_conversations)
            .bind(daily.total_messages)
            .bind(daily.unique_users)
            .bind(daily.avg_conversation_length)
            .bind(daily.avg_response_time)
            .bind(daily.user_satisfaction_score)
            .bind(daily.total_ratings)
            .bind(Json(&daily.popular_queries))
            .bind(Json(&daily.response_categories))
            .bind(daily.generated_at)
            .fetch_one(&self.pool)
            .await?;

        daily_from_row(&row)
    }

    async fn get_daily(&self, chatbot_id: Uuid, date: NaiveDate) -> Result<Option<DailyAnalytics>, Error> {
        let row = sqlx::query(
            r#"
            SELECT chatbot_id, date, total_conversations, total_messages, unique_users,
                   avg_conversation_length, avg_response_time, user_satisfaction_score,
                   total_ratings, popular_queries, response_categories, generated_at
            FROM daily_analytics
            WHERE chatbot_id = $1 AND date = $2
            "#
        )
            .bind(chatbot_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(daily_from_row).transpose()
    }

    async fn list_daily(
        &self,
        chatbot_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyAnalytics>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT chatbot_id, date, total_conversations, total_messages, unique_users,
                   avg_conversation_length, avg_response_time, user_satisfaction_score,
                   total_ratings, popular_queries, response_categories, generated_at
            FROM daily_analytics
            WHERE chatbot_id = $1
              AND date >= $2
              AND date <= $3
            ORDER BY date ASC
            "#
        )
            .bind(chatbot_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(daily_from_row).collect()
    }
}
