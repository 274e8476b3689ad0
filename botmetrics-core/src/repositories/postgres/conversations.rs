// src/repositories/postgres/conversations.rs
//
// Read-only access to the conversation subsystem's tables. We never write
// to `conversations` or `messages`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use botmetrics_common::models::{
    CategoryCount, ConversationRecord, MessageClassification, PopularQuery, TimeRange,
};
use botmetrics_common::traits::ConversationSource;

use crate::Error;

/// How many distinct user queries to pull per day before ranking.
const QUERY_SCAN_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct PostgresConversationSource {
    pool: Pool<Postgres>,
}

impl PostgresConversationSource {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationSource for PostgresConversationSource {
    async fn list_conversations(
        &self,
        chatbot_id: Uuid,
        window: &TimeRange,
    ) -> Result<Vec<ConversationRecord>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT conversation_id, chatbot_id, session_id, started_at
            FROM conversations
            WHERE chatbot_id = $1
              AND started_at >= $2
              AND started_at <= $3
            ORDER BY started_at ASC
            "#
        )
            .bind(chatbot_id)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&self.pool)
            .await?;

        let mut conversations = Vec::with_capacity(rows.len());
        for row in rows {
            conversations.push(ConversationRecord {
                conversation_id: row.try_get("conversation_id")?,
                chatbot_id: row.try_get("chatbot_id")?,
                session_id: row.try_get("session_id")?,
                started_at: row.try_get::<DateTime<Utc>, _>("started_at")?,
            });
        }
        Ok(conversations)
    }

    async fn count_messages(&self, conversation_id: Uuid) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM messages WHERE conversation_id = $1")
            .bind(conversation_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("cnt")?)
    }

    async fn classify_messages(
        &self,
        chatbot_id: Uuid,
        window: &TimeRange,
    ) -> Result<MessageClassification, Error> {
        let query_rows = sqlx::query(
            r#"
            SELECT LOWER(TRIM(m.content)) AS query, COUNT(*) AS cnt
            FROM messages m
            JOIN conversations c ON c.conversation_id = m.conversation_id
            WHERE c.chatbot_id = $1
              AND m.role = 'user'
              AND m.created_at >= $2
              AND m.created_at <= $3
            GROUP BY LOWER(TRIM(m.content))
            ORDER BY cnt DESC, query ASC
            LIMIT $4
            "#
        )
            .bind(chatbot_id)
            .bind(window.start)
            .bind(window.end)
            .bind(QUERY_SCAN_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        let category_rows = sqlx::query(
            r#"
            SELECT m.category AS category, COUNT(*) AS cnt
            FROM messages m
            JOIN conversations c ON c.conversation_id = m.conversation_id
            WHERE c.chatbot_id = $1
              AND m.role = 'assistant'
              AND m.category IS NOT NULL
              AND m.created_at >= $2
              AND m.created_at <= $3
            GROUP BY m.category
            ORDER BY cnt DESC, category ASC
            "#
        )
            .bind(chatbot_id)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&self.pool)
            .await?;

        let mut classification = MessageClassification::default();
        for row in query_rows {
            classification.queries.push(PopularQuery {
                query: row.try_get("query")?,
                count: row.try_get("cnt")?,
            });
        }
        for row in category_rows {
            classification.categories.push(CategoryCount {
                category: row.try_get("category")?,
                count: row.try_get("cnt")?,
            });
        }
        Ok(classification)
    }
}
