// src/repositories/postgres/chatbots.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use botmetrics_common::traits::ChatbotDirectory;

use crate::Error;

#[derive(Clone)]
pub struct PostgresChatbotDirectory {
    pool: Pool<Postgres>,
}

impl PostgresChatbotDirectory {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatbotDirectory for PostgresChatbotDirectory {
    async fn chatbot_exists(&self, chatbot_id: Uuid) -> Result<bool, Error> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM chatbots WHERE chatbot_id = $1) AS present")
            .bind(chatbot_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("present")?)
    }

    async fn list_chatbot_ids(&self) -> Result<Vec<Uuid>, Error> {
        let rows = sqlx::query("SELECT chatbot_id FROM chatbots ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;

        let mut ids = Vec::with_capacity(rows.len());
        for r in rows {
            ids.push(r.try_get("chatbot_id")?);
        }
        Ok(ids)
    }
}
