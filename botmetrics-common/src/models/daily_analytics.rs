use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularQuery {
    pub query: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCategory {
    pub category: String,
    pub count: i64,
    pub percentage: f64,
}

/// Rollup for one (chatbot, calendar day). Regenerating the same key
/// overwrites the row in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAnalytics {
    pub chatbot_id: Uuid,
    pub date: NaiveDate,
    pub total_conversations: i64,
    pub total_messages: i64,
    pub unique_users: i64,
    pub avg_conversation_length: f64,
    pub avg_response_time: f64,
    pub user_satisfaction_score: f64,
    pub total_ratings: i64,
    pub popular_queries: Vec<PopularQuery>,
    pub response_categories: Vec<ResponseCategory>,
    pub generated_at: DateTime<Utc>,
}

impl DailyAnalytics {
    /// All-zero rollup, used for days without any conversations.
    pub fn empty(chatbot_id: Uuid, date: NaiveDate, generated_at: DateTime<Utc>) -> Self {
        Self {
            chatbot_id,
            date,
            total_conversations: 0,
            total_messages: 0,
            unique_users: 0,
            avg_conversation_length: 0.0,
            avg_response_time: 0.0,
            user_satisfaction_score: 0.0,
            total_ratings: 0,
            popular_queries: Vec::new(),
            response_categories: Vec::new(),
            generated_at,
        }
    }
}
