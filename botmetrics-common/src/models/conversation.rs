// Records handed to us by the conversation/message subsystem. We read
// these; we never own or write them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::daily_analytics::PopularQuery;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub conversation_id: Uuid,
    pub chatbot_id: Uuid,
    /// Session/user identifier used for unique-user counts.
    pub session_id: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Message classification for a chatbot/day, as produced upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageClassification {
    pub queries: Vec<PopularQuery>,
    pub categories: Vec<CategoryCount>,
}
