use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sentiment reading taken during a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub timestamp: DateTime<Utc>,
    /// -1.0 (negative) ..= 1.0 (positive)
    pub score: f64,
    /// 0.0 ..= 1.0
    pub confidence: f64,
}

/// Outcome summary for one conversation. At most one row per `conversation_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMetric {
    pub conversation_id: Uuid,
    pub chatbot_id: Uuid,
    pub message_count: i64,
    pub duration_seconds: Option<f64>,
    pub avg_response_time: Option<f64>,
    pub user_satisfaction: Option<i32>,
    pub user_intent: Option<String>,
    pub goal_achieved: Option<bool>,
    pub topics_discussed: Vec<String>,
    pub sentiment_timeline: Vec<SentimentPoint>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-facing upsert payload. Ids arrive as strings and are checked
/// against the validation table before anything touches the store.
/// `None` means "leave the stored value alone".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationMetricUpdate {
    pub conversation_id: String,
    pub chatbot_id: String,
    pub message_count: Option<i64>,
    pub duration_seconds: Option<f64>,
    pub avg_response_time: Option<f64>,
    pub user_satisfaction: Option<i32>,
    pub user_intent: Option<String>,
    pub goal_achieved: Option<bool>,
    pub topics_discussed: Option<Vec<String>>,
    pub sentiment_timeline: Option<Vec<SentimentPoint>>,
}

impl ConversationMetricUpdate {
    pub fn new(conversation_id: impl Into<String>, chatbot_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            chatbot_id: chatbot_id.into(),
            ..Default::default()
        }
    }
}

/// A validated update, ready for the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationMetricPatch {
    pub conversation_id: Uuid,
    pub chatbot_id: Uuid,
    pub message_count: Option<i64>,
    pub duration_seconds: Option<f64>,
    pub avg_response_time: Option<f64>,
    pub user_satisfaction: Option<i32>,
    pub user_intent: Option<String>,
    pub goal_achieved: Option<bool>,
    pub topics_discussed: Option<Vec<String>>,
    pub sentiment_timeline: Option<Vec<SentimentPoint>>,
}

impl ConversationMetricPatch {
    /// Row created when no metric exists yet for the conversation.
    pub fn to_new_metric(&self, now: DateTime<Utc>) -> ConversationMetric {
        ConversationMetric {
            conversation_id: self.conversation_id,
            chatbot_id: self.chatbot_id,
            message_count: self.message_count.unwrap_or(0),
            duration_seconds: self.duration_seconds,
            avg_response_time: self.avg_response_time,
            user_satisfaction: self.user_satisfaction,
            user_intent: self.user_intent.clone(),
            goal_achieved: self.goal_achieved,
            topics_discussed: self.topics_discussed.clone().unwrap_or_default(),
            sentiment_timeline: self.sentiment_timeline.clone().unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge supplied fields over an existing row. `chatbot_id` and
    /// `created_at` are fixed once the row exists.
    pub fn apply_to(&self, existing: &mut ConversationMetric, now: DateTime<Utc>) {
        if let Some(v) = self.message_count {
            existing.message_count = v;
        }
        if let Some(v) = self.duration_seconds {
            existing.duration_seconds = Some(v);
        }
        if let Some(v) = self.avg_response_time {
            existing.avg_response_time = Some(v);
        }
        if let Some(v) = self.user_satisfaction {
            existing.user_satisfaction = Some(v);
        }
        if let Some(v) = &self.user_intent {
            existing.user_intent = Some(v.clone());
        }
        if let Some(v) = self.goal_achieved {
            existing.goal_achieved = Some(v);
        }
        if let Some(v) = &self.topics_discussed {
            existing.topics_discussed = v.clone();
        }
        if let Some(v) = &self.sentiment_timeline {
            existing.sentiment_timeline = v.clone();
        }
        existing.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch() -> ConversationMetricPatch {
        ConversationMetricPatch {
            conversation_id: Uuid::new_v4(),
            chatbot_id: Uuid::new_v4(),
            message_count: None,
            duration_seconds: None,
            avg_response_time: None,
            user_satisfaction: None,
            user_intent: None,
            goal_achieved: None,
            topics_discussed: None,
            sentiment_timeline: None,
        }
    }

    #[test]
    fn new_metric_uses_defaults() {
        let now = Utc::now();
        let m = patch().to_new_metric(now);
        assert_eq!(m.message_count, 0);
        assert!(m.topics_discussed.is_empty());
        assert!(m.sentiment_timeline.is_empty());
        assert_eq!(m.created_at, now);
    }

    #[test]
    fn omitted_fields_keep_prior_values() {
        let now = Utc::now();
        let mut first = patch();
        first.message_count = Some(4);
        first.user_intent = Some("billing".into());
        let mut stored = first.to_new_metric(now);

        let mut second = first.clone();
        second.message_count = None;
        second.user_intent = None;
        second.user_satisfaction = Some(5);
        second.apply_to(&mut stored, now);

        assert_eq!(stored.message_count, 4);
        assert_eq!(stored.user_intent.as_deref(), Some("billing"));
        assert_eq!(stored.user_satisfaction, Some(5));
    }
}
