// In-memory stand-ins for the conversation subsystem and the chatbot registry.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use uuid::Uuid;

use botmetrics_common::models::{
    CategoryCount, ConversationRecord, MessageClassification, PopularQuery, TimeRange,
};
use botmetrics_common::traits::{ChatbotDirectory, ConversationSource};

use crate::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    pub content: String,
    pub from_user: bool,
    /// Upstream classification of bot replies.
    pub category: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl MessageRecord {
    pub fn user(content: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self { content: content.into(), from_user: true, category: None, sent_at }
    }

    pub fn bot(content: impl Into<String>, category: Option<&str>, sent_at: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            from_user: false,
            category: category.map(str::to_string),
            sent_at,
        }
    }
}

#[derive(Default)]
pub struct InMemoryConversationSource {
    conversations: DashMap<Uuid, ConversationRecord>,
    messages: DashMap<Uuid, Vec<MessageRecord>>,
}

impl InMemoryConversationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_conversation(&self, record: ConversationRecord) {
        self.messages.entry(record.conversation_id).or_default();
        self.conversations.insert(record.conversation_id, record);
    }

    pub fn add_message(&self, conversation_id: Uuid, message: MessageRecord) {
        self.messages.entry(conversation_id).or_default().push(message);
    }
}

#[async_trait]
impl ConversationSource for InMemoryConversationSource {
    async fn list_conversations(
        &self,
        chatbot_id: Uuid,
        window: &TimeRange,
    ) -> Result<Vec<ConversationRecord>, Error> {
        let mut found: Vec<ConversationRecord> = self
            .conversations
            .iter()
            .filter(|c| c.chatbot_id == chatbot_id && window.contains(c.started_at))
            .map(|c| c.value().clone())
            .collect();
        found.sort_by_key(|c| c.started_at);
        Ok(found)
    }

    async fn count_messages(&self, conversation_id: Uuid) -> Result<i64, Error> {
        Ok(self
            .messages
            .get(&conversation_id)
            .map(|m| m.len() as i64)
            .unwrap_or(0))
    }

    async fn classify_messages(
        &self,
        chatbot_id: Uuid,
        window: &TimeRange,
    ) -> Result<MessageClassification, Error> {
        let mut queries: Vec<PopularQuery> = Vec::new();
        let mut query_index: HashMap<String, usize> = HashMap::new();
        let mut categories: Vec<CategoryCount> = Vec::new();
        let mut category_index: HashMap<String, usize> = HashMap::new();

        let mut conversation_ids: Vec<(DateTime<Utc>, Uuid)> = self
            .conversations
            .iter()
            .filter(|c| c.chatbot_id == chatbot_id)
            .map(|c| (c.started_at, c.conversation_id))
            .collect();
        conversation_ids.sort();

        for (_, id) in conversation_ids {
            let Some(messages) = self.messages.get(&id) else { continue };
            for msg in messages.iter().filter(|m| window.contains(m.sent_at)) {
                if msg.from_user {
                    let key = msg.content.trim().to_lowercase();
                    match query_index.get(&key) {
                        Some(&i) => queries[i].count += 1,
                        None => {
                            query_index.insert(key.clone(), queries.len());
                            queries.push(PopularQuery { query: key, count: 1 });
                        }
                    }
                } else if let Some(category) = &msg.category {
                    match category_index.get(category) {
                        Some(&i) => categories[i].count += 1,
                        None => {
                            category_index.insert(category.clone(), categories.len());
                            categories.push(CategoryCount { category: category.clone(), count: 1 });
                        }
                    }
                }
            }
        }

        Ok(MessageClassification { queries, categories })
    }
}

#[derive(Default)]
pub struct InMemoryChatbotDirectory {
    ids: DashSet<Uuid>,
}

impl InMemoryChatbotDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, chatbot_id: Uuid) {
        self.ids.insert(chatbot_id);
    }
}

#[async_trait]
impl ChatbotDirectory for InMemoryChatbotDirectory {
    async fn chatbot_exists(&self, chatbot_id: Uuid) -> Result<bool, Error> {
        Ok(self.ids.contains(&chatbot_id))
    }

    async fn list_chatbot_ids(&self) -> Result<Vec<Uuid>, Error> {
        let mut ids: Vec<Uuid> = self.ids.iter().map(|id| *id).collect();
        ids.sort();
        Ok(ids)
    }
}
