use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use botmetrics_common::models::{ConversationMetric, ConversationMetricPatch, TimeRange};
use botmetrics_common::traits::ConversationMetricRepository;

use crate::Error;

#[derive(Default)]
pub struct InMemoryConversationMetricRepository {
    rows: DashMap<Uuid, ConversationMetric>,
}

impl InMemoryConversationMetricRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn sorted(mut metrics: Vec<ConversationMetric>) -> Vec<ConversationMetric> {
        metrics.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.conversation_id.cmp(&b.conversation_id))
        });
        metrics
    }
}

#[async_trait]
impl ConversationMetricRepository for InMemoryConversationMetricRepository {
    async fn upsert_metric(&self, patch: &ConversationMetricPatch) -> Result<ConversationMetric, Error> {
        let now = Utc::now();
        let stored = match self.rows.entry(patch.conversation_id) {
            Entry::Occupied(mut existing) => {
                patch.apply_to(existing.get_mut(), now);
                existing.get().clone()
            }
            Entry::Vacant(slot) => slot.insert(patch.to_new_metric(now)).value().clone(),
        };
        Ok(stored)
    }

    async fn get_metric(&self, conversation_id: Uuid) -> Result<Option<ConversationMetric>, Error> {
        Ok(self.rows.get(&conversation_id).map(|r| r.value().clone()))
    }

    async fn list_for_conversations(
        &self,
        conversation_ids: &[Uuid],
    ) -> Result<Vec<ConversationMetric>, Error> {
        let found = conversation_ids
            .iter()
            .filter_map(|id| self.rows.get(id).map(|r| r.value().clone()))
            .collect();
        Ok(Self::sorted(found))
    }

    async fn list_for_chatbot(
        &self,
        chatbot_id: Uuid,
        range: Option<&TimeRange>,
    ) -> Result<Vec<ConversationMetric>, Error> {
        let found = self
            .rows
            .iter()
            .filter(|r| r.chatbot_id == chatbot_id)
            .filter(|r| range.map_or(true, |range| range.contains(r.created_at)))
            .map(|r| r.value().clone())
            .collect();
        Ok(Self::sorted(found))
    }
}
