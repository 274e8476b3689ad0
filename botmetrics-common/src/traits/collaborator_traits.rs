// Narrow views onto subsystems we read from but do not own.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Error;
use crate::models::{ConversationRecord, MessageClassification, TimeRange};

#[async_trait]
pub trait ConversationSource: Send + Sync {
    /// Conversations for a chatbot that started within `window`.
    async fn list_conversations(
        &self,
        chatbot_id: Uuid,
        window: &TimeRange,
    ) -> Result<Vec<ConversationRecord>, Error>;

    async fn count_messages(&self, conversation_id: Uuid) -> Result<i64, Error>;

    /// Query and category tallies for messages in `window`.
    async fn classify_messages(
        &self,
        chatbot_id: Uuid,
        window: &TimeRange,
    ) -> Result<MessageClassification, Error>;
}

#[async_trait]
pub trait ChatbotDirectory: Send + Sync {
    async fn chatbot_exists(&self, chatbot_id: Uuid) -> Result<bool, Error>;

    async fn list_chatbot_ids(&self) -> Result<Vec<Uuid>, Error>;
}
