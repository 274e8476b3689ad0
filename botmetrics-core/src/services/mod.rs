// src/services/mod.rs

pub mod ingestion_service;
pub mod aggregation_service;
pub mod statistics_service;
pub mod reporting_service;

pub use ingestion_service::IngestionService;
pub use aggregation_service::AggregationService;
pub use statistics_service::StatisticsService;
pub use reporting_service::ReportingService;

use uuid::Uuid;

use botmetrics_common::traits::ChatbotDirectory;

use crate::Error;

/// For callers that require the chatbot to exist before querying it.
/// Ingestion itself never calls this.
pub async fn ensure_chatbot_exists(
    directory: &dyn ChatbotDirectory,
    chatbot_id: Uuid,
) -> Result<(), Error> {
    if directory.chatbot_exists(chatbot_id).await? {
        Ok(())
    } else {
        Err(Error::NotFound(format!("No chatbot with id={}", chatbot_id)))
    }
}
