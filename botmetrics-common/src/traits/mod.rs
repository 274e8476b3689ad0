pub mod repository_traits;
pub mod collaborator_traits;

pub use repository_traits::{
    ConversationMetricRepository, DailyAnalyticsRepository, PerformanceSampleRepository,
};
pub use collaborator_traits::{ChatbotDirectory, ConversationSource};
