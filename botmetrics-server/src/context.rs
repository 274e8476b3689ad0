// botmetrics-server/src/context.rs

use std::sync::Arc;

use botmetrics_core::repositories::{
    PostgresChatbotDirectory, PostgresConversationMetricRepository, PostgresConversationSource,
    PostgresDailyAnalyticsRepository, PostgresPerformanceSampleRepository,
};
use botmetrics_core::repositories::{ChatbotDirectory, PerformanceSampleRepository};
use botmetrics_core::services::{
    AggregationService, IngestionService, ReportingService, StatisticsService,
};
use botmetrics_core::{Database, MetricsConfig};

/// Everything the process needs, wired against one Postgres pool.
#[derive(Clone)]
pub struct ServerContext {
    pub config: MetricsConfig,
    pub samples: Arc<dyn PerformanceSampleRepository>,
    pub chatbots: Arc<dyn ChatbotDirectory>,
    pub ingestion: Arc<IngestionService>,
    pub aggregation: Arc<AggregationService>,
    pub statistics: Arc<StatisticsService>,
    pub reporting: Arc<ReportingService>,
}

impl ServerContext {
    pub fn new(db: &Database, config: MetricsConfig) -> Self {
        let pool = db.pool().clone();

        let samples = Arc::new(PostgresPerformanceSampleRepository::new(pool.clone()));
        let metrics = Arc::new(PostgresConversationMetricRepository::new(pool.clone()));
        let daily = Arc::new(PostgresDailyAnalyticsRepository::new(pool.clone()));
        let source = Arc::new(PostgresConversationSource::new(pool.clone()));
        let chatbots = Arc::new(PostgresChatbotDirectory::new(pool));

        let ingestion = Arc::new(IngestionService::new(samples.clone(), metrics.clone()));
        let aggregation = Arc::new(AggregationService::new(
            source,
            metrics.clone(),
            daily.clone(),
            &config,
        ));
        let statistics = Arc::new(StatisticsService::new(
            samples.clone(),
            metrics.clone(),
            config.reference_timezone,
        ));
        let reporting = Arc::new(ReportingService::new(
            daily,
            metrics,
            statistics.clone(),
            &config,
        ));

        Self {
            config,
            samples,
            chatbots,
            ingestion,
            aggregation,
            statistics,
            reporting,
        }
    }
}
