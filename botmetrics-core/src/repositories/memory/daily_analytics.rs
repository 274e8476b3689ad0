use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use uuid::Uuid;

use botmetrics_common::models::DailyAnalytics;
use botmetrics_common::traits::DailyAnalyticsRepository;

use crate::Error;

#[derive(Default)]
pub struct InMemoryDailyAnalyticsRepository {
    rows: DashMap<(Uuid, NaiveDate), DailyAnalytics>,
}

impl InMemoryDailyAnalyticsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl DailyAnalyticsRepository for InMemoryDailyAnalyticsRepository {
    async fn upsert_daily(&self, daily: &DailyAnalytics) -> Result<DailyAnalytics, Error> {
        self.rows.insert((daily.chatbot_id, daily.date), daily.clone());
        Ok(daily.clone())
    }

    async fn get_daily(&self, chatbot_id: Uuid, date: NaiveDate) -> Result<Option<DailyAnalytics>, Error> {
        Ok(self.rows.get(&(chatbot_id, date)).map(|r| r.value().clone()))
    }

    async fn list_daily(
        &self,
        chatbot_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyAnalytics>, Error> {
        let mut rows: Vec<DailyAnalytics> = self
            .rows
            .iter()
            .filter(|r| r.key().0 == chatbot_id && r.key().1 >= start && r.key().1 <= end)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| r.date);
        Ok(rows)
    }
}
