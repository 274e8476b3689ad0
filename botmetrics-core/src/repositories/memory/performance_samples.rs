use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use botmetrics_common::models::{PerformanceSample, SampleFilter};
use botmetrics_common::traits::PerformanceSampleRepository;

use crate::Error;

#[derive(Default)]
pub struct InMemoryPerformanceSampleRepository {
    rows: DashMap<Uuid, PerformanceSample>,
}

impl InMemoryPerformanceSampleRepository {
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
impl PerformanceSampleRepository for InMemoryPerformanceSampleRepository {
    async fn insert_sample(&self, sample: &PerformanceSample) -> Result<(), Error> {
        self.rows.insert(sample.sample_id, sample.clone());
        Ok(())
    }

    async fn get_sample(&self, sample_id: Uuid) -> Result<Option<PerformanceSample>, Error> {
        Ok(self.rows.get(&sample_id).map(|r| r.value().clone()))
    }

    async fn list_samples(
        &self,
        chatbot_id: Uuid,
        filter: &SampleFilter,
    ) -> Result<Vec<PerformanceSample>, Error> {
        let mut samples: Vec<PerformanceSample> = self
            .rows
            .iter()
            .filter(|r| r.chatbot_id == chatbot_id && filter.matches(r.value()))
            .map(|r| r.value().clone())
            .collect();
        samples.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.sample_id.cmp(&b.sample_id))
        });
        Ok(samples)
    }

    async fn delete_samples_before(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        let mut removed = 0u64;
        self.rows.retain(|_, sample| {
            let keep = sample.timestamp >= cutoff;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
