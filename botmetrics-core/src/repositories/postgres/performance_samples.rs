// src/repositories/postgres/performance_samples.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use botmetrics_common::models::{PerformanceSample, SampleFilter};
use botmetrics_common::traits::PerformanceSampleRepository;

use crate::Error;

const SAMPLE_COLUMNS: &str = r#"
    sample_id, chatbot_id, response_time_seconds, token_usage, model_version,
    endpoint, status_code, error_message, metadata, timestamp
"#;

#[derive(Clone)]
pub struct PostgresPerformanceSampleRepository {
    pool: Pool<Postgres>,
}

impl PostgresPerformanceSampleRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn sample_from_row(row: &PgRow) -> Result<PerformanceSample, Error> {
    let metadata: Option<Json<HashMap<String, Value>>> = row.try_get("metadata")?;
    Ok(PerformanceSample {
        sample_id: row.try_get("sample_id")?,
        chatbot_id: row.try_get("chatbot_id")?,
        response_time_seconds: row.try_get("response_time_seconds")?,
        token_usage: row.try_get("token_usage")?,
        model_version: row.try_get("model_version")?,
        endpoint: row.try_get("endpoint")?,
        status_code: row.try_get("status_code")?,
        error_message: row.try_get("error_message")?,
        metadata: metadata.map(|m| m.0).unwrap_or_default(),
        timestamp: row.try_get::<DateTime<Utc>, _>("timestamp")?,
    })
}

#[async_trait]
impl PerformanceSampleRepository for PostgresPerformanceSampleRepository {
    async fn insert_sample(&self, sample: &PerformanceSample) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO performance_samples (
                sample_id, chatbot_id, response_time_seconds, token_usage, model_version,
                endpoint, status_code, error_message, metadata, timestamp
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#
        )
            .bind(sample.sample_id)
            .bind(sample.chatbot_id)
            .bind(sample.response_time_seconds)
            .bind(sample.token_usage)
            .bind(&sample.model_version)
            .bind(&sample.endpoint)
            .bind(sample.status_code)
            .bind(&sample.error_message)
            .bind(Json(&sample.metadata))
            .bind(sample.timestamp)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_sample(&self, sample_id: Uuid) -> Result<Option<PerformanceSample>, Error> {
        let sql = format!("SELECT {} FROM performance_samples WHERE sample_id = $1", SAMPLE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(sample_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(sample_from_row).transpose()
    }

    async fn list_samples(
        &self,
        chatbot_id: Uuid,
        filter: &SampleFilter,
    ) -> Result<Vec<PerformanceSample>, Error> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM performance_samples WHERE chatbot_id = ",
            SAMPLE_COLUMNS
        ));
        qb.push_bind(chatbot_id);

        if let Some(range) = &filter.time_range {
            qb.push(" AND timestamp >= ").push_bind(range.start);
            qb.push(" AND timestamp <= ").push_bind(range.end);
        }
        if let Some(min) = filter.min_response_time {
            qb.push(" AND response_time_seconds >= ").push_bind(min);
        }
        if let Some(max) = filter.max_response_time {
            qb.push(" AND response_time_seconds <= ").push_bind(max);
        }
        if let Some(code) = filter.status_code {
            qb.push(" AND status_code = ").push_bind(code);
        }
        if let Some(endpoint) = &filter.endpoint {
            qb.push(" AND endpoint = ").push_bind(endpoint.clone());
        }
        qb.push(" ORDER BY timestamp ASC, sample_id ASC");

        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut samples = Vec::with_capacity(rows.len());
        for row in &rows {
            samples.push(sample_from_row(row)?);
        }
        Ok(samples)
    }

    async fn delete_samples_before(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM performance_samples
            WHERE timestamp < $1
            "#
        )
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
