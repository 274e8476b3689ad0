// botmetrics-core/src/db/mod.rs

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, Pool, Postgres};
use tracing::info;

use crate::config::MetricsConfig;
use crate::Error;

/// Pool wrapper shared by every Postgres repository.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Postgres>,
}

impl Database {
    /// Connect with acquire and per-statement timeouts taken from `config`,
    /// so no store call can block indefinitely.
    pub async fn new(database_url: &str, config: &MetricsConfig) -> Result<Self, Error> {
        let statement_timeout_ms = config.store_timeout.as_millis();
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.store_timeout)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    conn.execute(format!("SET statement_timeout = {}", statement_timeout_ms).as_str())
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;

        info!("Connected to Postgres (max_connections={})", config.max_connections);
        Ok(Self { pool })
    }

    /// Run migrations in the `migrations/` folder.
    pub async fn migrate(&self) -> Result<(), Error> {
        info!("Applying migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations applied successfully.");
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}
