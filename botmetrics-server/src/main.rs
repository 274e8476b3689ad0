use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use botmetrics_common::models::{ExportFormat, SampleOptions, TimeRange};
use botmetrics_core::services::ensure_chatbot_exists;
use botmetrics_core::tasks::daily_rollup::spawn_daily_rollup_task;
use botmetrics_core::tasks::retention_sweeper::{cleanup_old_metrics, spawn_retention_sweeper};
use botmetrics_core::{Database, Error, MetricsConfig};

mod context;
use context::ServerContext;

#[derive(Parser, Debug, Clone)]
#[command(name = "botmetrics")]
#[command(author, version, about = "Chatbot metrics ingestion, daily rollups and retention")]
struct Args {
    /// Postgres connection URL.
    #[arg(long, env = "DATABASE_URL", default_value = "postgres://botmetrics@localhost:5432/botmetrics")]
    db_url: String,

    /// Samples older than this many days are deleted by the sweeper.
    #[arg(long, env = "BOTMETRICS_RETENTION_DAYS", default_value_t = 30)]
    retention_days: u32,

    /// Seconds between retention sweeps.
    #[arg(long, env = "BOTMETRICS_SWEEP_INTERVAL_SECS", default_value_t = 24 * 3600)]
    sweep_interval_secs: u64,

    /// Seconds between nightly rollups.
    #[arg(long, env = "BOTMETRICS_ROLLUP_INTERVAL_SECS", default_value_t = 24 * 3600)]
    rollup_interval_secs: u64,

    /// IANA timezone that defines calendar days, e.g. "Europe/Berlin".
    #[arg(long, env = "BOTMETRICS_TIMEZONE", default_value = "UTC")]
    timezone: String,

    /// Upper bound on any single store call, in milliseconds.
    #[arg(long, env = "BOTMETRICS_STORE_TIMEOUT_MS", default_value_t = 5000)]
    store_timeout_ms: u64,

    #[arg(long, env = "BOTMETRICS_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    /// Cap on popular queries, intents and topics in rollups and insights.
    #[arg(long, env = "BOTMETRICS_TOP_ITEMS", default_value_t = 10)]
    top_items: usize,

    /// Skip applying migrations at startup.
    #[arg(long, default_value = "false")]
    no_migrate: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Run the retention sweeper and nightly rollup until Ctrl-C.
    Run,
    /// Delete expired samples once and exit.
    Sweep {
        /// Overrides --retention-days for this run.
        #[arg(long)]
        max_age_days: Option<u32>,
    },
    /// Regenerate daily analytics for an inclusive date range.
    Rollup {
        #[arg(long)]
        chatbot: Uuid,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },
    /// Print daily analytics as JSON or CSV.
    Export {
        #[arg(long)]
        chatbot: Uuid,
        /// One of 24h, 7d, 30d, 90d.
        #[arg(long, default_value = "30d")]
        range: String,
        #[arg(long, default_value = "csv")]
        format: String,
    },
    /// Print dashboard metrics and conversation insights as JSON.
    Stats {
        #[arg(long)]
        chatbot: Uuid,
        #[arg(long, default_value = "7d")]
        range: String,
    },
    /// Record a single performance sample (smoke testing).
    Record {
        #[arg(long)]
        chatbot: String,
        #[arg(long)]
        response_time: f64,
        #[arg(long)]
        status_code: Option<i32>,
        #[arg(long)]
        endpoint: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("botmetrics=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

fn build_config(args: &Args) -> Result<MetricsConfig, Error> {
    let reference_timezone: Tz = args
        .timezone
        .parse()
        .map_err(|e| Error::Validation(format!("bad timezone '{}': {}", args.timezone, e)))?;

    Ok(MetricsConfig {
        retention_days: args.retention_days,
        sweep_interval: Duration::from_secs(args.sweep_interval_secs),
        rollup_interval: Duration::from_secs(args.rollup_interval_secs),
        reference_timezone,
        store_timeout: Duration::from_millis(args.store_timeout_ms),
        max_connections: args.max_connections,
        top_items: args.top_items,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("botmetrics error: {:?}", e);
        return Err(e.into());
    }
    Ok(())
}

async fn run(args: Args) -> Result<(), Error> {
    let config = build_config(&args)?;
    info!(
        "botmetrics starting. retention_days={}, timezone={}",
        config.retention_days, config.reference_timezone
    );

    let db = Database::new(&args.db_url, &config).await?;
    if !args.no_migrate {
        db.migrate().await?;
    }
    let ctx = ServerContext::new(&db, config);

    match args.command {
        Command::Run => run_background(ctx).await,
        Command::Sweep { max_age_days } => {
            let days = max_age_days.unwrap_or(ctx.config.retention_days);
            let deleted = cleanup_old_metrics(ctx.samples.as_ref(), days).await?;
            println!("{}", deleted);
            Ok(())
        }
        Command::Rollup { chatbot, start, end } => {
            ensure_chatbot_exists(ctx.chatbots.as_ref(), chatbot).await?;
            let rows = ctx.aggregation.batch_generate_analytics(chatbot, start, end).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
            Ok(())
        }
        Command::Export { chatbot, range, format } => {
            ensure_chatbot_exists(ctx.chatbots.as_ref(), chatbot).await?;
            let range: TimeRange = range.parse()?;
            let format: ExportFormat = format.parse()?;
            let out = ctx.reporting.export_analytics_data(chatbot, range, format).await?;
            println!("{}", out);
            Ok(())
        }
        Command::Stats { chatbot, range } => {
            ensure_chatbot_exists(ctx.chatbots.as_ref(), chatbot).await?;
            let range: TimeRange = range.parse()?;
            let dashboard = ctx.reporting.get_dashboard_metrics(chatbot, range).await?;
            let insights = ctx.reporting.get_conversation_insights(chatbot, range).await?;
            let errors = ctx.statistics.get_error_stats(chatbot).await?;
            let report = serde_json::json!({
                "dashboard": dashboard,
                "insights": insights,
                "errors": errors,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Record { chatbot, response_time, status_code, endpoint } => {
            let options = SampleOptions { status_code, endpoint, ..Default::default() };
            let sample = ctx.ingestion.record_sample(&chatbot, response_time, options).await?;
            println!("{}", serde_json::to_string_pretty(&sample)?);
            Ok(())
        }
    }
}

async fn run_background(ctx: ServerContext) -> Result<(), Error> {
    let sweeper = spawn_retention_sweeper(
        ctx.samples.clone(),
        ctx.config.retention_days,
        ctx.config.sweep_interval,
    );
    let rollup = spawn_daily_rollup_task(
        ctx.aggregation.clone(),
        ctx.chatbots.clone(),
        ctx.config.rollup_interval,
    );
    info!("Background tasks running. Press Ctrl-C to stop.");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested; stopping background tasks.");
    sweeper.abort();
    rollup.abort();
    info!("Main finished. Goodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_items_flag_reaches_config() {
        let args = Args::try_parse_from(["botmetrics", "--top-items", "3", "--timezone", "Europe/Berlin", "run"])
            .unwrap();
        let config = build_config(&args).unwrap();
        assert_eq!(config.top_items, 3);
        assert_eq!(config.reference_timezone, chrono_tz::Europe::Berlin);
    }

    #[test]
    fn bad_timezone_is_rejected() {
        let args = Args::try_parse_from(["botmetrics", "--timezone", "Mars/Olympus", "run"]).unwrap();
        assert!(matches!(build_config(&args), Err(Error::Validation(_))));
    }
}
