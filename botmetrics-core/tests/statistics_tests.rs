// File: botmetrics-core/tests/statistics_tests.rs

mod test_utils;

use chrono::Duration;
use chrono_tz::Tz;
use uuid::Uuid;

use botmetrics_common::models::{ConversationMetricUpdate, SampleFilter, SampleOptions};
use botmetrics_core::{Error, MetricsConfig};
use test_utils::{at, failed_at, utc, Harness};

#[tokio::test]
async fn test_performance_stats_over_five_samples() -> Result<(), Error> {
    let h = Harness::new();
    let bot = Uuid::new_v4();
    let base = utc(2025, 3, 1, 9, 0);

    let tokens = [100, 150, 200, 250, 300];
    for (i, rt) in [3.0, 1.0, 5.0, 2.0, 4.0].into_iter().enumerate() {
        let mut opts = at(base + Duration::minutes(i as i64));
        opts.token_usage = Some(tokens[i]);
        if i == 4 {
            opts.status_code = Some(500);
        }
        h.record(bot, rt, opts).await?;
    }

    let stats = h.statistics.get_performance_stats(bot, None).await?;
    assert_eq!(stats.total_requests, 5);
    assert_eq!(stats.average_response_time, 3.0);
    assert_eq!(stats.median_response_time, 3.0);
    assert_eq!(stats.p95_response_time, 5.0);
    assert_eq!(stats.p99_response_time, 5.0);
    assert_eq!(stats.error_rate, 20.0);
    assert_eq!(stats.total_token_usage, 1000);
    assert_eq!(stats.average_token_usage, 200.0);
    Ok(())
}

#[tokio::test]
async fn test_performance_stats_even_count_median() -> Result<(), Error> {
    let h = Harness::new();
    let bot = Uuid::new_v4();
    let base = utc(2025, 3, 1, 9, 0);
    for (i, rt) in [1.0, 2.0, 3.0, 4.0].into_iter().enumerate() {
        h.record(bot, rt, at(base + Duration::seconds(i as i64))).await?;
    }

    let stats = h.statistics.get_performance_stats(bot, None).await?;
    assert_eq!(stats.median_response_time, 2.5);
    // round(0.95 * 3) = 3
    assert_eq!(stats.p95_response_time, 4.0);
    assert_eq!(stats.error_rate, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_performance_stats_filter_and_empty() -> Result<(), Error> {
    let h = Harness::new();
    let bot = Uuid::new_v4();
    let base = utc(2025, 3, 1, 9, 0);
    h.record(bot, 0.5, at(base)).await?;
    h.record(bot, 9.0, failed_at(base, 503, "/chat", "upstream")).await?;

    let only_503 = SampleFilter { status_code: Some(503), ..Default::default() };
    let stats = h.statistics.get_performance_stats(bot, Some(&only_503)).await?;
    assert_eq!(stats.total_requests, 1);
    assert_eq!(stats.average_response_time, 9.0);
    assert_eq!(stats.error_rate, 100.0);

    let empty = h.statistics.get_performance_stats(Uuid::new_v4(), None).await?;
    assert_eq!(empty.total_requests, 0);
    assert_eq!(empty.average_response_time, 0.0);
    assert_eq!(empty.p99_response_time, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_satisfaction_distribution_keeps_all_keys() -> Result<(), Error> {
    let h = Harness::new();
    let bot = Uuid::new_v4();

    for rating in [Some(5), Some(4), Some(5), None] {
        let mut update = ConversationMetricUpdate::new(Uuid::new_v4().to_string(), bot.to_string());
        update.user_satisfaction = rating;
        h.ingestion.upsert_conversation_metric(&update).await?;
    }

    let stats = h.statistics.get_satisfaction_stats(bot).await?;
    assert_eq!(stats.total_ratings, 3);
    assert!((stats.average_satisfaction - 14.0 / 3.0).abs() < 1e-9);
    assert_eq!(stats.satisfaction_distribution.len(), 5);
    assert_eq!(stats.satisfaction_distribution[&5], 2);
    assert_eq!(stats.satisfaction_distribution[&4], 1);
    assert_eq!(stats.satisfaction_distribution[&1], 0);

    let none = h.statistics.get_satisfaction_stats(Uuid::new_v4()).await?;
    assert_eq!(none.total_ratings, 0);
    assert_eq!(none.average_satisfaction, 0.0);
    assert_eq!(none.satisfaction_distribution.values().sum::<u64>(), 0);
    assert_eq!(none.satisfaction_distribution.len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_conversation_length_stats() -> Result<(), Error> {
    let h = Harness::new();
    let bot = Uuid::new_v4();

    for count in [8, 2, 6, 4] {
        let mut update = ConversationMetricUpdate::new(Uuid::new_v4().to_string(), bot.to_string());
        update.message_count = Some(count);
        h.ingestion.upsert_conversation_metric(&update).await?;
    }

    let stats = h.statistics.get_conversation_length_stats(bot).await?;
    assert_eq!(stats.total_conversations, 4);
    assert_eq!(stats.average_length, 5.0);
    assert_eq!(stats.median_length, 5.0);
    Ok(())
}

#[tokio::test]
async fn test_error_stats_breakdown_and_tie_order() -> Result<(), Error> {
    let h = Harness::new();
    let bot = Uuid::new_v4();
    let base = utc(2025, 3, 1, 12, 0);

    h.record(bot, 1.0, at(base)).await?;
    h.record(bot, 1.0, failed_at(base + Duration::seconds(1), 502, "/chat", "bad gateway")).await?;
    h.record(bot, 1.0, failed_at(base + Duration::seconds(2), 429, "/embed", "rate limited")).await?;
    h.record(bot, 1.0, failed_at(base + Duration::seconds(3), 429, "/chat", "rate limited")).await?;
    h.record(bot, 1.0, failed_at(base + Duration::seconds(4), 500, "/chat", "timeout")).await?;
    // Status >= 400 without a message or endpoint still counts.
    h.record(
        bot,
        1.0,
        SampleOptions {
            status_code: Some(500),
            timestamp: Some(base + Duration::seconds(5)),
            ..Default::default()
        },
    )
    .await?;

    let stats = h.statistics.get_error_stats(bot).await?;
    assert_eq!(stats.total_errors, 5);
    assert_eq!(stats.errors_by_status_code[&429], 2);
    assert_eq!(stats.errors_by_status_code[&500], 2);
    assert_eq!(stats.errors_by_status_code[&502], 1);
    assert_eq!(stats.errors_by_endpoint["/chat"], 3);
    assert_eq!(stats.errors_by_endpoint["/embed"], 1);

    let order: Vec<(&str, u64)> = stats
        .common_errors
        .iter()
        .map(|e| (e.value.as_str(), e.count))
        .collect();
    assert_eq!(order, vec![("rate limited", 2), ("bad gateway", 1), ("timeout", 1)]);
    Ok(())
}

#[tokio::test]
async fn test_error_stats_without_errors() -> Result<(), Error> {
    let h = Harness::new();
    let bot = Uuid::new_v4();
    h.record(bot, 1.0, at(utc(2025, 3, 1, 12, 0))).await?;

    let stats = h.statistics.get_error_stats(bot).await?;
    assert_eq!(stats.total_errors, 0);
    assert!(stats.errors_by_status_code.is_empty());
    assert!(stats.common_errors.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_hourly_trends_only_non_empty_hours() -> Result<(), Error> {
    let h = Harness::new();
    let bot = Uuid::new_v4();

    h.record(bot, 1.0, at(utc(2025, 3, 1, 10, 5))).await?;
    h.record(bot, 3.0, at(utc(2025, 3, 1, 10, 40))).await?;
    h.record(bot, 5.0, at(utc(2025, 3, 1, 12, 0))).await?;
    // Outside the requested range.
    h.record(bot, 9.0, at(utc(2025, 3, 2, 10, 0))).await?;

    let trends = h
        .statistics
        .get_hourly_trends(bot, utc(2025, 3, 1, 0, 0), utc(2025, 3, 1, 23, 59))
        .await?;

    assert_eq!(trends.len(), 2);
    assert_eq!(trends[0].hour, utc(2025, 3, 1, 10, 0));
    assert_eq!(trends[0].request_count, 2);
    assert_eq!(trends[0].average_response_time, 2.0);
    assert_eq!(trends[1].hour, utc(2025, 3, 1, 12, 0));
    assert_eq!(trends[1].request_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_hourly_trends_groups_repeated_dst_hour() -> Result<(), Error> {
    let tz: Tz = "America/New_York".parse().expect("known timezone");
    let h = Harness::with_config(MetricsConfig { reference_timezone: tz, ..MetricsConfig::default() });
    let bot = Uuid::new_v4();

    // 01:10 and 01:40 EDT on fall-back day.
    h.record(bot, 1.0, at(utc(2024, 11, 3, 5, 10))).await?;
    h.record(bot, 3.0, at(utc(2024, 11, 3, 5, 40))).await?;
    // 01:20 EST, the repeated hour.
    h.record(bot, 5.0, at(utc(2024, 11, 3, 6, 20))).await?;

    let trends = h
        .statistics
        .get_hourly_trends(bot, utc(2024, 11, 3, 0, 0), utc(2024, 11, 3, 23, 59))
        .await?;

    assert_eq!(trends.len(), 2);
    assert_eq!(trends[0].hour, utc(2024, 11, 3, 5, 0));
    assert_eq!(trends[0].request_count, 2);
    assert_eq!(trends[0].average_response_time, 2.0);
    assert_eq!(trends[1].hour, utc(2024, 11, 3, 6, 0));
    assert_eq!(trends[1].request_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_hourly_trends_rejects_inverted_range() {
    let h = Harness::new();
    let result = h
        .statistics
        .get_hourly_trends(Uuid::new_v4(), utc(2025, 3, 2, 0, 0), utc(2025, 3, 1, 0, 0))
        .await;
    assert!(matches!(result, Err(Error::Validation(_))));
}
