//! Live integration tests for shopinsight-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. They need `DATABASE_URL` pointing at a server the
//! harness can create databases on, so they are ignored by default:
//!
//! ```text
//! DATABASE_URL=postgres://localhost/postgres cargo test -p shopinsight-db -- --ignored
//! ```

use chrono::{Duration, Utc};
use shopinsight_core::{FailureReason, InsightsRecord};
use shopinsight_db::{
    delete_insights_for_store, get_latest_insights, insert_insights_record, insights_stats,
    list_insights_records, NewInsightsRecord,
};

fn new_record(store_url: &str, processing_time_secs: f64) -> NewInsightsRecord {
    let mut record = InsightsRecord::empty(store_url);
    record.store_name = Some("Test Store".to_string());
    record.processing_time_seconds = processing_time_secs;
    NewInsightsRecord::from_record(&record).expect("record serializes")
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn insert_then_read_latest(pool: sqlx::PgPool) {
    let inserted = insert_insights_record(&pool, &new_record("https://a.example", 1.0))
        .await
        .expect("insert failed");
    assert_eq!(inserted.store_url, "https://a.example");
    assert!(inserted.success);

    let latest = get_latest_insights(&pool, "https://a.example", None)
        .await
        .expect("query failed")
        .expect("record should exist");
    assert_eq!(latest.id, inserted.id);
    assert_eq!(latest.to_record().unwrap().store_url, "https://a.example");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn latest_honours_max_age_and_skips_failures(pool: sqlx::PgPool) {
    let mut stale = new_record("https://b.example", 1.0);
    stale.scraped_at = Utc::now() - Duration::hours(2);
    insert_insights_record(&pool, &stale).await.unwrap();

    let failed = NewInsightsRecord::from_record(&InsightsRecord::rejected(
        "https://b.example",
        FailureReason::Unreachable,
        0.1,
    ))
    .unwrap();
    insert_insights_record(&pool, &failed).await.unwrap();

    let fresh_only = get_latest_insights(&pool, "https://b.example", Some(3600))
        .await
        .unwrap();
    assert!(fresh_only.is_none());

    let any_age = get_latest_insights(&pool, "https://b.example", None)
        .await
        .unwrap()
        .expect("stale success is still the latest success");
    assert!(any_age.success);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn list_is_newest_first_with_paging(pool: sqlx::PgPool) {
    for i in 0..3 {
        insert_insights_record(&pool, &new_record(&format!("https://s{i}.example"), 1.0))
            .await
            .unwrap();
    }

    let first_page = list_insights_records(&pool, 2, 0).await.unwrap();
    assert_eq!(first_page.len(), 2);
    assert_eq!(first_page[0].store_url, "https://s2.example");

    let second_page = list_insights_records(&pool, 2, 2).await.unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].store_url, "https://s0.example");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn delete_removes_only_matching_store(pool: sqlx::PgPool) {
    insert_insights_record(&pool, &new_record("https://c.example", 1.0)).await.unwrap();
    insert_insights_record(&pool, &new_record("https://c.example", 1.0)).await.unwrap();
    insert_insights_record(&pool, &new_record("https://d.example", 1.0)).await.unwrap();

    let deleted = delete_insights_for_store(&pool, "https://c.example").await.unwrap();
    assert_eq!(deleted, 2);

    let remaining = list_insights_records(&pool, 10, 0).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].store_url, "https://d.example");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn stats_count_successes_and_failures(pool: sqlx::PgPool) {
    let empty = insights_stats(&pool).await.unwrap();
    assert_eq!(empty.total_requests, 0);

    insert_insights_record(&pool, &new_record("https://e.example", 2.0)).await.unwrap();
    insert_insights_record(&pool, &new_record("https://f.example", 4.0)).await.unwrap();
    let failed = NewInsightsRecord::from_record(&InsightsRecord::rejected(
        "https://g.example",
        FailureReason::NotShopify,
        0.0,
    ))
    .unwrap();
    insert_insights_record(&pool, &failed).await.unwrap();

    let stats = insights_stats(&pool).await.unwrap();
    assert_eq!(stats.total_requests, 3);
    assert_eq!(stats.successful_requests, 2);
    assert_eq!(stats.failed_requests, 1);
    assert!((stats.average_processing_time_secs - 2.0).abs() < 1e-9);
}
