//! Live integration tests for adlens-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database. The
//! `migrations` path is relative to `crates/adlens-db/`.

use adlens_core::{CreativeKind, NormalizedAd, NormalizedAdvertiser, Platform};
use adlens_db::{
    complete_scrape_run, count_creatives, create_scrape_run, fail_scrape_run, get_ad_row,
    get_ad_state, get_advertiser, get_advertiser_stats, get_scrape_run, insert_creative,
    list_ad_rows, list_advertiser_monthly_starts, list_advertisers, list_creatives_for_ads,
    list_scrape_runs, start_scrape_run, upsert_ad, upsert_advertiser, DbError, NewCreative,
    ScrapeRunTotals,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("invalid date {y}-{m}-{d}"))
}

fn advertiser(id: &str, platform: Platform, name: &str) -> NormalizedAdvertiser {
    NormalizedAdvertiser {
        source_id: id.to_string(),
        platform,
        name: name.to_string(),
        metadata: json!({}),
    }
}

fn ad(id: &str, start: DateTime<Utc>, end: DateTime<Utc>, is_active: bool) -> NormalizedAd {
    NormalizedAd {
        source_id: id.to_string(),
        ad_type: "image".to_string(),
        start_date: start,
        end_date: end,
        is_active,
        total_active_time: (end - start).num_seconds(),
        metadata: json!({ "details_link": "https://example.com/details" }),
        body_text: None,
        cta: None,
        images: Vec::new(),
    }
}

async fn seed_ad(pool: &sqlx::PgPool, advertiser_id: &str, ad_id: &str) {
    upsert_advertiser(pool, &advertiser(advertiser_id, Platform::Google, "Acme"))
        .await
        .expect("upsert_advertiser failed");
    upsert_ad(pool, advertiser_id, &ad(ad_id, ts(2025, 1, 1), ts(2025, 1, 31), false))
        .await
        .expect("upsert_ad failed");
}

// ---------------------------------------------------------------------------
// Section 1: Advertisers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn advertiser_upsert_is_idempotent_and_keeps_latest_name(pool: sqlx::PgPool) {
    let first = upsert_advertiser(&pool, &advertiser("AR1", Platform::Google, "Old"))
        .await
        .expect("first upsert failed");
    let second = upsert_advertiser(&pool, &advertiser("AR1", Platform::Google, "New"))
        .await
        .expect("second upsert failed");

    assert_eq!(first.id, second.id);
    assert_eq!(first.created_at, second.created_at);
    assert_eq!(second.name, "New");

    let all = list_advertisers(&pool).await.expect("list failed");
    assert_eq!(all.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_advertiser_returns_none_for_unknown_id(pool: sqlx::PgPool) {
    let found = get_advertiser(&pool, "missing").await.expect("query failed");
    assert!(found.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn advertisers_list_orders_by_name(pool: sqlx::PgPool) {
    upsert_advertiser(&pool, &advertiser("2", Platform::Meta, "Zeta"))
        .await
        .expect("upsert failed");
    upsert_advertiser(&pool, &advertiser("1", Platform::Google, "Alpha"))
        .await
        .expect("upsert failed");

    let names: Vec<String> = list_advertisers(&pool)
        .await
        .expect("list failed")
        .into_iter()
        .map(|row| row.name)
        .collect();
    assert_eq!(names, vec!["Alpha", "Zeta"]);
}

// ---------------------------------------------------------------------------
// Section 2: Ads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn ad_upsert_replaces_dates_and_activity(pool: sqlx::PgPool) {
    seed_ad(&pool, "AR1", "C1").await;

    let updated = upsert_ad(&pool, "AR1", &ad("C1", ts(2024, 12, 1), ts(2025, 3, 1), true))
        .await
        .expect("second upsert failed");

    assert_eq!(updated.start_date, ts(2024, 12, 1));
    assert_eq!(updated.end_date, ts(2025, 3, 1));
    assert!(updated.is_active);

    let state = get_ad_state(&pool, "C1")
        .await
        .expect("get_ad_state failed")
        .expect("ad should exist");
    assert_eq!(state.total_active_time, (ts(2025, 3, 1) - ts(2024, 12, 1)).num_seconds());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ads")
        .fetch_one(&pool)
        .await
        .expect("count failed");
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn ad_upsert_without_advertiser_violates_foreign_key(pool: sqlx::PgPool) {
    let result = upsert_ad(&pool, "nobody", &ad("X", ts(2025, 1, 1), ts(2025, 1, 2), true)).await;
    assert!(matches!(result, Err(DbError::Sqlx(_))));
}

#[sqlx::test(migrations = "../../migrations")]
async fn ad_listing_joins_advertiser(pool: sqlx::PgPool) {
    seed_ad(&pool, "AR1", "C1").await;

    let row = get_ad_row(&pool, "C1")
        .await
        .expect("get_ad_row failed")
        .expect("ad should exist");
    assert_eq!(row.advertiser_name.as_deref(), Some("Acme"));
    assert_eq!(row.advertiser_platform_id, Some(1));

    assert!(get_ad_row(&pool, "nope").await.expect("query failed").is_none());
    assert_eq!(list_ad_rows(&pool).await.expect("list failed").len(), 1);
}

// ---------------------------------------------------------------------------
// Section 3: Creatives
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn creatives_accumulate_across_inserts(pool: sqlx::PgPool) {
    seed_ad(&pool, "AR1", "C1").await;

    for _ in 0..2 {
        insert_creative(&pool, &NewCreative::text("C1", CreativeKind::BodyText, "Hello"))
            .await
            .expect("insert_creative failed");
    }

    let body = count_creatives(&pool, "C1", Some(CreativeKind::BodyText))
        .await
        .expect("count failed");
    assert_eq!(body, 2);
    let images = count_creatives(&pool, "C1", Some(CreativeKind::Image))
        .await
        .expect("count failed");
    assert_eq!(images, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn creatives_list_in_insertion_order(pool: sqlx::PgPool) {
    seed_ad(&pool, "AR1", "C1").await;

    for (position, url) in [(2, "https://cdn/b.jpg"), (0, "https://cdn/a.jpg")] {
        insert_creative(
            &pool,
            &NewCreative {
                ad_id: "C1".to_string(),
                kind: CreativeKind::Image,
                content: url.to_string(),
                storage_path: Some(format!("meta/C1_{position}.jpg")),
                width: Some(100),
                height: None,
                position,
                metadata: Some(json!({ "position": position })),
            },
        )
        .await
        .expect("insert_creative failed");
    }

    let rows = list_creatives_for_ads(&pool, &["C1".to_string()])
        .await
        .expect("list failed");
    let urls: Vec<&str> = rows.iter().map(|row| row.content.as_str()).collect();
    assert_eq!(urls, vec!["https://cdn/b.jpg", "https://cdn/a.jpg"]);
    assert!(rows[0].id < rows[1].id);

    let none = list_creatives_for_ads(&pool, &[]).await.expect("empty list failed");
    assert!(none.is_empty());
}

// ---------------------------------------------------------------------------
// Section 4: Analytics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn advertiser_stats_aggregate_counts_and_bounds(pool: sqlx::PgPool) {
    upsert_advertiser(&pool, &advertiser("P1", Platform::Meta, "Shop"))
        .await
        .expect("upsert_advertiser failed");
    // 10, 20 and 20 days: mean 16.67 rounds to 17.
    upsert_ad(&pool, "P1", &ad("A", ts(2025, 1, 1), ts(2025, 1, 11), true))
        .await
        .expect("upsert A failed");
    upsert_ad(&pool, "P1", &ad("B", ts(2025, 1, 20), ts(2025, 2, 9), false))
        .await
        .expect("upsert B failed");
    upsert_ad(&pool, "P1", &ad("C", ts(2025, 3, 5), ts(2025, 3, 25), false))
        .await
        .expect("upsert C failed");

    let stats = get_advertiser_stats(&pool, "P1").await.expect("stats failed");
    assert_eq!(stats.total_ads, 3);
    assert_eq!(stats.active_ads, 1);
    assert_eq!(stats.inactive_ads, 2);
    assert_eq!(stats.average_duration_days, 17);
    assert_eq!(stats.first_start_date, Some(ts(2025, 1, 1)));
    assert_eq!(stats.last_end_date, Some(ts(2025, 3, 25)));

    let months = list_advertiser_monthly_starts(&pool, "P1")
        .await
        .expect("monthly failed");
    let pairs: Vec<(String, i64)> = months.into_iter().map(|m| (m.month, m.ads)).collect();
    assert_eq!(
        pairs,
        vec![("2025-01".to_string(), 2), ("2025-03".to_string(), 1)]
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn advertiser_stats_for_empty_advertiser_are_zero(pool: sqlx::PgPool) {
    let stats = get_advertiser_stats(&pool, "ghost").await.expect("stats failed");
    assert_eq!(stats.total_ads, 0);
    assert_eq!(stats.average_duration_days, 0);
    assert!(stats.first_start_date.is_none());
}

// ---------------------------------------------------------------------------
// Section 5: Scrape Run Lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn scrape_run_lifecycle_queued_to_succeeded(pool: sqlx::PgPool) {
    let run = create_scrape_run(&pool, "google", "cli")
        .await
        .expect("create_scrape_run failed");
    assert_eq!(run.status, "queued");

    start_scrape_run(&pool, run.id).await.expect("start failed");
    let totals = ScrapeRunTotals {
        targets_total: 2,
        targets_failed: 1,
        ads_processed: 7,
    };
    complete_scrape_run(&pool, run.id, totals)
        .await
        .expect("complete failed");

    let fetched = get_scrape_run(&pool, run.id).await.expect("get failed");
    assert_eq!(fetched.status, "succeeded");
    assert!(fetched.started_at.is_some());
    assert!(fetched.completed_at.is_some());
    assert_eq!(fetched.targets_failed, 1);
    assert_eq!(fetched.ads_processed, 7);
}

#[sqlx::test(migrations = "../../migrations")]
async fn scrape_run_lifecycle_queued_to_failed(pool: sqlx::PgPool) {
    let run = create_scrape_run(&pool, "meta", "api")
        .await
        .expect("create_scrape_run failed");
    start_scrape_run(&pool, run.id).await.expect("start failed");
    fail_scrape_run(&pool, run.id, ScrapeRunTotals::default(), "all targets failed")
        .await
        .expect("fail failed");

    let fetched = get_scrape_run(&pool, run.id).await.expect("get failed");
    assert_eq!(fetched.status, "failed");
    assert_eq!(fetched.error_message.as_deref(), Some("all targets failed"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn scrape_run_rejects_invalid_transition(pool: sqlx::PgPool) {
    let run = create_scrape_run(&pool, "google", "scheduler")
        .await
        .expect("create_scrape_run failed");

    let result = complete_scrape_run(&pool, run.id, ScrapeRunTotals::default()).await;
    assert!(matches!(
        result,
        Err(DbError::InvalidScrapeRunTransition {
            expected_status: "running",
            ..
        })
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn scrape_run_get_unknown_is_not_found(pool: sqlx::PgPool) {
    let result = get_scrape_run(&pool, 999_999).await;
    assert!(matches!(result, Err(DbError::NotFound)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn scrape_run_list_respects_limit(pool: sqlx::PgPool) {
    for _ in 0..3 {
        create_scrape_run(&pool, "google", "cli")
            .await
            .expect("create failed");
    }
    let runs = list_scrape_runs(&pool, 2).await.expect("list failed");
    assert_eq!(runs.len(), 2);
    assert!(runs[0].id > runs[1].id);
}
