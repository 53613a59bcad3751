//! Offline tests for adlens-db pool configuration and row types.
//! These tests do not require a live database connection.

use adlens_core::{AppConfig, Environment};
use adlens_db::{PoolConfig, ScrapeRunRow, ScrapeRunTotals};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

fn app_config_with_pool(max: u32, min: u32, acquire: u64) -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        storage_url: "https://storage.example".to_string(),
        storage_service_key: "service-key".to_string(),
        storage_bucket: "ad-images".to_string(),
        serpapi_api_key: "serp".to_string(),
        serpapi_base_url: "https://serpapi.com/search".to_string(),
        searchapi_api_key: "search".to_string(),
        searchapi_base_url: "https://www.searchapi.io/api/v1/search".to_string(),
        google_region: "2840".to_string(),
        db_max_connections: max,
        db_min_connections: min,
        db_acquire_timeout_secs: acquire,
        scraper_request_timeout_secs: 30,
        scraper_user_agent: "ua".to_string(),
        scraper_max_retries: 2,
        scraper_retry_backoff_base_ms: 1000,
        scrape_cron: None,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config_with_pool(42, 7, 9));
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn scrape_run_row_starts_without_timestamps() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = ScrapeRunRow {
        id: 1,
        public_id: Uuid::new_v4(),
        platform: "meta".to_string(),
        trigger_source: "scheduler".to_string(),
        status: "queued".to_string(),
        started_at: None,
        completed_at: None,
        targets_total: 0,
        targets_failed: 0,
        ads_processed: 0,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.platform, "meta");
    assert!(row.started_at.is_none());
    assert!(row.completed_at.is_none());
}

#[test]
fn scrape_run_totals_default_to_zero() {
    let totals = ScrapeRunTotals::default();
    assert_eq!(totals.targets_total, 0);
    assert_eq!(totals.targets_failed, 0);
    assert_eq!(totals.ads_processed, 0);
}
