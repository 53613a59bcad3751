//! Command handlers. Results go to stdout as pretty JSON; logs go to stderr.

use adlens_core::{AppConfig, Platform};
use adlens_pipeline::{resolve_targets, run_ingest, IngestReport, TriggerSource};
use adlens_scraper::{AdSource, AssetStore, GoogleAdsClient, MetaAdsClient};
use serde_json::json;
use sqlx::PgPool;

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) async fn run_migrate(pool: &PgPool) -> anyhow::Result<()> {
    let applied = adlens_db::run_migrations(pool).await?;
    print_json(&json!({ "applied": applied }))
}

pub(crate) async fn run_scrape_google(
    pool: &PgPool,
    config: &AppConfig,
    ids: Vec<String>,
) -> anyhow::Result<()> {
    let client = GoogleAdsClient::from_app_config(config)?;
    scrape(pool, config, &client, ids).await
}

pub(crate) async fn run_scrape_meta(
    pool: &PgPool,
    config: &AppConfig,
    ids: Vec<String>,
) -> anyhow::Result<()> {
    let client = MetaAdsClient::from_app_config(config)?;
    scrape(pool, config, &client, ids).await
}

async fn scrape<S: AdSource>(
    pool: &PgPool,
    config: &AppConfig,
    source: &S,
    ids: Vec<String>,
) -> anyhow::Result<()> {
    let assets = AssetStore::from_app_config(config)?;
    let targets = cli_targets(ids, source.platform());

    let report = run_ingest(pool, source, &assets, &targets, TriggerSource::Cli).await;
    print_json(&report_json(&report))?;

    if report.all_failed() {
        anyhow::bail!("every {} target failed", report.platform);
    }
    Ok(())
}

/// No `--id` flags means the platform default, not an empty run.
fn cli_targets(ids: Vec<String>, platform: Platform) -> Vec<String> {
    let requested = if ids.is_empty() { None } else { Some(ids) };
    resolve_targets(requested, platform)
}

fn report_json(report: &IngestReport) -> serde_json::Value {
    json!({
        "platform": report.platform,
        "run_id": report.run_id,
        "message": report.message(),
        "targets_failed": report.targets_failed(),
        "ads_upserted": report.ads_upserted(),
        "results": report.outcomes,
    })
}

pub(crate) async fn run_ads_list(pool: &PgPool) -> anyhow::Result<()> {
    let ads = adlens_pipeline::fetch_ads(pool).await?;
    tracing::info!(count = ads.len(), "ads loaded");
    print_json(&ads)
}

pub(crate) async fn run_ads_show(pool: &PgPool, id: &str) -> anyhow::Result<()> {
    let ad = adlens_pipeline::fetch_ad_by_id(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("ad '{id}' not found"))?;
    print_json(&ad)
}

pub(crate) async fn run_advertiser_summary(pool: &PgPool, id: &str) -> anyhow::Result<()> {
    let advertiser = adlens_db::get_advertiser(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("advertiser '{id}' not found"))?;
    let stats = adlens_db::get_advertiser_stats(pool, id).await?;
    let months = adlens_db::list_advertiser_monthly_starts(pool, id).await?;

    print_json(&json!({
        "advertiser": {
            "id": advertiser.id,
            "platform": adlens_core::platform_label(advertiser.platform_id),
            "name": advertiser.name,
            "metadata": advertiser.metadata,
        },
        "stats": {
            "total_ads": stats.total_ads,
            "active_ads": stats.active_ads,
            "inactive_ads": stats.inactive_ads,
            "average_duration_days": stats.average_duration_days,
            "first_start_date": stats.first_start_date,
            "last_end_date": stats.last_end_date,
        },
        "monthly_starts": months
            .iter()
            .map(|m| json!({ "month": m.month, "ads": m.ads }))
            .collect::<Vec<_>>(),
    }))
}
