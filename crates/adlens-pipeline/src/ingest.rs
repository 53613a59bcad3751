//! Persists scrape batches: advertiser upsert, ad upserts, then creatives.
//!
//! Everything runs sequentially. Each target, ad and image is its own unit of
//! work: a failure is logged and counted, and processing moves on. Nothing is
//! rolled back.

use adlens_core::{CreativeKind, NormalizedAd, NormalizedImage, Platform};
use adlens_db::{NewCreative, ScrapeRunTotals};
use adlens_scraper::{storage_path_for, AdSource, AssetStore};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;

const COMPLETED_MESSAGE: &str = "Scraping completed";

/// What started an ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerSource {
    Api,
    Cli,
    Scheduler,
}

impl TriggerSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerSource::Api => "api",
            TriggerSource::Cli => "cli",
            TriggerSource::Scheduler => "scheduler",
        }
    }
}

/// Per-target result returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetOutcome {
    pub target_id: String,
    /// `false` only when the upstream fetch itself failed.
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub ads_seen: usize,
    pub ads_upserted: usize,
    pub ads_failed: usize,
    pub creatives_inserted: usize,
    pub images_failed: usize,
}

impl TargetOutcome {
    fn failed(target_id: &str, error: String) -> Self {
        Self {
            target_id: target_id.to_owned(),
            succeeded: false,
            error: Some(error),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub platform: Platform,
    /// `scrape_runs.id`, when run tracking could be recorded.
    pub run_id: Option<i64>,
    pub outcomes: Vec<TargetOutcome>,
}

impl IngestReport {
    #[must_use]
    pub fn message(&self) -> &'static str {
        COMPLETED_MESSAGE
    }

    #[must_use]
    pub fn targets_failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded).count()
    }

    #[must_use]
    pub fn ads_upserted(&self) -> usize {
        self.outcomes.iter().map(|o| o.ads_upserted).sum()
    }

    /// `true` when there was at least one target and none succeeded.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.targets_failed() == self.outcomes.len()
    }

    fn totals(&self) -> ScrapeRunTotals {
        ScrapeRunTotals {
            targets_total: saturating_i32(self.outcomes.len()),
            targets_failed: saturating_i32(self.targets_failed()),
            ads_processed: saturating_i32(self.ads_upserted()),
        }
    }
}

/// Targets to scrape: the caller's list, or the platform default when none
/// was given. Blank identifiers are dropped; an explicit empty list stays empty.
#[must_use]
pub fn resolve_targets(requested: Option<Vec<String>>, platform: Platform) -> Vec<String> {
    match requested {
        Some(ids) => ids
            .into_iter()
            .map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty())
            .collect(),
        None => vec![platform.default_target_id().to_owned()],
    }
}

/// Scrapes every target in order and persists what comes back.
///
/// Never fails: per-target errors end up in the returned outcomes. A
/// `scrape_runs` row is recorded on a best-effort basis.
pub async fn run_ingest<S: AdSource>(
    pool: &PgPool,
    source: &S,
    assets: &AssetStore,
    targets: &[String],
    trigger: TriggerSource,
) -> IngestReport {
    let platform = source.platform();
    let run_id = begin_run(pool, platform, trigger).await;

    let mut outcomes = Vec::with_capacity(targets.len());
    for target_id in targets {
        tracing::info!(platform = %platform, target_id = %target_id, "scraping target");
        let outcome = ingest_target(pool, source, assets, target_id).await;
        tracing::info!(
            platform = %platform,
            target_id = %target_id,
            succeeded = outcome.succeeded,
            ads_seen = outcome.ads_seen,
            ads_upserted = outcome.ads_upserted,
            ads_failed = outcome.ads_failed,
            images_failed = outcome.images_failed,
            "target processed"
        );
        outcomes.push(outcome);
    }

    let report = IngestReport {
        platform,
        run_id,
        outcomes,
    };

    if report.targets_failed() > 0 {
        tracing::warn!(
            platform = %platform,
            failed_targets = report.targets_failed(),
            total_targets = report.outcomes.len(),
            "some targets failed during ingestion"
        );
    }

    if let Some(id) = run_id {
        finish_run(pool, id, &report).await;
    }

    report
}

async fn ingest_target<S: AdSource>(
    pool: &PgPool,
    source: &S,
    assets: &AssetStore,
    target_id: &str,
) -> TargetOutcome {
    let platform = source.platform();
    let batch = match source.fetch_batch(target_id, Utc::now()).await {
        Ok(batch) => batch,
        Err(e) => {
            tracing::warn!(platform = %platform, target_id, error = %e, "upstream fetch failed");
            return TargetOutcome::failed(target_id, e.to_string());
        }
    };

    if let Some(advertiser) = &batch.advertiser {
        if let Err(e) = adlens_db::upsert_advertiser(pool, advertiser).await {
            tracing::error!(
                platform = %platform,
                target_id,
                error = %e,
                "advertiser upsert failed; continuing with ads"
            );
        }
    }

    let mut outcome = TargetOutcome {
        target_id: target_id.to_owned(),
        succeeded: true,
        ads_seen: batch.ads.len(),
        ..TargetOutcome::default()
    };

    for ad in &batch.ads {
        ingest_ad(pool, assets, platform, target_id, ad, &mut outcome).await;
    }

    outcome
}

async fn ingest_ad(
    pool: &PgPool,
    assets: &AssetStore,
    platform: Platform,
    advertiser_id: &str,
    ad: &NormalizedAd,
    outcome: &mut TargetOutcome,
) {
    let ad_id = ad.source_id.as_str();

    if let Err(e) = adlens_db::upsert_ad(pool, advertiser_id, ad).await {
        tracing::error!(platform = %platform, ad_id, error = %e, "ad upsert failed; skipping its creatives");
        outcome.ads_failed += 1;
        return;
    }
    outcome.ads_upserted += 1;

    if let Some(text) = &ad.body_text {
        let creative = NewCreative::text(ad_id, CreativeKind::BodyText, text);
        insert_text_creative(pool, &creative, outcome).await;
    }

    if let Some(cta) = &ad.cta {
        let mut creative = NewCreative::text(ad_id, CreativeKind::Cta, &cta.text);
        creative.metadata = Some(json!({ "cta_type": cta.cta_type }));
        insert_text_creative(pool, &creative, outcome).await;
    }

    for image in &ad.images {
        if store_image(pool, assets, platform, ad_id, image).await {
            outcome.creatives_inserted += 1;
        } else {
            outcome.images_failed += 1;
        }
    }
}

async fn insert_text_creative(pool: &PgPool, creative: &NewCreative, outcome: &mut TargetOutcome) {
    match adlens_db::insert_creative(pool, creative).await {
        Ok(_) => outcome.creatives_inserted += 1,
        Err(e) => tracing::error!(
            ad_id = %creative.ad_id,
            kind = %creative.kind,
            error = %e,
            "creative insert failed"
        ),
    }
}

/// Copies one image into storage and records it. Returns `false` on any failure.
async fn store_image(
    pool: &PgPool,
    assets: &AssetStore,
    platform: Platform,
    ad_id: &str,
    image: &NormalizedImage,
) -> bool {
    let path = match storage_path_for(platform, ad_id, image.index) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(ad_id, error = %e, "skipping image with unsafe storage key");
            return false;
        }
    };
    let stored = match assets.persist_image(&image.url, &path).await {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!(ad_id, path = %path, error = %e, "image fetch or upload failed");
            return false;
        }
    };

    let creative = NewCreative {
        ad_id: ad_id.to_owned(),
        kind: CreativeKind::Image,
        content: stored.public_url,
        storage_path: Some(stored.storage_path),
        width: image.width,
        height: image.height,
        position: saturating_i32(image.index),
        metadata: None,
    };

    match adlens_db::insert_creative(pool, &creative).await {
        Ok(_) => true,
        Err(e) => {
            tracing::error!(ad_id, path = %path, error = %e, "image creative insert failed");
            false
        }
    }
}

async fn begin_run(pool: &PgPool, platform: Platform, trigger: TriggerSource) -> Option<i64> {
    let run = match adlens_db::create_scrape_run(pool, platform.as_str(), trigger.as_str()).await {
        Ok(run) => run,
        Err(e) => {
            tracing::warn!(platform = %platform, error = %e, "could not record scrape run");
            return None;
        }
    };

    if let Err(e) = adlens_db::start_scrape_run(pool, run.id).await {
        tracing::warn!(run_id = run.id, error = %e, "could not mark scrape run as running");
        return None;
    }

    Some(run.id)
}

async fn finish_run(pool: &PgPool, run_id: i64, report: &IngestReport) {
    let totals = report.totals();
    let result = if report.all_failed() {
        let message = format!("all {} targets failed", report.outcomes.len());
        adlens_db::fail_scrape_run(pool, run_id, totals, &message).await
    } else {
        adlens_db::complete_scrape_run(pool, run_id, totals).await
    };

    if let Err(e) = result {
        tracing::warn!(run_id, error = %e, "could not finalize scrape run");
    }
}

fn saturating_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
