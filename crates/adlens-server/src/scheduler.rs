//! Background job scheduler.
//!
//! When `ADLENS_SCRAPE_CRON` is set, one job scrapes both platforms' default
//! targets on that schedule, Google first.

use adlens_core::Platform;
use adlens_pipeline::{resolve_targets, run_ingest, IngestReport, TriggerSource};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::AppState;

/// Builds and starts the scheduler with the scrape job registered.
///
/// The returned handle must be kept alive for the lifetime of the process;
/// dropping it stops the job.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if `schedule` is not a valid cron
/// expression or the scheduler fails to start.
pub async fn build_scheduler(
    state: AppState,
    schedule: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let state = state.clone();
        Box::pin(async move {
            tracing::info!("scheduler: starting scrape run");
            run_scheduled_scrape(&state).await;
            tracing::info!("scheduler: scrape run complete");
        })
    })?;
    scheduler.add(job).await?;

    scheduler.start().await?;
    tracing::info!(schedule, "scheduler: scrape job registered");
    Ok(scheduler)
}

async fn run_scheduled_scrape(state: &AppState) {
    let google = run_ingest(
        &state.pool,
        state.google.as_ref(),
        &state.assets,
        &resolve_targets(None, Platform::Google),
        TriggerSource::Scheduler,
    )
    .await;
    log_report(&google);

    let meta = run_ingest(
        &state.pool,
        state.meta.as_ref(),
        &state.assets,
        &resolve_targets(None, Platform::Meta),
        TriggerSource::Scheduler,
    )
    .await;
    log_report(&meta);
}

fn log_report(report: &IngestReport) {
    if report.all_failed() {
        tracing::error!(
            platform = %report.platform,
            targets = report.outcomes.len(),
            "scheduler: every target failed"
        );
    } else {
        tracing::info!(
            platform = %report.platform,
            targets = report.outcomes.len(),
            failed = report.targets_failed(),
            ads = report.ads_upserted(),
            "scheduler: platform scraped"
        );
    }
}
