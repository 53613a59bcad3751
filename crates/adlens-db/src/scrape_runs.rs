//! Database operations for `scrape_runs`.
//!
//! One row per ingestion invocation: `queued → running → succeeded | failed`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const RUN_COLUMNS: &str = "id, public_id, platform, trigger_source, status, started_at, \
     completed_at, targets_total, targets_failed, ads_processed, error_message, created_at";

/// A row from the `scrape_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScrapeRunRow {
    pub id: i64,
    pub public_id: Uuid,
    /// `"google"` or `"meta"`.
    pub platform: String,
    /// `"api"`, `"cli"` or `"scheduler"`.
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub targets_total: i32,
    pub targets_failed: i32,
    pub ads_processed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Counts recorded when a run finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeRunTotals {
    pub targets_total: i32,
    pub targets_failed: i32,
    pub ads_processed: i32,
}

/// Creates a new scrape run in `queued` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_scrape_run(
    pool: &PgPool,
    platform: &str,
    trigger_source: &str,
) -> Result<ScrapeRunRow, DbError> {
    let sql = format!(
        "INSERT INTO scrape_runs (public_id, platform, trigger_source, status) \
         VALUES ($1, $2, $3, 'queued') \
         RETURNING {RUN_COLUMNS}"
    );
    let row = sqlx::query_as::<_, ScrapeRunRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(platform)
        .bind(trigger_source)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidScrapeRunTransition`] if the run is not
/// `queued`, or [`DbError::Sqlx`] if the update fails.
pub async fn start_scrape_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scrape_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidScrapeRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `succeeded` and records its totals.
///
/// # Errors
///
/// Returns [`DbError::InvalidScrapeRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_scrape_run(
    pool: &PgPool,
    id: i64,
    totals: ScrapeRunTotals,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scrape_runs \
         SET status = 'succeeded', completed_at = NOW(), \
             targets_total = $1, targets_failed = $2, ads_processed = $3 \
         WHERE id = $4 AND status = 'running'",
    )
    .bind(totals.targets_total)
    .bind(totals.targets_failed)
    .bind(totals.ads_processed)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidScrapeRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed`, records its totals and `error_message`.
///
/// # Errors
///
/// Returns [`DbError::InvalidScrapeRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_scrape_run(
    pool: &PgPool,
    id: i64,
    totals: ScrapeRunTotals,
    error_message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scrape_runs \
         SET status = 'failed', completed_at = NOW(), \
             targets_total = $1, targets_failed = $2, ads_processed = $3, \
             error_message = $4 \
         WHERE id = $5 AND status = 'running'",
    )
    .bind(totals.targets_total)
    .bind(totals.targets_failed)
    .bind(totals.ads_processed)
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidScrapeRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_scrape_run(pool: &PgPool, id: i64) -> Result<ScrapeRunRow, DbError> {
    let sql = format!("SELECT {RUN_COLUMNS} FROM scrape_runs WHERE id = $1");
    let row = sqlx::query_as::<_, ScrapeRunRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_scrape_runs(pool: &PgPool, limit: i64) -> Result<Vec<ScrapeRunRow>, DbError> {
    let sql = format!(
        "SELECT {RUN_COLUMNS} FROM scrape_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    );
    let rows = sqlx::query_as::<_, ScrapeRunRow>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
