//! Database operations for the `ads` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use adlens_core::NormalizedAd;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// The mutable state of one `ads` row, as written by [`upsert_ad`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdStateRow {
    pub id: String,
    pub advertiser_id: String,
    pub ad_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    /// Seconds.
    pub total_active_time: i64,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An ad joined with its owning advertiser, as the read path consumes it.
///
/// Advertiser columns are optional so a dangling reference never fails the join.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdListingRow {
    pub id: String,
    pub advertiser_id: String,
    pub ad_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub total_active_time: i64,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub advertiser_name: Option<String>,
    pub advertiser_platform_id: Option<i16>,
}

const LISTING_SELECT: &str = "SELECT a.id, a.advertiser_id, a.ad_type, a.start_date, a.end_date, \
            a.is_active, a.total_active_time, a.metadata, a.created_at, \
            adv.name AS advertiser_name, adv.platform_id AS advertiser_platform_id \
     FROM ads a \
     LEFT JOIN advertisers adv ON adv.id = a.advertiser_id";

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Upserts an ad keyed by its platform-assigned id.
///
/// Conflicts on `id` fully replace the mutable fields: owning advertiser,
/// `ad_type`, both dates, `is_active`, `total_active_time` and `metadata`.
/// `created_at` is preserved, so re-scraped ads keep their listing position.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails (including a missing
/// advertiser row, which violates the foreign key).
pub async fn upsert_ad(
    pool: &PgPool,
    advertiser_id: &str,
    ad: &NormalizedAd,
) -> Result<AdStateRow, DbError> {
    let row = sqlx::query_as::<_, AdStateRow>(
        "INSERT INTO ads \
             (id, advertiser_id, ad_type, start_date, end_date, is_active, \
              total_active_time, metadata) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (id) DO UPDATE SET \
             advertiser_id     = EXCLUDED.advertiser_id, \
             ad_type           = EXCLUDED.ad_type, \
             start_date        = EXCLUDED.start_date, \
             end_date          = EXCLUDED.end_date, \
             is_active         = EXCLUDED.is_active, \
             total_active_time = EXCLUDED.total_active_time, \
             metadata          = EXCLUDED.metadata, \
             updated_at        = NOW() \
         RETURNING id, advertiser_id, ad_type, start_date, end_date, is_active, \
                   total_active_time, metadata, created_at, updated_at",
    )
    .bind(&ad.source_id)
    .bind(advertiser_id)
    .bind(&ad.ad_type)
    .bind(ad.start_date)
    .bind(ad.end_date)
    .bind(ad.is_active)
    .bind(ad.total_active_time)
    .bind(&ad.metadata)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Returns the stored state of one ad, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_ad_state(pool: &PgPool, id: &str) -> Result<Option<AdStateRow>, DbError> {
    let row = sqlx::query_as::<_, AdStateRow>(
        "SELECT id, advertiser_id, ad_type, start_date, end_date, is_active, \
                total_active_time, metadata, created_at, updated_at \
         FROM ads \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns every ad joined with its advertiser, most recently ingested first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_ad_rows(pool: &PgPool) -> Result<Vec<AdListingRow>, DbError> {
    let sql = format!("{LISTING_SELECT} ORDER BY a.created_at DESC, a.id");
    let rows = sqlx::query_as::<_, AdListingRow>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Returns one ad joined with its advertiser, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_ad_row(pool: &PgPool, id: &str) -> Result<Option<AdListingRow>, DbError> {
    let sql = format!("{LISTING_SELECT} WHERE a.id = $1");
    let row = sqlx::query_as::<_, AdListingRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}
