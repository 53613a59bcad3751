//! Database operations for the `advertisers` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use adlens_core::NormalizedAdvertiser;

use crate::DbError;

/// A row from the `advertisers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdvertiserRow {
    /// Platform-assigned advertiser or page id.
    pub id: String,
    /// `1` = Google, `2` = Meta.
    pub platform_id: i16,
    pub name: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inserts an advertiser or, if the id already exists, replaces its
/// `platform_id`, `name` and `metadata` and bumps `updated_at`.
///
/// `created_at` is preserved across re-scrapes.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_advertiser(
    pool: &PgPool,
    advertiser: &NormalizedAdvertiser,
) -> Result<AdvertiserRow, DbError> {
    let row = sqlx::query_as::<_, AdvertiserRow>(
        "INSERT INTO advertisers (id, platform_id, name, metadata) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (id) DO UPDATE SET \
             platform_id = EXCLUDED.platform_id, \
             name        = EXCLUDED.name, \
             metadata    = EXCLUDED.metadata, \
             updated_at  = NOW() \
         RETURNING id, platform_id, name, metadata, created_at, updated_at",
    )
    .bind(&advertiser.source_id)
    .bind(advertiser.platform.platform_id())
    .bind(&advertiser.name)
    .bind(&advertiser.metadata)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns one advertiser by id, or `None` if it has never been scraped.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_advertiser(pool: &PgPool, id: &str) -> Result<Option<AdvertiserRow>, DbError> {
    let row = sqlx::query_as::<_, AdvertiserRow>(
        "SELECT id, platform_id, name, metadata, created_at, updated_at \
         FROM advertisers \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns every advertiser, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_advertisers(pool: &PgPool) -> Result<Vec<AdvertiserRow>, DbError> {
    let rows = sqlx::query_as::<_, AdvertiserRow>(
        "SELECT id, platform_id, name, metadata, created_at, updated_at \
         FROM advertisers \
         ORDER BY name, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
