//! Database operations for the `ad_creatives` table.
//!
//! Creatives are insert-only. There is no natural key that survives a
//! re-scrape, so scraping the same ad twice stores its creatives twice.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use adlens_core::CreativeKind;

use crate::DbError;

/// A row from the `ad_creatives` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CreativeRow {
    /// Insertion sequence; images are displayed in ascending `id` order.
    pub id: i64,
    pub ad_id: String,
    /// `"image"`, `"body_text"` or `"cta"`.
    pub creative_type: String,
    /// Public URL for images, text otherwise.
    pub content: String,
    pub storage_path: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    /// Index in the upstream image list (`0` for text creatives).
    pub position: i32,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Values for a new `ad_creatives` row.
#[derive(Debug, Clone)]
pub struct NewCreative {
    pub ad_id: String,
    pub kind: CreativeKind,
    pub content: String,
    pub storage_path: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub position: i32,
    pub metadata: Option<serde_json::Value>,
}

impl NewCreative {
    /// A text creative (`body_text` or `cta`) with no storage path or dimensions.
    #[must_use]
    pub fn text(ad_id: &str, kind: CreativeKind, content: &str) -> Self {
        Self {
            ad_id: ad_id.to_owned(),
            kind,
            content: content.to_owned(),
            storage_path: None,
            width: None,
            height: None,
            position: 0,
            metadata: None,
        }
    }
}

/// Inserts one creative and returns its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (e.g. the ad does not exist).
pub async fn insert_creative(pool: &PgPool, creative: &NewCreative) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO ad_creatives \
             (ad_id, creative_type, content, storage_path, width, height, position, metadata) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING id",
    )
    .bind(&creative.ad_id)
    .bind(creative.kind.as_str())
    .bind(&creative.content)
    .bind(&creative.storage_path)
    .bind(creative.width)
    .bind(creative.height)
    .bind(creative.position)
    .bind(&creative.metadata)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns all creatives belonging to any of `ad_ids`, ordered by ad and
/// then insertion sequence.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_creatives_for_ads(
    pool: &PgPool,
    ad_ids: &[String],
) -> Result<Vec<CreativeRow>, DbError> {
    if ad_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, CreativeRow>(
        "SELECT id, ad_id, creative_type, content, storage_path, width, height, \
                position, metadata, created_at \
         FROM ad_creatives \
         WHERE ad_id = ANY($1) \
         ORDER BY ad_id, id",
    )
    .bind(ad_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Counts creatives for one ad, optionally restricted to one kind.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_creatives(
    pool: &PgPool,
    ad_id: &str,
    kind: Option<CreativeKind>,
) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) \
         FROM ad_creatives \
         WHERE ad_id = $1 \
           AND ($2::text IS NULL OR creative_type = $2)",
    )
    .bind(ad_id)
    .bind(kind.map(CreativeKind::as_str))
    .fetch_one(pool)
    .await?;

    Ok(count)
}
