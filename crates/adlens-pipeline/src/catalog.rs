//! Read path: ads joined with advertisers, then their creatives.
//!
//! Two sequential queries without a transaction, so an ad can briefly be
//! visible before its creatives are.

use std::collections::HashMap;

use adlens_db::{AdListingRow, CreativeRow, DbError};
use sqlx::PgPool;
use thiserror::Error;

use crate::view::{assemble_ad_view, AdView};

/// The ad store could not be read. Distinct from an empty result.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to load ads: {0}")]
    Store(#[from] DbError),
}

/// Every stored ad, most recently ingested first.
///
/// # Errors
///
/// Returns [`ReadError::Store`] if the ad query fails. A failing creatives
/// query only strips creatives from the result.
pub async fn fetch_ads(pool: &PgPool) -> Result<Vec<AdView>, ReadError> {
    let rows = adlens_db::list_ad_rows(pool).await.map_err(|e| {
        tracing::error!(error = %e, "ad listing query failed");
        e
    })?;

    let ad_ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
    let mut by_ad = group_by_ad(load_creatives(pool, &ad_ids).await);

    Ok(rows
        .iter()
        .map(|row| {
            let creatives = by_ad.remove(&row.id).unwrap_or_default();
            assemble_ad_view(row, &creatives)
        })
        .collect())
}

/// One ad by id, or `None` when it does not exist.
///
/// # Errors
///
/// Same as [`fetch_ads`].
pub async fn fetch_ad_by_id(pool: &PgPool, id: &str) -> Result<Option<AdView>, ReadError> {
    let row: Option<AdListingRow> = adlens_db::get_ad_row(pool, id).await.map_err(|e| {
        tracing::error!(ad_id = id, error = %e, "ad lookup failed");
        e
    })?;

    let Some(row) = row else {
        return Ok(None);
    };

    let creatives = load_creatives(pool, std::slice::from_ref(&row.id)).await;
    Ok(Some(assemble_ad_view(&row, &creatives)))
}

async fn load_creatives(pool: &PgPool, ad_ids: &[String]) -> Vec<CreativeRow> {
    match adlens_db::list_creatives_for_ads(pool, ad_ids).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(ads = ad_ids.len(), error = %e, "creative query failed; returning ads without creatives");
            Vec::new()
        }
    }
}

/// Preserves the per-ad order of `rows`.
fn group_by_ad(rows: Vec<CreativeRow>) -> HashMap<String, Vec<CreativeRow>> {
    let mut grouped: HashMap<String, Vec<CreativeRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.ad_id.clone()).or_default().push(row);
    }
    grouped
}
