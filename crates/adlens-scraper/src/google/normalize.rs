//! Normalization from the Google transparency-center shape to a [`ScrapeBatch`].
//!
//! Google reports no activity flag, so an ad counts as active when it was
//! last shown less than seven days before the scrape.

use adlens_core::{NormalizedAd, NormalizedAdvertiser, NormalizedImage, Platform, ScrapeBatch};
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::dates::{from_unix_seconds, ordered};
use crate::google::types::{GoogleAdCreative, GoogleAdsResponse};

/// Seven days in seconds.
pub const ACTIVE_WINDOW_SECS: i64 = 7 * 24 * 60 * 60;

const UNKNOWN_ADVERTISER: &str = "Unknown";

/// `true` when `last_shown` lies strictly within [`ACTIVE_WINDOW_SECS`] of `now`.
#[must_use]
pub fn is_recently_shown(last_shown: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    (now - last_shown).num_seconds() < ACTIVE_WINDOW_SECS
}

/// Normalizes one advertiser's response.
///
/// The advertiser is always present: its name comes from the first creative
/// and falls back to `"Unknown"` for an empty batch. Creatives without an
/// `ad_creative_id` are dropped.
#[must_use]
pub fn normalize_google_response(
    target_id: &str,
    response: GoogleAdsResponse,
    now: DateTime<Utc>,
) -> ScrapeBatch {
    let name = response
        .ad_creatives
        .first()
        .and_then(|creative| creative.advertiser.clone())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ADVERTISER.to_owned());

    let advertiser = NormalizedAdvertiser {
        source_id: target_id.to_owned(),
        platform: Platform::Google,
        name,
        metadata: json!({}),
    };

    let ads = response
        .ad_creatives
        .into_iter()
        .filter_map(|creative| normalize_creative(target_id, creative, now))
        .collect();

    ScrapeBatch {
        platform: Platform::Google,
        target_id: target_id.to_owned(),
        advertiser: Some(advertiser),
        ads,
    }
}

fn normalize_creative(
    target_id: &str,
    creative: GoogleAdCreative,
    now: DateTime<Utc>,
) -> Option<NormalizedAd> {
    let Some(source_id) = creative.ad_creative_id.filter(|id| !id.is_empty()) else {
        tracing::warn!(
            platform = "google",
            target_id,
            "skipping ad creative without ad_creative_id"
        );
        return None;
    };

    let now_secs = now.timestamp();
    let first_shown = creative
        .first_shown
        .or(creative.last_shown)
        .unwrap_or(now_secs);
    let last_shown = creative.last_shown.or(creative.first_shown).unwrap_or(now_secs);

    let first_at = from_unix_seconds(first_shown).unwrap_or(now);
    let last_at = from_unix_seconds(last_shown).unwrap_or(now);
    let is_active = is_recently_shown(last_at, now);

    let (start_date, end_date, swapped) = ordered(first_at, last_at);
    if swapped {
        tracing::warn!(
            platform = "google",
            target_id,
            ad_id = %source_id,
            "first_shown is after last_shown; swapping dates"
        );
    }

    let metadata = match creative.details_link {
        Some(link) => json!({ "details_link": link }),
        None => json!({}),
    };

    let images = creative
        .image
        .filter(|url| !url.is_empty())
        .map(|url| NormalizedImage {
            index: 0,
            url,
            width: creative.width,
            height: creative.height,
        })
        .into_iter()
        .collect();

    Some(NormalizedAd {
        source_id,
        ad_type: creative.format.unwrap_or_else(|| "unknown".to_owned()),
        start_date,
        end_date,
        is_active,
        total_active_time: last_shown.saturating_sub(first_shown),
        metadata,
        body_text: None,
        cta: None,
        images,
    })
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
