//! Normalization from the Meta Ad Library shape to a [`ScrapeBatch`].
//!
//! Unlike Google, Meta's `is_active` and `total_active_time` are taken as
//! reported. Missing snapshot fields are omitted, never fatal.

use adlens_core::{
    NormalizedAd, NormalizedAdvertiser, NormalizedCta, NormalizedImage, Platform, ScrapeBatch,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::dates::{ordered, parse_flexible};
use crate::meta::types::{MetaAd, MetaAdsResponse, MetaImage, MetaPageInfo, MetaSnapshot};

/// Normalizes one page's response.
///
/// The advertiser is `None` when the response has no page info; the
/// pipeline then writes ads against whatever advertiser row already exists.
#[must_use]
pub fn normalize_meta_response(
    target_id: &str,
    response: MetaAdsResponse,
    now: DateTime<Utc>,
) -> ScrapeBatch {
    let advertiser = response
        .search_information
        .and_then(|info| info.ad_library_page_info)
        .map(|page| normalize_page(target_id, page));

    let ads = response
        .ads
        .into_iter()
        .filter_map(|ad| normalize_ad(target_id, ad, now))
        .collect();

    ScrapeBatch {
        platform: Platform::Meta,
        target_id: target_id.to_owned(),
        advertiser,
        ads,
    }
}

fn normalize_page(target_id: &str, page: MetaPageInfo) -> NormalizedAdvertiser {
    let mut metadata = Map::new();
    for (key, value) in [
        ("page_verification", page.page_verification),
        ("likes", page.likes),
        ("ig_username", page.ig_username),
        ("ig_followers", page.ig_followers),
    ] {
        if let Some(value) = value {
            metadata.insert(key.to_owned(), value);
        }
    }

    NormalizedAdvertiser {
        source_id: target_id.to_owned(),
        platform: Platform::Meta,
        name: non_empty(page.page_name).unwrap_or_else(|| "Unknown".to_owned()),
        metadata: Value::Object(metadata),
    }
}

fn normalize_ad(target_id: &str, ad: MetaAd, now: DateTime<Utc>) -> Option<NormalizedAd> {
    let Some(source_id) = non_empty(ad.ad_archive_id) else {
        tracing::warn!(platform = "meta", target_id, "skipping ad without ad_archive_id");
        return None;
    };

    let start = ad.start_date.as_ref().and_then(parse_flexible);
    let end = ad.end_date.as_ref().and_then(parse_flexible);
    let start_at = start.or(end).unwrap_or(now);
    let end_at = end.or(start).unwrap_or(now);
    let (start_date, end_date, swapped) = ordered(start_at, end_at);
    if swapped {
        tracing::warn!(
            platform = "meta",
            target_id,
            ad_id = %source_id,
            "start_date is after end_date; swapping dates"
        );
    }

    let snapshot = ad.snapshot.unwrap_or_default();
    let metadata = ad_metadata(ad.publisher_platform, ad.categories, &snapshot);

    let body_text = snapshot.body.and_then(|body| non_empty(body.text));
    let cta = non_empty(snapshot.cta_text).map(|text| NormalizedCta {
        text,
        cta_type: snapshot.cta_type,
    });
    let images = normalize_images(snapshot.images);

    Some(NormalizedAd {
        source_id,
        ad_type: non_empty(snapshot.display_format).unwrap_or_else(|| "unknown".to_owned()),
        start_date,
        end_date,
        is_active: ad.is_active.unwrap_or(false),
        total_active_time: ad.total_active_time.unwrap_or(0),
        metadata,
        body_text,
        cta,
        images,
    })
}

fn ad_metadata(
    publisher_platform: Vec<String>,
    categories: Option<Value>,
    snapshot: &MetaSnapshot,
) -> Value {
    let mut metadata = Map::new();

    if !publisher_platform.is_empty() {
        metadata.insert(
            "placement".to_owned(),
            Value::String(publisher_platform.join(", ")),
        );
        metadata.insert(
            "publisher_platform".to_owned(),
            Value::from(publisher_platform),
        );
    }
    if let Some(categories) = categories {
        metadata.insert("categories".to_owned(), categories);
    }
    for (key, value) in [
        ("headline", &snapshot.title),
        ("description", &snapshot.link_description),
        ("cta_link", &snapshot.link_url),
    ] {
        if let Some(text) = value.as_deref().filter(|s| !s.is_empty()) {
            metadata.insert(key.to_owned(), Value::String(text.to_owned()));
        }
    }

    Value::Object(metadata)
}

/// Keeps each image's upstream index, even when earlier entries are skipped.
fn normalize_images(images: Vec<MetaImage>) -> Vec<NormalizedImage> {
    images
        .into_iter()
        .enumerate()
        .filter_map(|(index, image)| {
            let url = non_empty(image.original_image_url)
                .or_else(|| non_empty(image.resized_image_url))?;
            Some(NormalizedImage {
                index,
                url,
                width: None,
                height: None,
            })
        })
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
