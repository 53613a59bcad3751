//! The flattened ad record consumed by the gallery and detail views.

use adlens_core::{platform_label, CreativeKind};
use adlens_db::{AdListingRow, CreativeRow};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

/// Shown when an ad has no stored image.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.jpg";

const UNKNOWN_ADVERTISER: &str = "Unknown";

/// One ad joined with its advertiser and creatives.
///
/// Optional display fields degrade to `""` rather than failing; only body
/// text and call to action are omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdView {
    pub id: String,
    /// First image, or [`PLACEHOLDER_IMAGE`].
    pub image_url: String,
    pub advertiser: String,
    /// `"Google Ads"` or `"Meta Ads"`.
    pub platform: String,
    pub start_date: String,
    pub end_date: String,
    /// `"active"` or `"inactive"`.
    pub status: String,
    /// `"image"`, `"video"` or `"text"`.
    pub ad_type: String,
    pub images: Vec<String>,
    pub headline: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<String>,
    pub cta_link: String,
    pub placement: String,
    pub first_seen: String,
    pub last_seen: String,
    pub transparency_url: String,
}

/// Builds the view for one ad. `creatives` must belong to `row` and be in
/// insertion order; the first image, body text and CTA win.
#[must_use]
pub fn assemble_ad_view(row: &AdListingRow, creatives: &[CreativeRow]) -> AdView {
    let images: Vec<String> = creatives_of(creatives, CreativeKind::Image)
        .map(|c| c.content.clone())
        .collect();
    let body_text = creatives_of(creatives, CreativeKind::BodyText)
        .next()
        .map(|c| c.content.clone());
    let call_to_action = creatives_of(creatives, CreativeKind::Cta)
        .next()
        .map(|c| c.content.clone());

    let metadata = row.metadata.as_ref();
    let start_date = format_date(row.start_date);
    let end_date = format_date(row.end_date);

    let transparency_url = metadata_str(metadata, "transparency_url")
        .or_else(|| metadata_str(metadata, "details_link"))
        .unwrap_or_default();

    AdView {
        id: row.id.clone(),
        image_url: images
            .first()
            .cloned()
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
        advertiser: row
            .advertiser_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_ADVERTISER.to_owned()),
        platform: platform_label(row.advertiser_platform_id.unwrap_or_default()).to_owned(),
        first_seen: start_date.clone(),
        last_seen: end_date.clone(),
        start_date,
        end_date,
        status: if row.is_active { "active" } else { "inactive" }.to_owned(),
        ad_type: display_ad_type(&row.ad_type).to_owned(),
        images,
        headline: metadata_str(metadata, "headline").unwrap_or_default(),
        description: metadata_str(metadata, "description").unwrap_or_default(),
        body_text,
        call_to_action,
        cta_link: metadata_str(metadata, "cta_link").unwrap_or_default(),
        placement: metadata_str(metadata, "placement").unwrap_or_default(),
        transparency_url,
    }
}

/// Collapses upstream formats to the three gallery types.
#[must_use]
pub fn display_ad_type(stored: &str) -> &'static str {
    if stored.eq_ignore_ascii_case("image") {
        "image"
    } else if stored.eq_ignore_ascii_case("video") {
        "video"
    } else {
        "text"
    }
}

fn creatives_of(creatives: &[CreativeRow], kind: CreativeKind) -> impl Iterator<Item = &CreativeRow> {
    creatives
        .iter()
        .filter(move |c| CreativeKind::from_db(&c.creative_type) == Some(kind))
}

fn metadata_str(metadata: Option<&Value>, key: &str) -> Option<String> {
    metadata
        .and_then(|m| m.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn format_date(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
