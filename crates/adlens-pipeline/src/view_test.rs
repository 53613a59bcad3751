use chrono::TimeZone;
use serde_json::json;

use super::*;

fn ts(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).unwrap()
}

fn row(platform_id: Option<i16>, metadata: Option<Value>) -> AdListingRow {
    AdListingRow {
        id: "AD1".to_owned(),
        advertiser_id: "ADV1".to_owned(),
        ad_type: "IMAGE".to_owned(),
        start_date: ts(1),
        end_date: ts(10),
        is_active: true,
        total_active_time: 9 * 86_400,
        metadata,
        created_at: ts(10),
        advertiser_name: Some("Acme".to_owned()),
        advertiser_platform_id: platform_id,
    }
}

fn creative(id: i64, kind: &str, content: &str) -> CreativeRow {
    CreativeRow {
        id,
        ad_id: "AD1".to_owned(),
        creative_type: kind.to_owned(),
        content: content.to_owned(),
        storage_path: None,
        width: None,
        height: None,
        position: 0,
        metadata: None,
        created_at: ts(10),
    }
}

#[test]
fn first_image_becomes_image_url() {
    let creatives = vec![
        creative(1, "image", "https://cdn/first.jpg"),
        creative(2, "body_text", "Hello"),
        creative(3, "image", "https://cdn/second.jpg"),
    ];
    let view = assemble_ad_view(&row(Some(2), None), &creatives);

    assert_eq!(view.image_url, "https://cdn/first.jpg");
    assert_eq!(view.images, vec!["https://cdn/first.jpg", "https://cdn/second.jpg"]);
}

#[test]
fn no_images_uses_placeholder() {
    let view = assemble_ad_view(&row(Some(1), None), &[]);
    assert_eq!(view.image_url, PLACEHOLDER_IMAGE);
    assert!(view.images.is_empty());
}

#[test]
fn platform_label_maps_one_to_google_and_anything_else_to_meta() {
    assert_eq!(assemble_ad_view(&row(Some(1), None), &[]).platform, "Google Ads");
    assert_eq!(assemble_ad_view(&row(Some(2), None), &[]).platform, "Meta Ads");
    assert_eq!(assemble_ad_view(&row(Some(7), None), &[]).platform, "Meta Ads");
    assert_eq!(assemble_ad_view(&row(None, None), &[]).platform, "Meta Ads");
}

#[test]
fn first_body_text_and_cta_win() {
    let creatives = vec![
        creative(1, "body_text", "Older copy"),
        creative(2, "cta", "Shop Now"),
        creative(3, "body_text", "Newer copy"),
        creative(4, "cta", "Learn More"),
    ];
    let view = assemble_ad_view(&row(Some(2), None), &creatives);

    assert_eq!(view.body_text.as_deref(), Some("Older copy"));
    assert_eq!(view.call_to_action.as_deref(), Some("Shop Now"));
}

#[test]
fn metadata_fields_are_read_as_strings_only() {
    let metadata = json!({
        "headline": "Big Sale",
        "description": 42,
        "cta_link": "https://shop",
        "placement": "facebook, instagram",
        "details_link": "https://details"
    });
    let view = assemble_ad_view(&row(Some(2), Some(metadata)), &[]);

    assert_eq!(view.headline, "Big Sale");
    assert_eq!(view.description, "");
    assert_eq!(view.cta_link, "https://shop");
    assert_eq!(view.placement, "facebook, instagram");
    assert_eq!(view.transparency_url, "https://details");
}

#[test]
fn transparency_url_prefers_dedicated_key() {
    let metadata = json!({ "transparency_url": "https://t", "details_link": "https://d" });
    let view = assemble_ad_view(&row(Some(1), Some(metadata)), &[]);
    assert_eq!(view.transparency_url, "https://t");
}

#[test]
fn missing_metadata_degrades_to_empty_strings() {
    let view = assemble_ad_view(&row(Some(1), None), &[]);
    assert_eq!(view.headline, "");
    assert_eq!(view.transparency_url, "");
    assert!(view.body_text.is_none());
    assert!(view.call_to_action.is_none());
}

#[test]
fn status_dates_and_type_are_derived() {
    let mut inactive = row(Some(1), None);
    inactive.is_active = false;
    inactive.ad_type = "Video".to_owned();
    let view = assemble_ad_view(&inactive, &[]);

    assert_eq!(view.status, "inactive");
    assert_eq!(view.ad_type, "video");
    assert_eq!(view.start_date, "2025-01-01T00:00:00Z");
    assert_eq!(view.first_seen, view.start_date);
    assert_eq!(view.last_seen, "2025-01-10T00:00:00Z");
}

#[test]
fn unrecognized_formats_display_as_text() {
    assert_eq!(display_ad_type("DCO"), "text");
    assert_eq!(display_ad_type("unknown"), "text");
    assert_eq!(display_ad_type("image"), "image");
}

#[test]
fn unknown_advertiser_falls_back() {
    let mut orphan = row(None, None);
    orphan.advertiser_name = None;
    assert_eq!(assemble_ad_view(&orphan, &[]).advertiser, "Unknown");
}

#[test]
fn serializes_camel_case_and_omits_absent_text() {
    let value = serde_json::to_value(assemble_ad_view(&row(Some(1), None), &[])).unwrap();

    assert_eq!(value["imageUrl"], PLACEHOLDER_IMAGE);
    assert_eq!(value["adType"], "image");
    assert!(value.get("transparencyUrl").is_some());
    assert!(value.get("bodyText").is_none());
    assert!(value.get("callToAction").is_none());
}
