use chrono::TimeZone;

use super::*;

#[test]
fn platform_ids_round_trip() {
    assert_eq!(Platform::Google.platform_id(), 1);
    assert_eq!(Platform::Meta.platform_id(), 2);
    assert_eq!(Platform::from_platform_id(1), Some(Platform::Google));
    assert_eq!(Platform::from_platform_id(2), Some(Platform::Meta));
    assert_eq!(Platform::from_platform_id(3), None);
}

#[test]
fn platform_label_maps_one_to_google() {
    assert_eq!(platform_label(1), "Google Ads");
}

#[test]
fn platform_label_maps_everything_else_to_meta() {
    assert_eq!(platform_label(2), "Meta Ads");
    assert_eq!(platform_label(0), "Meta Ads");
    assert_eq!(platform_label(99), "Meta Ads");
    assert_eq!(platform_label(-1), "Meta Ads");
}

#[test]
fn default_targets_are_platform_specific() {
    assert_eq!(
        Platform::Google.default_target_id(),
        "AR17828074650563772417"
    );
    assert_eq!(Platform::Meta.default_target_id(), "80379486838");
}

#[test]
fn creative_kind_parses_db_values() {
    for kind in [CreativeKind::Image, CreativeKind::BodyText, CreativeKind::Cta] {
        assert_eq!(CreativeKind::from_db(kind.as_str()), Some(kind));
    }
    assert_eq!(CreativeKind::from_db("video"), None);
}

#[test]
fn creative_kind_serializes_snake_case() {
    let json = serde_json::to_string(&CreativeKind::BodyText).expect("serialize");
    assert_eq!(json, "\"body_text\"");
}

#[test]
fn scrape_batch_counts_images_across_ads() {
    let date = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let ad = |id: &str, images: usize| NormalizedAd {
        source_id: id.to_string(),
        ad_type: "image".to_string(),
        start_date: date,
        end_date: date,
        is_active: false,
        total_active_time: 0,
        metadata: serde_json::json!({}),
        body_text: None,
        cta: None,
        images: (0..images)
            .map(|index| NormalizedImage {
                index,
                url: format!("https://img.example.com/{id}/{index}.jpg"),
                width: None,
                height: None,
            })
            .collect(),
    };

    let batch = ScrapeBatch {
        platform: Platform::Meta,
        target_id: "P1".to_string(),
        advertiser: None,
        ads: vec![ad("A1", 3), ad("A2", 0), ad("A3", 1)],
    };

    assert_eq!(batch.image_count(), 4);
}
