//! Response types for the `meta_ad_library` search engine.
//!
//! Dates arrive in several encodings depending on the ad's age, so they are
//! kept as raw JSON and parsed in [`crate::dates`]. Page statistics are
//! passed through untouched.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct MetaAdsResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "crate::wire::null_as_empty")]
    pub ads: Vec<MetaAd>,
    #[serde(default)]
    pub search_information: Option<MetaSearchInformation>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MetaSearchInformation {
    #[serde(default)]
    pub ad_library_page_info: Option<MetaPageInfo>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MetaPageInfo {
    #[serde(default)]
    pub page_name: Option<String>,
    #[serde(default)]
    pub page_verification: Option<Value>,
    #[serde(default)]
    pub likes: Option<Value>,
    #[serde(default)]
    pub ig_username: Option<Value>,
    #[serde(default)]
    pub ig_followers: Option<Value>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MetaAd {
    #[serde(default)]
    pub ad_archive_id: Option<String>,
    /// Authoritative; absent means inactive.
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Seconds.
    #[serde(default)]
    pub total_active_time: Option<i64>,
    #[serde(default)]
    pub start_date: Option<Value>,
    #[serde(default)]
    pub end_date: Option<Value>,
    /// e.g. `["facebook", "instagram"]`.
    #[serde(default, deserialize_with = "crate::wire::null_as_empty")]
    pub publisher_platform: Vec<String>,
    #[serde(default)]
    pub categories: Option<Value>,
    #[serde(default)]
    pub snapshot: Option<MetaSnapshot>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MetaSnapshot {
    /// `"IMAGE"`, `"VIDEO"`, `"DCO"`, ...
    #[serde(default)]
    pub display_format: Option<String>,
    #[serde(default)]
    pub body: Option<MetaBody>,
    #[serde(default)]
    pub cta_text: Option<String>,
    #[serde(default)]
    pub cta_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link_description: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default, deserialize_with = "crate::wire::null_as_empty")]
    pub images: Vec<MetaImage>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MetaBody {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MetaImage {
    #[serde(default)]
    pub original_image_url: Option<String>,
    #[serde(default)]
    pub resized_image_url: Option<String>,
}
