//! Response types for the `google_ads_transparency_center` search engine.
//!
//! Every field is optional on the wire. `first_shown`/`last_shown` are UNIX
//! seconds. `format` is usually `"text"`, `"image"` or `"video"`.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct GoogleAdsResponse {
    /// Present instead of results when the upstream rejects the request.
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "crate::wire::null_as_empty")]
    pub ad_creatives: Vec<GoogleAdCreative>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct GoogleAdCreative {
    #[serde(default)]
    pub advertiser_id: Option<String>,
    /// Advertiser display name.
    #[serde(default)]
    pub advertiser: Option<String>,
    #[serde(default)]
    pub ad_creative_id: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
    #[serde(default)]
    pub first_shown: Option<i64>,
    #[serde(default)]
    pub last_shown: Option<i64>,
    #[serde(default)]
    pub details_link: Option<String>,
}
