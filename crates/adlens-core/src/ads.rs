//! Shared record shapes for advertisers, ads, and creatives.
//!
//! Platform adapters produce a [`ScrapeBatch`] per target identifier; the
//! ingestion pipeline persists it without knowing which platform it came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric id stored in `advertisers.platform_id` for Google Ads.
pub const GOOGLE_PLATFORM_ID: i16 = 1;
/// Numeric id stored in `advertisers.platform_id` for Meta Ads.
pub const META_PLATFORM_ID: i16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Google,
    Meta,
}

impl Platform {
    #[must_use]
    pub fn platform_id(self) -> i16 {
        match self {
            Platform::Google => GOOGLE_PLATFORM_ID,
            Platform::Meta => META_PLATFORM_ID,
        }
    }

    #[must_use]
    pub fn from_platform_id(id: i16) -> Option<Self> {
        match id {
            GOOGLE_PLATFORM_ID => Some(Platform::Google),
            META_PLATFORM_ID => Some(Platform::Meta),
            _ => None,
        }
    }

    /// Lowercase slug, also used as the object-storage prefix.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Google => "google",
            Platform::Meta => "meta",
        }
    }

    /// Identifier scraped when a request names no targets.
    ///
    /// Google: Tesla's transparency-center advertiser id. Meta: the SNIPES USA page.
    #[must_use]
    pub fn default_target_id(self) -> &'static str {
        match self {
            Platform::Google => "AR17828074650563772417",
            Platform::Meta => "80379486838",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display label for a stored `platform_id`.
///
/// Closed two-platform mapping: `1` is Google and everything else is Meta.
/// A third platform needs this widened.
#[must_use]
pub fn platform_label(platform_id: i16) -> &'static str {
    if platform_id == GOOGLE_PLATFORM_ID {
        "Google Ads"
    } else {
        "Meta Ads"
    }
}

/// Kind of content stored in an `ad_creatives` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreativeKind {
    Image,
    BodyText,
    Cta,
}

impl CreativeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CreativeKind::Image => "image",
            CreativeKind::BodyText => "body_text",
            CreativeKind::Cta => "cta",
        }
    }

    /// Parses the `creative_type` column. Unknown values yield `None`.
    #[must_use]
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "image" => Some(CreativeKind::Image),
            "body_text" => Some(CreativeKind::BodyText),
            "cta" => Some(CreativeKind::Cta),
            _ => None,
        }
    }
}

impl std::fmt::Display for CreativeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An advertiser (brand or page) as reported by an upstream archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedAdvertiser {
    /// Platform-assigned identifier (`AR…` for Google, numeric page id for Meta).
    pub source_id: String,
    pub platform: Platform,
    pub name: String,
    /// Platform-specific extras such as follower counts or verification flags.
    pub metadata: serde_json::Value,
}

/// One ad normalized from either upstream shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedAd {
    /// Platform-assigned creative id (Google) or archive id (Meta).
    pub source_id: String,
    /// Raw upstream format string, e.g. `"image"`, `"VIDEO"`, or `"unknown"`.
    pub ad_type: String,
    /// First time the campaign was seen. Always `<= end_date`.
    pub start_date: DateTime<Utc>,
    /// Last time the campaign was seen.
    pub end_date: DateTime<Utc>,
    /// Snapshot taken at scrape time; never recomputed afterwards.
    pub is_active: bool,
    /// Total active duration in seconds.
    pub total_active_time: i64,
    pub metadata: serde_json::Value,
    pub body_text: Option<String>,
    pub cta: Option<NormalizedCta>,
    /// Images in upstream order. The first one becomes the display image.
    pub images: Vec<NormalizedImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedCta {
    pub text: String,
    pub cta_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedImage {
    /// Zero-based position in the upstream image list.
    pub index: usize,
    pub url: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

/// Everything one upstream call returned for one target identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeBatch {
    pub platform: Platform,
    pub target_id: String,
    /// `None` when the upstream response carried no advertiser information;
    /// the advertiser upsert is skipped in that case.
    pub advertiser: Option<NormalizedAdvertiser>,
    pub ads: Vec<NormalizedAd>,
}

impl ScrapeBatch {
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.ads.iter().map(|ad| ad.images.len()).sum()
    }
}

#[cfg(test)]
#[path = "ads_test.rs"]
mod tests;
