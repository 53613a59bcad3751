//! Google Ads Transparency Center, reached through the SerpApi search API.

pub mod normalize;
pub mod types;

use adlens_core::{AppConfig, Platform, ScrapeBatch};
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};

use crate::client::{build_http_client, get_search_json, parse_base_url, HttpSettings};
use crate::error::ScraperError;
use crate::source::AdSource;

pub use normalize::{is_recently_shown, normalize_google_response, ACTIVE_WINDOW_SECS};
pub use types::{GoogleAdCreative, GoogleAdsResponse};

pub const DEFAULT_SERPAPI_BASE_URL: &str = "https://serpapi.com/search";
/// Region code for the United States.
pub const DEFAULT_REGION: &str = "2840";

const ENGINE: &str = "google_ads_transparency_center";

/// Client for advertiser lookups on the transparency center.
///
/// Use [`GoogleAdsClient::new`] with an explicit base URL (a wiremock server
/// in tests) or [`GoogleAdsClient::from_app_config`] in binaries.
pub struct GoogleAdsClient {
    client: Client,
    settings: HttpSettings,
    api_key: String,
    region: String,
    base_url: Url,
}

impl GoogleAdsClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ScraperError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        api_key: &str,
        region: &str,
        base_url: &str,
        settings: HttpSettings,
    ) -> Result<Self, ScraperError> {
        Ok(Self {
            client: build_http_client(&settings)?,
            base_url: parse_base_url(base_url)?,
            settings,
            api_key: api_key.to_owned(),
            region: region.to_owned(),
        })
    }

    /// # Errors
    ///
    /// See [`GoogleAdsClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            &config.serpapi_api_key,
            &config.google_region,
            &config.serpapi_base_url,
            HttpSettings::from_app_config(config),
        )
    }

    fn advertiser_url(&self, advertiser_id: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("engine", ENGINE)
            .append_pair("advertiser_id", advertiser_id)
            .append_pair("region", &self.region)
            .append_pair("api_key", &self.api_key);
        url
    }

    /// Fetches the raw creative list for one advertiser.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Upstream`] if the body carries an `error` field.
    /// - [`ScraperError::UnexpectedStatus`] on other non-2xx answers.
    /// - [`ScraperError::Http`] on network failure or timeout.
    /// - [`ScraperError::Deserialize`] if the body does not match the shape.
    pub async fn fetch_advertiser(
        &self,
        advertiser_id: &str,
    ) -> Result<GoogleAdsResponse, ScraperError> {
        let url = self.advertiser_url(advertiser_id);
        let body = get_search_json(&self.client, &self.settings, &url, advertiser_id).await?;

        serde_json::from_value(body).map_err(|source| ScraperError::Deserialize {
            context: format!("google ads for advertiser {advertiser_id}"),
            source,
        })
    }
}

impl AdSource for GoogleAdsClient {
    fn platform(&self) -> Platform {
        Platform::Google
    }

    async fn fetch_batch(
        &self,
        target_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ScrapeBatch, ScraperError> {
        let response = self.fetch_advertiser(target_id).await?;
        tracing::info!(
            platform = "google",
            target_id,
            creatives = response.ad_creatives.len(),
            "fetched advertiser creatives"
        );
        Ok(normalize_google_response(target_id, response, now))
    }
}
