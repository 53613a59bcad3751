//! Meta Ad Library, reached through the SearchApi search API.

pub mod normalize;
pub mod types;

use adlens_core::{AppConfig, Platform, ScrapeBatch};
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};

use crate::client::{build_http_client, get_search_json, parse_base_url, HttpSettings};
use crate::error::ScraperError;
use crate::source::AdSource;

pub use normalize::normalize_meta_response;
pub use types::{MetaAd, MetaAdsResponse, MetaImage, MetaPageInfo, MetaSnapshot};

pub const DEFAULT_SEARCHAPI_BASE_URL: &str = "https://www.searchapi.io/api/v1/search";

const ENGINE: &str = "meta_ad_library";

/// Client for page lookups in the ad library.
///
/// Requests always use `active_status=all`, so one call returns both
/// running and finished ads.
pub struct MetaAdsClient {
    client: Client,
    settings: HttpSettings,
    api_key: String,
    base_url: Url,
}

impl MetaAdsClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ScraperError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(api_key: &str, base_url: &str, settings: HttpSettings) -> Result<Self, ScraperError> {
        Ok(Self {
            client: build_http_client(&settings)?,
            base_url: parse_base_url(base_url)?,
            settings,
            api_key: api_key.to_owned(),
        })
    }

    /// # Errors
    ///
    /// See [`MetaAdsClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            &config.searchapi_api_key,
            &config.searchapi_base_url,
            HttpSettings::from_app_config(config),
        )
    }

    fn page_url(&self, page_id: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("engine", ENGINE)
            .append_pair("page_id", page_id)
            .append_pair("active_status", "all")
            .append_pair("api_key", &self.api_key);
        url
    }

    /// Fetches the raw ad list and page info for one page.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Upstream`] if the body carries an `error` field.
    /// - [`ScraperError::UnexpectedStatus`] on other non-2xx answers.
    /// - [`ScraperError::Http`] on network failure or timeout.
    /// - [`ScraperError::Deserialize`] if the body does not match the shape.
    pub async fn fetch_page(&self, page_id: &str) -> Result<MetaAdsResponse, ScraperError> {
        let url = self.page_url(page_id);
        let body = get_search_json(&self.client, &self.settings, &url, page_id).await?;

        serde_json::from_value(body).map_err(|source| ScraperError::Deserialize {
            context: format!("meta ads for page {page_id}"),
            source,
        })
    }
}

impl AdSource for MetaAdsClient {
    fn platform(&self) -> Platform {
        Platform::Meta
    }

    async fn fetch_batch(
        &self,
        target_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ScrapeBatch, ScraperError> {
        let response = self.fetch_page(target_id).await?;
        tracing::info!(
            platform = "meta",
            target_id,
            ads = response.ads.len(),
            "fetched page ads"
        );
        Ok(normalize_meta_response(target_id, response, now))
    }
}
