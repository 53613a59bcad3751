//! Transport shared by the search-API adapters and the asset store.

use std::time::Duration;

use adlens_core::AppConfig;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::ScraperError;
use crate::retry::retry_with_backoff;

/// Timeout, identity and retry policy for one upstream HTTP client.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure, for transient errors only.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl HttpSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.scraper_request_timeout_secs,
            user_agent: config.scraper_user_agent.clone(),
            max_retries: config.scraper_max_retries,
            backoff_base_ms: config.scraper_retry_backoff_base_ms,
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "adlens/0.1 (ad-intelligence)".to_owned(),
            max_retries: 2,
            backoff_base_ms: 1_000,
        }
    }
}

/// Builds a `reqwest::Client` with the configured timeouts and `User-Agent`.
pub(crate) fn build_http_client(settings: &HttpSettings) -> Result<Client, ScraperError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(settings.user_agent.as_str())
        .build()?;
    Ok(client)
}

pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ScraperError> {
    Url::parse(base_url).map_err(|e| ScraperError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

/// GETs a search-API URL and returns the decoded JSON body.
///
/// A body carrying an `error` string becomes [`ScraperError::Upstream`],
/// whatever the status code. 5xx answers are retried per `settings`.
pub(crate) async fn get_search_json(
    client: &Client,
    settings: &HttpSettings,
    url: &Url,
    target_id: &str,
) -> Result<Value, ScraperError> {
    retry_with_backoff(settings.max_retries, settings.backoff_base_ms, || async move {
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let redacted = redact_api_key(url);

        if status.is_server_error() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: redacted,
            });
        }

        let text = response.text().await.map_err(reqwest::Error::without_url)?;
        let body = match serde_json::from_str::<Value>(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: redacted,
                });
            }
            Err(source) => {
                return Err(ScraperError::Deserialize {
                    context: format!("search response for {target_id}"),
                    source,
                });
            }
        };

        if let Some(message) = body.get("error").and_then(Value::as_str) {
            return Err(ScraperError::Upstream {
                target_id: target_id.to_owned(),
                message: message.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: redacted,
            });
        }

        Ok(body)
    })
    .await
}

/// `url` without its query string, for errors about URLs we did not build.
pub(crate) fn strip_query(url: &str) -> String {
    url.split(['?', '#']).next().unwrap_or(url).to_owned()
}

/// Renders `url` without its `api_key` query parameter, for error messages.
pub(crate) fn redact_api_key(url: &Url) -> String {
    let mut clean = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "api_key")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    clean.set_query(None);
    if !pairs.is_empty() {
        clean.query_pairs_mut().extend_pairs(pairs);
    }
    clean.to_string()
}
