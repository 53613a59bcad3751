//! Copies upstream ad images into the object-storage bucket.
//!
//! Uploads use `x-upsert: true`, so re-scraping an ad overwrites its files
//! instead of failing on conflict.

use adlens_core::{AppConfig, Platform};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;

use crate::client::{build_http_client, parse_base_url, strip_query, HttpSettings};
use crate::error::ScraperError;
use crate::retry::retry_with_backoff;

const FALLBACK_CONTENT_TYPE: &str = "image/jpeg";

/// Where an image ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    /// Path inside the bucket, e.g. `meta/123_0.jpg`.
    pub storage_path: String,
    pub public_url: String,
}

/// Bucket path for an ad image: `google/{ad_id}.jpg` or `meta/{ad_id}_{index}.jpg`.
///
/// Google ads carry at most one image, so `index` is ignored for them.
///
/// # Errors
///
/// Returns [`ScraperError::Asset`] if `ad_id` is empty, contains `..`, or
/// has characters outside ASCII alphanumerics and `-_.`.
pub fn storage_path_for(
    platform: Platform,
    ad_id: &str,
    index: usize,
) -> Result<String, ScraperError> {
    if !is_safe_storage_key(ad_id) {
        return Err(ScraperError::Asset {
            path: ad_id.to_owned(),
            reason: "ad id is not a safe storage key".to_owned(),
        });
    }
    Ok(match platform {
        Platform::Google => format!("google/{ad_id}.jpg"),
        Platform::Meta => format!("meta/{ad_id}_{index}.jpg"),
    })
}

fn is_safe_storage_key(ad_id: &str) -> bool {
    !ad_id.is_empty()
        && !ad_id.contains("..")
        && ad_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

pub struct AssetStore {
    client: Client,
    settings: HttpSettings,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl AssetStore {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ScraperError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        bucket: &str,
        service_key: &str,
        settings: HttpSettings,
    ) -> Result<Self, ScraperError> {
        parse_base_url(base_url)?;
        Ok(Self {
            client: build_http_client(&settings)?,
            settings,
            base_url: base_url.trim_end_matches('/').to_owned(),
            bucket: bucket.to_owned(),
            service_key: service_key.to_owned(),
        })
    }

    /// # Errors
    ///
    /// See [`AssetStore::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            &config.storage_url,
            &config.storage_bucket,
            &config.storage_service_key,
            HttpSettings::from_app_config(config),
        )
    }

    /// Publicly readable URL of an object in the bucket.
    #[must_use]
    pub fn public_url(&self, storage_path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{storage_path}",
            self.base_url, self.bucket
        )
    }

    fn upload_url(&self, storage_path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{storage_path}",
            self.base_url, self.bucket
        )
    }

    /// Downloads `source_url` and uploads the bytes to `storage_path`.
    ///
    /// The upstream `Content-Type` is kept when it is an `image/*` type,
    /// otherwise the object is stored as `image/jpeg`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Asset`] if either side answers with a non-2xx status.
    /// - [`ScraperError::Http`] on network failure or timeout.
    pub async fn persist_image(
        &self,
        source_url: &str,
        storage_path: &str,
    ) -> Result<StoredAsset, ScraperError> {
        let (bytes, content_type) = self.download(source_url, storage_path).await?;

        let upload_url = self.upload_url(storage_path);
        let upload_url = upload_url.as_str();
        let bearer = format!("Bearer {}", self.service_key);
        retry_with_backoff(self.settings.max_retries, self.settings.backoff_base_ms, || {
            let request = self
                .client
                .post(upload_url)
                .header(AUTHORIZATION, &bearer)
                .header("apikey", &self.service_key)
                .header("x-upsert", "true")
                .header(CONTENT_TYPE, &content_type)
                .body(bytes.clone());
            async move {
                let response = request.send().await.map_err(reqwest::Error::without_url)?;
                let status = response.status();
                if status.is_server_error() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: upload_url.to_owned(),
                    });
                }
                if !status.is_success() {
                    return Err(ScraperError::Asset {
                        path: storage_path.to_owned(),
                        reason: format!("upload returned HTTP {}", status.as_u16()),
                    });
                }
                Ok(())
            }
        })
        .await?;

        tracing::debug!(path = storage_path, "stored ad image");

        Ok(StoredAsset {
            storage_path: storage_path.to_owned(),
            public_url: self.public_url(storage_path),
        })
    }

    async fn download(
        &self,
        source_url: &str,
        storage_path: &str,
    ) -> Result<(Vec<u8>, String), ScraperError> {
        retry_with_backoff(self.settings.max_retries, self.settings.backoff_base_ms, || async move {
            let response = self
                .client
                .get(source_url)
                .send()
                .await
                .map_err(reqwest::Error::without_url)?;
            let status = response.status();
            if status.is_server_error() {
                return Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: strip_query(source_url),
                });
            }
            if !status.is_success() {
                return Err(ScraperError::Asset {
                    path: storage_path.to_owned(),
                    reason: format!("image download returned HTTP {}", status.as_u16()),
                });
            }

            let content_type = image_content_type(response.headers().get(CONTENT_TYPE));
            let bytes = response.bytes().await.map_err(reqwest::Error::without_url)?;
            Ok((bytes.to_vec(), content_type))
        })
        .await
    }
}

fn image_content_type(header: Option<&HeaderValue>) -> String {
    header
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| value.starts_with("image/"))
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_paths_are_platform_prefixed() {
        assert_eq!(
            storage_path_for(Platform::Google, "CR-01_a.b", 3).unwrap(),
            "google/CR-01_a.b.jpg"
        );
        assert_eq!(storage_path_for(Platform::Meta, "A1", 2).unwrap(), "meta/A1_2.jpg");
    }

    #[test]
    fn unsafe_ad_ids_are_rejected() {
        for id in ["", "../x", "a/b", "a?b", "a%2Fb", "a b", "..", "é"] {
            let err = storage_path_for(Platform::Meta, id, 0).unwrap_err();
            assert!(
                matches!(err, ScraperError::Asset { ref path, .. } if path == id),
                "{id:?} should be rejected"
            );
        }
    }

    #[test]
    fn public_url_joins_base_bucket_and_path() {
        let store = AssetStore::new(
            "https://storage.example/",
            "ad-images",
            "key",
            HttpSettings::default(),
        )
        .unwrap();
        assert_eq!(
            store.public_url("meta/A1_0.jpg"),
            "https://storage.example/storage/v1/object/public/ad-images/meta/A1_0.jpg"
        );
    }

    #[test]
    fn non_image_content_types_fall_back_to_jpeg() {
        let png = HeaderValue::from_static("image/png");
        let html = HeaderValue::from_static("text/html");
        assert_eq!(image_content_type(Some(&png)), "image/png");
        assert_eq!(image_content_type(Some(&html)), "image/jpeg");
        assert_eq!(image_content_type(None), "image/jpeg");
    }
}
