use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The search API answered with an `error` field instead of results.
    #[error("upstream error for {target_id}: {message}")]
    Upstream { target_id: String, message: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Image download or object-storage upload failed.
    #[error("asset error for {path}: {reason}")]
    Asset { path: String, reason: String },
}
