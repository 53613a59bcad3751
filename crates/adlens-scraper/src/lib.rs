pub mod assets;
pub mod client;
pub mod dates;
pub mod error;
pub mod google;
pub mod meta;
pub(crate) mod retry;
pub mod source;
pub(crate) mod wire;

pub use assets::{storage_path_for, AssetStore, StoredAsset};
pub use client::HttpSettings;
pub use error::ScraperError;
pub use google::{normalize_google_response, GoogleAdsClient, GoogleAdsResponse};
pub use meta::{normalize_meta_response, MetaAdsClient, MetaAdsResponse};
pub use source::AdSource;
