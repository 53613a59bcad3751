pub mod ads;
pub mod app_config;
pub mod config;

use thiserror::Error;

pub use ads::{
    platform_label, CreativeKind, NormalizedAd, NormalizedAdvertiser, NormalizedCta,
    NormalizedImage, Platform, ScrapeBatch, GOOGLE_PLATFORM_ID, META_PLATFORM_ID,
};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
