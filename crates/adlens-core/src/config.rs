use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let storage_url = require("ADLENS_STORAGE_URL")?
        .trim_end_matches('/')
        .to_string();
    let storage_service_key = require("ADLENS_STORAGE_SERVICE_KEY")?;
    let serpapi_api_key = require("SERPAPI_API_KEY")?;
    let searchapi_api_key = require("SEARCHAPI_API_KEY")?;

    let env = parse_environment(&or_default("ADLENS_ENV", "development"));
    let bind_addr = parse_addr("ADLENS_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("ADLENS_LOG_LEVEL", "info");
    let storage_bucket = or_default("ADLENS_STORAGE_BUCKET", "ad-images");

    let serpapi_base_url = or_default("ADLENS_SERPAPI_BASE_URL", "https://serpapi.com/search");
    let searchapi_base_url = or_default(
        "ADLENS_SEARCHAPI_BASE_URL",
        "https://www.searchapi.io/api/v1/search",
    );
    let google_region = or_default("ADLENS_GOOGLE_REGION", "2840");

    let db_max_connections = parse_u32("ADLENS_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("ADLENS_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("ADLENS_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("ADLENS_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("ADLENS_SCRAPER_USER_AGENT", "adlens/0.1 (ad-intelligence)");
    let scraper_max_retries = parse_u32("ADLENS_SCRAPER_MAX_RETRIES", "2")?;
    let scraper_retry_backoff_base_ms = parse_u64("ADLENS_SCRAPER_RETRY_BACKOFF_BASE_MS", "1000")?;

    let scrape_cron = lookup("ADLENS_SCRAPE_CRON")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        storage_url,
        storage_service_key,
        storage_bucket,
        serpapi_api_key,
        serpapi_base_url,
        searchapi_api_key,
        searchapi_base_url,
        google_region,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_ms,
        scrape_cron,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
