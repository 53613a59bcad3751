mod ads;
mod advertisers;
mod ingest;
mod scrape_runs;

use std::sync::Arc;

use adlens_core::AppConfig;
use adlens_scraper::{AssetStore, GoogleAdsClient, MetaAdsClient, ScraperError};
use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId};

/// Shared handles for every route. Clients are built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub google: Arc<GoogleAdsClient>,
    pub meta: Arc<MetaAdsClient>,
    pub assets: Arc<AssetStore>,
}

impl AppState {
    /// # Errors
    ///
    /// Returns [`ScraperError`] if an upstream client or the asset store
    /// cannot be built from `config`.
    pub fn from_config(pool: PgPool, config: &AppConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            pool,
            google: Arc::new(GoogleAdsClient::from_app_config(config)?),
            meta: Arc::new(MetaAdsClient::from_app_config(config)?),
            assets: Arc::new(AssetStore::from_app_config(config)?),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub(super) fn not_found(request_id: String, what: &str, id: &str) -> Self {
        Self::new(request_id, "not_found", format!("{what} {id} not found"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &adlens_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

pub(super) fn map_read_error(request_id: String, error: &adlens_pipeline::ReadError) -> ApiError {
    tracing::error!(error = %error, "ad read failed");
    ApiError::new(request_id, "internal_error", "failed to load ads")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route(
            "/functions/v1/scrape-google-ads",
            post(ingest::scrape_google_ads),
        )
        .route("/functions/v1/scrape-meta-ads", post(ingest::scrape_meta_ads))
        .route("/api/v1/ads", get(ads::list_ads))
        .route("/api/v1/ads/{id}", get(ads::get_ad))
        .route("/api/v1/advertisers", get(advertisers::list_advertisers))
        .route(
            "/api/v1/advertisers/{id}/summary",
            get(advertisers::get_advertiser_summary),
        )
        .route("/api/v1/scrape-runs", get(scrape_runs::list_scrape_runs))
        .route("/api/v1/scrape-runs/{id}", get(scrape_runs::get_scrape_run))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match adlens_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support;
