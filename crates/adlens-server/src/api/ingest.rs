//! Ingestion endpoints, shaped like the hosted functions the dashboard calls.
//!
//! Bodies are optional JSON; omitted identifier lists fall back to the
//! platform defaults. Per-target failures are reported inside a `200`.

use std::sync::Arc;

use adlens_core::Platform;
use adlens_pipeline::{resolve_targets, run_ingest, IngestReport, TargetOutcome, TriggerSource};
use adlens_scraper::AdSource;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub(super) struct GoogleScrapeRequest {
    advertiser_ids: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct MetaScrapeRequest {
    page_ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub(super) struct ScrapeResponse {
    success: bool,
    message: &'static str,
    /// Absent when the run could not be recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    run_id: Option<i64>,
    results: Vec<TargetOutcome>,
}

/// Function-style error body: `{ "error": "..." }`.
#[derive(Debug)]
pub(super) struct FunctionError {
    status: StatusCode,
    message: String,
}

impl FunctionError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for FunctionError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

pub(super) async fn scrape_google_ads(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ScrapeResponse>, FunctionError> {
    let request: GoogleScrapeRequest = parse_body(&body)?;
    let targets = resolve_targets(request.advertiser_ids, Platform::Google);
    let source = Arc::clone(&state.google);
    let report = spawn_ingest(&state, source, targets).await?;
    Ok(Json(into_response(report)))
}

pub(super) async fn scrape_meta_ads(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ScrapeResponse>, FunctionError> {
    let request: MetaScrapeRequest = parse_body(&body)?;
    let targets = resolve_targets(request.page_ids, Platform::Meta);
    let source = Arc::clone(&state.meta);
    let report = spawn_ingest(&state, source, targets).await?;
    Ok(Json(into_response(report)))
}

/// An empty or whitespace-only body is treated as `{}`.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, FunctionError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "rejected malformed scrape request body");
        FunctionError::bad_request(format!("invalid request body: {e}"))
    })
}

/// Runs ingestion on its own task so a dropped connection does not abort a
/// half-written batch. A panicking run surfaces as a `500`.
async fn spawn_ingest<S>(
    state: &AppState,
    source: Arc<S>,
    targets: Vec<String>,
) -> Result<IngestReport, FunctionError>
where
    S: AdSource + 'static,
{
    let pool = state.pool.clone();
    let assets = Arc::clone(&state.assets);
    let platform = source.platform();

    tokio::spawn(async move {
        run_ingest(&pool, source.as_ref(), &assets, &targets, TriggerSource::Api).await
    })
    .await
    .map_err(|e| {
        tracing::error!(platform = %platform, error = %e, "ingestion task aborted");
        FunctionError::internal(format!("{platform} ingestion failed unexpectedly"))
    })
}

fn into_response(report: IngestReport) -> ScrapeResponse {
    ScrapeResponse {
        success: true,
        message: report.message(),
        run_id: report.run_id,
        results: report.outcomes,
    }
}
