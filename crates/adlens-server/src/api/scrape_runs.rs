use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use adlens_db::DbError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ScrapeRunsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct ScrapeRunItem {
    /// Key for `GET /api/v1/scrape-runs/{id}`; matches `run_id` in scrape responses.
    id: i64,
    scrape_run_id: Uuid,
    platform: String,
    trigger_source: String,
    status: String,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    targets_total: i32,
    targets_failed: i32,
    ads_processed: i32,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<adlens_db::ScrapeRunRow> for ScrapeRunItem {
    fn from(row: adlens_db::ScrapeRunRow) -> Self {
        Self {
            id: row.id,
            scrape_run_id: row.public_id,
            platform: row.platform,
            trigger_source: row.trigger_source,
            status: row.status,
            started_at: row.started_at,
            completed_at: row.completed_at,
            targets_total: row.targets_total,
            targets_failed: row.targets_failed,
            ads_processed: row.ads_processed,
            error_message: row.error_message,
            created_at: row.created_at,
        }
    }
}

pub(super) async fn list_scrape_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ScrapeRunsQuery>,
) -> Result<Json<ApiResponse<Vec<ScrapeRunItem>>>, ApiError> {
    let rows = adlens_db::list_scrape_runs(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(ScrapeRunItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_scrape_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ScrapeRunItem>>, ApiError> {
    let row = match adlens_db::get_scrape_run(&state.pool, id).await {
        Ok(row) => row,
        Err(DbError::NotFound) => {
            return Err(ApiError::not_found(req_id.0, "scrape run", &id.to_string()));
        }
        Err(e) => return Err(map_db_error(req_id.0, &e)),
    };

    Ok(Json(ApiResponse {
        data: ScrapeRunItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}
