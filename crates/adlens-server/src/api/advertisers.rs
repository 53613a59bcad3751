use adlens_core::platform_label;
use adlens_db::{AdvertiserRow, AdvertiserStatsRow, MonthlyStartsRow};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct AdvertiserItem {
    id: String,
    platform: &'static str,
    name: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AdvertiserRow> for AdvertiserItem {
    fn from(row: AdvertiserRow) -> Self {
        Self {
            platform: platform_label(row.platform_id),
            id: row.id,
            name: row.name,
            metadata: row.metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct AdvertiserStats {
    total_ads: i64,
    active_ads: i64,
    inactive_ads: i64,
    average_duration_days: i64,
    first_start_date: Option<DateTime<Utc>>,
    last_end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(super) struct MonthlyStarts {
    month: String,
    ads: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct AdvertiserSummary {
    advertiser: AdvertiserItem,
    stats: AdvertiserStats,
    monthly_starts: Vec<MonthlyStarts>,
}

pub(super) async fn list_advertisers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<AdvertiserItem>>>, ApiError> {
    let rows = adlens_db::list_advertisers(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(AdvertiserItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Advertiser record plus ad counts, average run length and starts per month.
pub(super) async fn get_advertiser_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AdvertiserSummary>>, ApiError> {
    let advertiser = adlens_db::get_advertiser(&state.pool, &id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(req_id.0.clone(), "advertiser", &id))?;

    let stats = adlens_db::get_advertiser_stats(&state.pool, &id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let months = adlens_db::list_advertiser_monthly_starts(&state.pool, &id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: build_summary(advertiser, stats, months),
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn build_summary(
    advertiser: AdvertiserRow,
    stats: AdvertiserStatsRow,
    months: Vec<MonthlyStartsRow>,
) -> AdvertiserSummary {
    AdvertiserSummary {
        advertiser: advertiser.into(),
        stats: AdvertiserStats {
            total_ads: stats.total_ads,
            active_ads: stats.active_ads,
            inactive_ads: stats.inactive_ads,
            average_duration_days: stats.average_duration_days,
            first_start_date: stats.first_start_date,
            last_end_date: stats.last_end_date,
        },
        monthly_starts: months
            .into_iter()
            .map(|m| MonthlyStarts {
                month: m.month,
                ads: m.ads,
            })
            .collect(),
    }
}
