use adlens_pipeline::AdView;
use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::middleware::RequestId;

use super::{map_read_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn list_ads(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<AdView>>>, ApiError> {
    let data = adlens_pipeline::fetch_ads(&state.pool)
        .await
        .map_err(|e| map_read_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_ad(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AdView>>, ApiError> {
    let ad = adlens_pipeline::fetch_ad_by_id(&state.pool, &id)
        .await
        .map_err(|e| map_read_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(req_id.0.clone(), "ad", &id))?;

    Ok(Json(ApiResponse {
        data: ad,
        meta: ResponseMeta::new(req_id.0),
    }))
}
