use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, reject};
use crate::models::{District, School};

/// All districts
///
/// GET /api/v1/districts
#[utoipa::path(
    get,
    path = "/api/v1/districts",
    responses(
        (status = 200, description = "Districts", body = ApiResponse<Vec<District>>)
    ),
    tag = "Districts"
)]
pub async fn list_districts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<District>>>, (StatusCode, Json<ApiResponse<()>>)> {
    let districts = state.districts.list().await.map_err(reject)?;
    Ok(Json(ApiResponse::success(districts)))
}

/// Schools in a district
///
/// GET /api/v1/districts/{id}/schools
#[utoipa::path(
    get,
    path = "/api/v1/districts/{id}/schools",
    params(("id" = Uuid, Path, description = "District id")),
    responses(
        (status = 200, description = "Schools", body = ApiResponse<Vec<School>>),
        (status = 404, description = "District not found")
    ),
    tag = "Districts"
)]
pub async fn list_schools(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<School>>>, (StatusCode, Json<ApiResponse<()>>)> {
    let schools = state.districts.schools(id).await.map_err(reject)?;
    Ok(Json(ApiResponse::success(schools)))
}
