use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{UploadDto, check_valid};
use crate::error::PortalError;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, reject};
use crate::models::{Caller, WorkRecord};
use crate::records::{NewWorkSample, WorkUpload};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddWorkRequest {
    #[validate(length(min = 1, max = 32))]
    #[schema(example = "3")]
    pub grade_level: String,
    #[validate(length(min = 1, max = 128))]
    #[schema(example = "Mathematics")]
    pub subject: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(nested)]
    pub file: Option<UploadDto>,
}

/// Attach a work sample to a student
///
/// POST /api/v1/students/{id}/records
#[utoipa::path(
    post,
    path = "/api/v1/students/{id}/records",
    params(("id" = Uuid, Path, description = "Student id")),
    request_body = AddWorkRequest,
    responses(
        (status = 201, description = "Record created", body = ApiResponse<WorkRecord>),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Out of district"),
        (status = 404, description = "Student not found")
    ),
    tag = "Records"
)]
pub async fn add_work(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(student_id): Path<Uuid>,
    Json(req): Json<AddWorkRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WorkRecord>>), (StatusCode, Json<ApiResponse<()>>)> {
    check_valid(&req)?;

    let file = match &req.file {
        Some(upload) => Some(WorkUpload {
            filename: upload.filename.clone(),
            bytes: upload.decode(state.max_upload_bytes)?,
        }),
        None => None,
    };

    let record = state
        .records
        .add_work(
            &caller,
            student_id,
            NewWorkSample {
                grade_level: req.grade_level,
                subject: req.subject,
                notes: req.notes,
                file,
            },
        )
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

/// Work samples for a student, newest first
///
/// GET /api/v1/students/{id}/records
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}/records",
    params(("id" = Uuid, Path, description = "Student id")),
    responses(
        (status = 200, description = "Records", body = ApiResponse<Vec<WorkRecord>>),
        (status = 403, description = "Out of district"),
        (status = 404, description = "Student not found")
    ),
    tag = "Records"
)]
pub async fn list_work(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<WorkRecord>>>, (StatusCode, Json<ApiResponse<()>>)> {
    let records = state
        .records
        .list_work(&caller, student_id)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(records)))
}

/// Download the stored file behind a work record
///
/// GET /api/v1/students/{id}/records/{record_id}/file
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}/records/{record_id}/file",
    params(
        ("id" = Uuid, Path, description = "Student id"),
        ("record_id" = Uuid, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "File bytes"),
        (status = 403, description = "Out of district"),
        (status = 404, description = "Record or file not found")
    ),
    tag = "Records"
)]
pub async fn download_work(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path((student_id, record_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiResponse<()>>)> {
    let (path, filename) = state
        .records
        .work_file(&caller, student_id, record_id)
        .await
        .map_err(reject)?;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| reject(PortalError::not_found("File")))?;

    Ok((
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )],
        bytes,
    ))
}
