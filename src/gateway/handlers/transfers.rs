use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{UploadDto, check_valid};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, reject};
use crate::models::Caller;
use crate::transfer::{CreateTransfer, ProofUpload, RequestKind, TransferView};

/// Inbound transfer-request body, both flows.
///
/// Outbound: `studentId` + `oldDistrictId` (+ optional destination).
/// Inbound: `uniqueStudentIdentifier` + `dob`, destination defaulted to the
/// caller's district.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    pub kind: RequestKind,
    pub student_id: Option<Uuid>,
    #[validate(length(max = 64))]
    pub unique_student_identifier: Option<String>,
    #[schema(example = "2014-03-15")]
    pub dob: Option<String>,
    pub old_district_id: Option<Uuid>,
    pub new_district_id: Option<Uuid>,
    pub old_school_id: Option<Uuid>,
    pub new_school_id: Option<Uuid>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(nested)]
    pub proof: Option<UploadDto>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResolveTransferRequest {
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// File a student transfer request
///
/// POST /api/v1/transfers
#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = CreateTransferRequest,
    responses(
        (status = 201, description = "Transfer requested", body = ApiResponse<TransferView>),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Caller may not request this transfer"),
        (status = 404, description = "Student not found")
    ),
    tag = "Transfers"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateTransferRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TransferView>>), (StatusCode, Json<ApiResponse<()>>)> {
    check_valid(&req)?;

    let proof = match &req.proof {
        Some(upload) => Some(ProofUpload {
            filename: upload.filename.clone(),
            bytes: upload.decode(state.max_upload_bytes)?,
        }),
        None => None,
    };

    let command = CreateTransfer {
        kind: req.kind,
        student_id: req.student_id,
        unique_student_identifier: req.unique_student_identifier,
        dob: req.dob,
        old_district_id: req.old_district_id,
        new_district_id: req.new_district_id,
        old_school_id: req.old_school_id,
        new_school_id: req.new_school_id,
        notes: req.notes,
        proof,
    };

    let view = state
        .transfers
        .create(&caller, command)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(view))))
}

/// Pending transfers, newest first
///
/// GET /api/v1/transfers
#[utoipa::path(
    get,
    path = "/api/v1/transfers",
    responses(
        (status = 200, description = "Pending transfers", body = ApiResponse<Vec<TransferView>>),
        (status = 403, description = "District admin only")
    ),
    tag = "Transfers"
)]
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<ApiResponse<Vec<TransferView>>>, (StatusCode, Json<ApiResponse<()>>)> {
    let views = state
        .transfers
        .list_pending(&caller)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(views)))
}

/// Single transfer with display data
///
/// GET /api/v1/transfers/{id}
#[utoipa::path(
    get,
    path = "/api/v1/transfers/{id}",
    params(("id" = Uuid, Path, description = "Transfer id")),
    responses(
        (status = 200, description = "Transfer", body = ApiResponse<TransferView>),
        (status = 403, description = "Out of scope"),
        (status = 404, description = "Not found")
    ),
    tag = "Transfers"
)]
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TransferView>>, (StatusCode, Json<ApiResponse<()>>)> {
    let view = state.transfers.get(&caller, id).await.map_err(reject)?;
    Ok(Json(ApiResponse::success(view)))
}

/// Approve a pending transfer
///
/// PATCH /api/v1/transfers/{id}/approve
#[utoipa::path(
    patch,
    path = "/api/v1/transfers/{id}/approve",
    params(("id" = Uuid, Path, description = "Transfer id")),
    request_body = ResolveTransferRequest,
    responses(
        (status = 200, description = "Transfer approved", body = ApiResponse<TransferView>),
        (status = 403, description = "District admin only"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Already resolved")
    ),
    tag = "Transfers"
)]
pub async fn approve_transfer(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<ResolveTransferRequest>,
) -> Result<Json<ApiResponse<TransferView>>, (StatusCode, Json<ApiResponse<()>>)> {
    check_valid(&req)?;
    let view = state
        .transfers
        .approve(&caller, id, req.notes)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(view)))
}

/// Reject a pending transfer
///
/// PATCH /api/v1/transfers/{id}/reject
#[utoipa::path(
    patch,
    path = "/api/v1/transfers/{id}/reject",
    params(("id" = Uuid, Path, description = "Transfer id")),
    request_body = ResolveTransferRequest,
    responses(
        (status = 200, description = "Transfer rejected", body = ApiResponse<TransferView>),
        (status = 403, description = "District admin only"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Already resolved")
    ),
    tag = "Transfers"
)]
pub async fn reject_transfer(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<ResolveTransferRequest>,
) -> Result<Json<ApiResponse<TransferView>>, (StatusCode, Json<ApiResponse<()>>)> {
    check_valid(&req)?;
    let view = state
        .transfers
        .reject(&caller, id, req.notes)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(view)))
}
