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

use super::check_valid;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, reject};
use crate::models::{Caller, Classroom, Enrollment, Student};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ClassroomBody {
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Grade 3 Homeroom")]
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollBody {
    pub student_id: Uuid,
}

/// Caller's classrooms
///
/// GET /api/v1/classrooms
#[utoipa::path(
    get,
    path = "/api/v1/classrooms",
    responses(
        (status = 200, description = "Classrooms owned by the caller", body = ApiResponse<Vec<Classroom>>)
    ),
    tag = "Classrooms"
)]
pub async fn list_classrooms(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<ApiResponse<Vec<Classroom>>>, (StatusCode, Json<ApiResponse<()>>)> {
    let rooms = state.classrooms.list(&caller).await.map_err(reject)?;
    Ok(Json(ApiResponse::success(rooms)))
}

/// Create a classroom
///
/// POST /api/v1/classrooms
#[utoipa::path(
    post,
    path = "/api/v1/classrooms",
    request_body = ClassroomBody,
    responses(
        (status = 201, description = "Classroom created", body = ApiResponse<Classroom>),
        (status = 400, description = "Invalid name")
    ),
    tag = "Classrooms"
)]
pub async fn create_classroom(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<ClassroomBody>,
) -> Result<(StatusCode, Json<ApiResponse<Classroom>>), (StatusCode, Json<ApiResponse<()>>)> {
    check_valid(&req)?;
    let room = state
        .classrooms
        .create(&caller, &req.name)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(room))))
}

/// Single classroom (owner only)
///
/// GET /api/v1/classrooms/{id}
#[utoipa::path(
    get,
    path = "/api/v1/classrooms/{id}",
    params(("id" = Uuid, Path, description = "Classroom id")),
    responses(
        (status = 200, description = "Classroom", body = ApiResponse<Classroom>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    ),
    tag = "Classrooms"
)]
pub async fn get_classroom(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Classroom>>, (StatusCode, Json<ApiResponse<()>>)> {
    let room = state.classrooms.get(&caller, id).await.map_err(reject)?;
    Ok(Json(ApiResponse::success(room)))
}

/// Rename a classroom
///
/// PATCH /api/v1/classrooms/{id}
#[utoipa::path(
    patch,
    path = "/api/v1/classrooms/{id}",
    params(("id" = Uuid, Path, description = "Classroom id")),
    request_body = ClassroomBody,
    responses(
        (status = 200, description = "Classroom renamed", body = ApiResponse<Classroom>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    ),
    tag = "Classrooms"
)]
pub async fn rename_classroom(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<ClassroomBody>,
) -> Result<Json<ApiResponse<Classroom>>, (StatusCode, Json<ApiResponse<()>>)> {
    check_valid(&req)?;
    let room = state
        .classrooms
        .rename(&caller, id, &req.name)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(room)))
}

/// Delete a classroom
///
/// DELETE /api/v1/classrooms/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/classrooms/{id}",
    params(("id" = Uuid, Path, description = "Classroom id")),
    responses(
        (status = 200, description = "Classroom deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    ),
    tag = "Classrooms"
)]
pub async fn delete_classroom(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, (StatusCode, Json<ApiResponse<()>>)> {
    state.classrooms.remove(&caller, id).await.map_err(reject)?;
    Ok(Json(ApiResponse::success(())))
}

/// Classroom roster
///
/// GET /api/v1/classrooms/{id}/students
#[utoipa::path(
    get,
    path = "/api/v1/classrooms/{id}/students",
    params(("id" = Uuid, Path, description = "Classroom id")),
    responses(
        (status = 200, description = "Enrolled students", body = ApiResponse<Vec<Student>>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    ),
    tag = "Classrooms"
)]
pub async fn roster(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Student>>>, (StatusCode, Json<ApiResponse<()>>)> {
    let students = state.classrooms.roster(&caller, id).await.map_err(reject)?;
    Ok(Json(ApiResponse::success(students)))
}

/// Enroll a student
///
/// POST /api/v1/classrooms/{id}/students
#[utoipa::path(
    post,
    path = "/api/v1/classrooms/{id}/students",
    params(("id" = Uuid, Path, description = "Classroom id")),
    request_body = EnrollBody,
    responses(
        (status = 201, description = "Student enrolled", body = ApiResponse<Enrollment>),
        (status = 403, description = "Not the owner or out of district"),
        (status = 404, description = "Classroom or student not found"),
        (status = 409, description = "Already enrolled")
    ),
    tag = "Classrooms"
)]
pub async fn enroll_student(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<EnrollBody>,
) -> Result<(StatusCode, Json<ApiResponse<Enrollment>>), (StatusCode, Json<ApiResponse<()>>)> {
    let enrollment = state
        .classrooms
        .add_student(&caller, id, req.student_id)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(enrollment))))
}

/// Remove a student from a classroom
///
/// DELETE /api/v1/classrooms/{id}/students/{student_id}
#[utoipa::path(
    delete,
    path = "/api/v1/classrooms/{id}/students/{student_id}",
    params(
        ("id" = Uuid, Path, description = "Classroom id"),
        ("student_id" = Uuid, Path, description = "Student id")
    ),
    responses(
        (status = 200, description = "Student removed"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Enrollment not found")
    ),
    tag = "Classrooms"
)]
pub async fn unenroll_student(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path((id, student_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<()>>, (StatusCode, Json<ApiResponse<()>>)> {
    state
        .classrooms
        .remove_student(&caller, id, student_id)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(())))
}
