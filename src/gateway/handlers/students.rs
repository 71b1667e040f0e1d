use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, reject};
use crate::models::{Caller, Student};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct StudentQuery {
    /// Name or identifier filter
    pub q: Option<String>,
}

/// Students visible to the caller
///
/// GET /api/v1/students
#[utoipa::path(
    get,
    path = "/api/v1/students",
    params(StudentQuery),
    responses(
        (status = 200, description = "Students in scope", body = ApiResponse<Vec<Student>>),
        (status = 403, description = "No resolvable scope")
    ),
    tag = "Students"
)]
pub async fn list_students(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<StudentQuery>,
) -> Result<Json<ApiResponse<Vec<Student>>>, (StatusCode, Json<ApiResponse<()>>)> {
    let students = state
        .students
        .list(&caller, query.q.as_deref())
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(students)))
}

/// Single student
///
/// GET /api/v1/students/{id}
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}",
    params(("id" = Uuid, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student", body = ApiResponse<Student>),
        (status = 403, description = "Out of district"),
        (status = 404, description = "Not found")
    ),
    tag = "Students"
)]
pub async fn get_student(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Student>>, (StatusCode, Json<ApiResponse<()>>)> {
    let student = state.students.get(&caller, id).await.map_err(reject)?;
    Ok(Json(ApiResponse::success(student)))
}
