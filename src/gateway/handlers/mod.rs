pub mod classrooms;
pub mod districts;
pub mod health;
pub mod records;
pub mod students;
pub mod transfers;

use axum::{Json, http::StatusCode};
use base64::Engine;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::types::{ApiResponse, error_codes};

/// File payload carried inline in JSON bodies, base64-encoded.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UploadDto {
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "enrollment-form.pdf")]
    pub filename: String,
    /// Base64-encoded file content
    pub content_base64: String,
}

impl UploadDto {
    /// Decode and size-check the payload.
    pub fn decode(
        &self,
        max_bytes: usize,
    ) -> Result<Vec<u8>, (StatusCode, Json<ApiResponse<()>>)> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&self.content_base64)
            .map_err(|_| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<()>::error(
                        error_codes::INVALID_PARAMETER,
                        "File content is not valid base64",
                    )),
                )
            })?;
        if bytes.len() > max_bytes {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(
                    error_codes::INVALID_PARAMETER,
                    format!("File exceeds the {} byte upload limit", max_bytes),
                )),
            ));
        }
        Ok(bytes)
    }
}

/// Map `validator` failures to the standard 400 tuple.
pub(crate) fn check_valid<T: Validate>(
    body: &T,
) -> Result<(), (StatusCode, Json<ApiResponse<()>>)> {
    body.validate().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                error_codes::INVALID_PARAMETER,
                e.to_string(),
            )),
        )
    })
}
