use axum::{Json, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::PortalError;

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const CONFLICT: i32 = 1002;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;
    pub const FORBIDDEN: i32 = 2003;

    // Resource errors (4xxx)
    pub const NOT_FOUND: i32 = 4001;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
}

/// Map a domain error to the HTTP error tuple used by all handlers.
pub fn reject(err: PortalError) -> (StatusCode, Json<ApiResponse<()>>) {
    let (status, code) = match &err {
        PortalError::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
        PortalError::Forbidden(_) => (StatusCode::FORBIDDEN, error_codes::FORBIDDEN),
        PortalError::Invalid(_) => (StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER),
        PortalError::Conflict(_) => (StatusCode::CONFLICT, error_codes::CONFLICT),
        PortalError::Database(_) | PortalError::Internal(_) => {
            tracing::error!("Request failed: {:?}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR)
        }
    };
    let msg = match status {
        // Internals must not leak driver details to clients
        StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
        _ => err.to_string(),
    };
    (status, Json(ApiResponse::<()>::error(code, msg)))
}
