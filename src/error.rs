//! Portal Error Types
//!
//! One taxonomy for the whole service: the first four variants are terminal
//! and user-visible, storage failures surface as `Database`/`Internal` and
//! are never retried by the workflow itself.

use thiserror::Error;

/// Portal error taxonomy
#[derive(Error, Debug, Clone)]
pub enum PortalError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PortalError {
    pub fn not_found(what: impl Into<String>) -> Self {
        PortalError::NotFound(what.into())
    }

    pub fn forbidden(why: impl Into<String>) -> Self {
        PortalError::Forbidden(why.into())
    }

    pub fn invalid(why: impl Into<String>) -> Self {
        PortalError::Invalid(why.into())
    }

    pub fn conflict(why: impl Into<String>) -> Self {
        PortalError::Conflict(why.into())
    }

    /// Stable string code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            PortalError::NotFound(_) => "NOT_FOUND",
            PortalError::Forbidden(_) => "FORBIDDEN",
            PortalError::Invalid(_) => "INVALID_REQUEST",
            PortalError::Conflict(_) => "CONFLICT",
            PortalError::Database(_) => "DATABASE_ERROR",
            PortalError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            PortalError::NotFound(_) => 404,
            PortalError::Forbidden(_) => 403,
            PortalError::Invalid(_) => 400,
            PortalError::Conflict(_) => 409,
            PortalError::Database(_) | PortalError::Internal(_) => 500,
        }
    }
}

impl From<sqlx::Error> for PortalError {
    fn from(e: sqlx::Error) -> Self {
        PortalError::Database(e.to_string())
    }
}

impl From<anyhow::Error> for PortalError {
    fn from(e: anyhow::Error) -> Self {
        PortalError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status() {
        assert_eq!(PortalError::not_found("Student").http_status(), 404);
        assert_eq!(PortalError::forbidden("nope").http_status(), 403);
        assert_eq!(PortalError::invalid("bad dob").http_status(), 400);
        assert_eq!(PortalError::conflict("already approved").http_status(), 409);
        assert_eq!(PortalError::Database("down".into()).http_status(), 500);
    }

    #[test]
    fn test_codes() {
        assert_eq!(PortalError::not_found("Student").code(), "NOT_FOUND");
        assert_eq!(PortalError::conflict("x").code(), "CONFLICT");
        assert_eq!(PortalError::invalid("x").code(), "INVALID_REQUEST");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            PortalError::not_found("Transfer request").to_string(),
            "Transfer request not found"
        );
        assert_eq!(
            PortalError::forbidden("Access denied to this district").to_string(),
            "Access denied to this district"
        );
    }
}
