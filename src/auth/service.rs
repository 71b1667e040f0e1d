//! Authentication service: email/password login issuing an HS256 JWT, and
//! caller resolution for authenticated requests.
//!
//! Credential checking stays here; *authorization* lives in `policy`. The
//! caller's district scope is resolved fresh on every request (teacher ->
//! school -> district); a broken link leaves the scope empty, which the
//! policy treats as deny.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{PgPool, Row};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::audit::AuditSink;
use crate::config::AuthConfig;
use crate::error::PortalError;
use crate::models::{Caller, Role};

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Teacher id
    pub sub: String,
    pub role: String,
    pub school_id: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "t.rivera@school.example")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub school_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: LoginUser,
}

pub fn hash_password(password: &str) -> Result<String, PortalError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| PortalError::Internal(format!("Hashing failed: {}", e)))
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub fn issue_token(
    secret: &str,
    ttl_hours: i64,
    teacher_id: Uuid,
    role: &str,
    school_id: Uuid,
) -> Result<String, PortalError> {
    let now = Utc::now();
    let exp = now + Duration::hours(ttl_hours);
    let claims = Claims {
        sub: teacher_id.to_string(),
        role: role.to_string(),
        school_id: Some(school_id.to_string()),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| PortalError::Internal(format!("Token generation failed: {}", e)))
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, PortalError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| PortalError::forbidden("Invalid or expired token"))
}

pub struct AuthService {
    pool: PgPool,
    config: AuthConfig,
    audit: Arc<dyn AuditSink>,
}

impl AuthService {
    pub fn new(pool: PgPool, config: AuthConfig, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            pool,
            config,
            audit,
        }
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, PortalError> {
        let email = req.email.trim().to_lowercase();
        let row = sqlx::query(
            "SELECT id, school_id, email, role, password_hash FROM teachers WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            self.audit.log(
                "UNKNOWN",
                "LOGIN_FAIL",
                json!({ "email": email, "reason": "user_not_found" }),
            );
            return Err(PortalError::forbidden("Invalid credentials"));
        };

        let id: Uuid = row.get("id");
        let school_id: Uuid = row.get("school_id");
        let role: String = row.get("role");
        let password_hash: Option<String> = row.get("password_hash");

        let ok = password_hash
            .as_deref()
            .map(|h| verify_password(h, &req.password))
            .unwrap_or(false);
        if !ok {
            self.audit.log(
                &id.to_string(),
                "LOGIN_FAIL",
                json!({ "email": email, "reason": "bad_password" }),
            );
            return Err(PortalError::forbidden("Invalid credentials"));
        }

        let token = issue_token(
            &self.config.jwt_secret,
            self.config.token_ttl_hours,
            id,
            &role,
            school_id,
        )?;
        self.audit
            .log(&id.to_string(), "LOGIN_SUCCESS", json!({ "email": email }));

        Ok(AuthResponse {
            access_token: token,
            user: LoginUser {
                id,
                email,
                role,
                school_id,
            },
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, PortalError> {
        decode_token(&self.config.jwt_secret, token)
    }

    /// Build the caller identity for an authenticated teacher. District
    /// scope comes from the school link; when the chain is broken the
    /// caller simply has no scope.
    pub async fn resolve_caller(&self, teacher_id: Uuid) -> Result<Caller, PortalError> {
        let row = sqlx::query(
            r#"
            SELECT t.id, t.role, t.school_id, s.district_id
            FROM teachers t
            LEFT JOIN schools s ON s.id = t.school_id
            WHERE t.id = $1
            "#,
        )
        .bind(teacher_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| PortalError::forbidden("Unknown caller"))?;

        let role_str: String = row.get("role");
        let role = Role::parse(&role_str)
            .ok_or_else(|| PortalError::forbidden("Unknown role"))?;

        Ok(Caller::new(
            row.get("id"),
            role,
            row.get("school_id"),
            row.get("district_id"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password(&hash, "correct horse"));
        assert!(!verify_password(&hash, "wrong horse"));
        assert!(!verify_password("not-a-phc-string", "anything"));
    }

    #[test]
    fn test_token_roundtrip() {
        let teacher_id = Uuid::new_v4();
        let school_id = Uuid::new_v4();
        let token = issue_token("secret", 1, teacher_id, "district_admin", school_id).unwrap();

        let claims = decode_token("secret", &token).unwrap();
        assert_eq!(claims.sub, teacher_id.to_string());
        assert_eq!(claims.role, "district_admin");
        assert_eq!(claims.school_id, Some(school_id.to_string()));
    }

    #[test]
    fn test_token_wrong_secret_rejected() {
        let token = issue_token("secret-a", 1, Uuid::new_v4(), "teacher", Uuid::new_v4()).unwrap();
        assert!(decode_token("secret-b", &token).is_err());
        assert!(decode_token("secret-a", "garbage.token.here").is_err());
    }
}
