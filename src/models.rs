//! Domain entities and the authenticated caller identity.
//!
//! Entities mirror the Postgres schema in `db.rs`. `dob` is carried as a
//! `YYYY-MM-DD` string and compared exactly (calendar dates, no timezone
//! conversion anywhere).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Teacher role. Unknown role strings are rejected at the auth boundary,
/// so policy code only ever sees these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Teacher,
    Admin,
    DistrictAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Admin => "admin",
            Role::DistrictAdmin => "district_admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "teacher" => Some(Role::Teacher),
            "admin" => Some(Role::Admin),
            "district_admin" => Some(Role::DistrictAdmin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authenticated caller, resolved from the JWT plus a teacher -> school ->
/// district lookup. A teacher with a broken school/district link ends up
/// with `district_id = None`, which every scope check treats as deny.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
    pub school_id: Option<Uuid>,
    pub district_id: Option<Uuid>,
}

impl Caller {
    pub fn new(id: Uuid, role: Role, school_id: Option<Uuid>, district_id: Option<Uuid>) -> Self {
        Self {
            id,
            role,
            school_id,
            district_id,
        }
    }
}

/// Top-level scoping unit.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct District {
    pub id: Uuid,
    pub name: String,
    pub state: String,
}

/// A school belongs to exactly one district.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct School {
    pub id: Uuid,
    pub district_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Teacher {
    pub id: Uuid,
    pub school_id: Uuid,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
}

/// `district_id` is mutable and changes only via an approved transfer.
/// `unique_student_identifier` is portable across districts.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Student {
    pub id: Uuid,
    pub district_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub unique_student_identifier: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Classroom {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub school_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Enrollment {
    pub id: Uuid,
    pub classroom_id: Uuid,
    pub student_id: Uuid,
}

/// Work sample. Access is gated by the owning student's *current* district,
/// not by authorship.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct WorkRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub teacher_id: Uuid,
    pub grade_level: String,
    pub subject: String,
    pub file_url: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Exact calendar-date format check for `dob` fields (YYYY-MM-DD).
pub fn is_valid_dob(s: &str) -> bool {
    s.len() == 10 && chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
