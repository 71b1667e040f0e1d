//! Student directory, district-scoped.
//!
//! Listing and lookup both enforce the caller's district scope; a caller
//! without a resolvable scope gets denied, never the unfiltered list.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::PortalError;
use crate::models::{Caller, Role, Student};
use crate::policy;

pub struct StudentDirectory {
    pool: PgPool,
}

impl StudentDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Students visible to the caller, last name ascending. `q` filters by
    /// name or portable identifier.
    pub async fn list(
        &self,
        caller: &Caller,
        q: Option<&str>,
    ) -> Result<Vec<Student>, PortalError> {
        let scope = match caller.role {
            Role::DistrictAdmin => None,
            Role::Teacher | Role::Admin => match caller.district_id {
                Some(d) => Some(d),
                None => {
                    return Err(PortalError::forbidden("Access denied"));
                }
            },
        };

        let pattern = q.map(|q| format!("%{}%", q.trim()));
        let rows = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, district_id, first_name, last_name, dob, unique_student_identifier
            FROM students
            WHERE ($1::uuid IS NULL OR district_id = $1)
              AND ($2::text IS NULL
                   OR first_name ILIKE $2
                   OR last_name ILIKE $2
                   OR unique_student_identifier ILIKE $2)
            ORDER BY last_name ASC, first_name ASC
            "#,
        )
        .bind(scope)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> Result<Student, PortalError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, district_id, first_name, last_name, dob, unique_student_identifier \
             FROM students WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| PortalError::not_found("Student"))?;

        if !policy::can_access_district(caller, student.district_id) {
            return Err(PortalError::forbidden("Access denied to this district"));
        }
        Ok(student)
    }
}
