//! Classroom rosters.
//!
//! Ownership rule: a teacher only reads or modifies classrooms they own.
//! Adding a student additionally checks district scope, and a duplicate
//! enrollment is a Conflict, never a silent no-op.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::PortalError;
use crate::models::{Caller, Classroom, Enrollment, Student};
use crate::policy;

pub struct ClassroomService {
    pool: PgPool,
}

impl ClassroomService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, caller: &Caller) -> Result<Vec<Classroom>, PortalError> {
        let rows = sqlx::query_as::<_, Classroom>(
            "SELECT id, teacher_id, school_id, name FROM classrooms \
             WHERE teacher_id = $1 ORDER BY name ASC",
        )
        .bind(caller.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> Result<Classroom, PortalError> {
        let classroom = sqlx::query_as::<_, Classroom>(
            "SELECT id, teacher_id, school_id, name FROM classrooms WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| PortalError::not_found("Classroom"))?;

        if classroom.teacher_id != caller.id {
            return Err(PortalError::forbidden("Access denied to this classroom"));
        }
        Ok(classroom)
    }

    pub async fn create(&self, caller: &Caller, name: &str) -> Result<Classroom, PortalError> {
        let school_id = caller
            .school_id
            .ok_or_else(|| PortalError::invalid("Caller has no school"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(PortalError::invalid("Classroom name is required"));
        }

        let classroom = sqlx::query_as::<_, Classroom>(
            "INSERT INTO classrooms (id, teacher_id, school_id, name) VALUES ($1, $2, $3, $4) \
             RETURNING id, teacher_id, school_id, name",
        )
        .bind(Uuid::new_v4())
        .bind(caller.id)
        .bind(school_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(classroom)
    }

    pub async fn rename(
        &self,
        caller: &Caller,
        id: Uuid,
        name: &str,
    ) -> Result<Classroom, PortalError> {
        self.get(caller, id).await?;
        let classroom = sqlx::query_as::<_, Classroom>(
            "UPDATE classrooms SET name = $1 WHERE id = $2 \
             RETURNING id, teacher_id, school_id, name",
        )
        .bind(name.trim())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(classroom)
    }

    pub async fn remove(&self, caller: &Caller, id: Uuid) -> Result<(), PortalError> {
        self.get(caller, id).await?;
        sqlx::query("DELETE FROM classrooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn roster(
        &self,
        caller: &Caller,
        classroom_id: Uuid,
    ) -> Result<Vec<Student>, PortalError> {
        self.get(caller, classroom_id).await?;
        let rows = sqlx::query_as::<_, Student>(
            r#"
            SELECT s.id, s.district_id, s.first_name, s.last_name, s.dob,
                   s.unique_student_identifier
            FROM enrollments e
            JOIN students s ON s.id = e.student_id
            WHERE e.classroom_id = $1
            ORDER BY s.last_name ASC, s.first_name ASC
            "#,
        )
        .bind(classroom_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn add_student(
        &self,
        caller: &Caller,
        classroom_id: Uuid,
        student_id: Uuid,
    ) -> Result<Enrollment, PortalError> {
        self.get(caller, classroom_id).await?;

        let student = sqlx::query_as::<_, Student>(
            "SELECT id, district_id, first_name, last_name, dob, unique_student_identifier \
             FROM students WHERE id = $1",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| PortalError::not_found("Student"))?;

        if !policy::can_access_district(caller, student.district_id) {
            return Err(PortalError::forbidden("Access denied to this student"));
        }

        // Unique (classroom, student) pair guards the race; a duplicate
        // surfaces as Conflict.
        let inserted = sqlx::query_as::<_, Enrollment>(
            "INSERT INTO enrollments (id, classroom_id, student_id) VALUES ($1, $2, $3) \
             ON CONFLICT (classroom_id, student_id) DO NOTHING \
             RETURNING id, classroom_id, student_id",
        )
        .bind(Uuid::new_v4())
        .bind(classroom_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        inserted.ok_or_else(|| PortalError::conflict("Student is already in this class"))
    }

    pub async fn remove_student(
        &self,
        caller: &Caller,
        classroom_id: Uuid,
        student_id: Uuid,
    ) -> Result<(), PortalError> {
        self.get(caller, classroom_id).await?;
        let res = sqlx::query(
            "DELETE FROM enrollments WHERE classroom_id = $1 AND student_id = $2",
        )
        .bind(classroom_id)
        .bind(student_id)
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(PortalError::not_found("Enrollment"));
        }
        Ok(())
    }
}
