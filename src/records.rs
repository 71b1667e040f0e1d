//! Work samples.
//!
//! Access follows the student's *current* district, not the authoring
//! teacher, so records move with the student when a transfer is approved.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Datelike;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::AuditSink;
use crate::error::PortalError;
use crate::files::FileStore;
use crate::models::{Caller, Student, WorkRecord};
use crate::policy;

/// Uploaded work-sample payload.
#[derive(Debug, Clone)]
pub struct WorkUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct NewWorkSample {
    pub grade_level: String,
    pub subject: String,
    pub notes: Option<String>,
    pub file: Option<WorkUpload>,
}

pub struct RecordsService {
    pool: PgPool,
    files: Arc<dyn FileStore>,
    audit: Arc<dyn AuditSink>,
}

impl RecordsService {
    pub fn new(pool: PgPool, files: Arc<dyn FileStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self { pool, files, audit }
    }

    pub async fn add_work(
        &self,
        caller: &Caller,
        student_id: Uuid,
        sample: NewWorkSample,
    ) -> Result<WorkRecord, PortalError> {
        let student = self.load_student(student_id).await?;
        self.assert_access(caller, &student)?;

        let year = chrono::Utc::now().year().to_string();
        let file_url = match &sample.file {
            Some(upload) => self.files.save_work_sample(
                student.district_id,
                student.id,
                &year,
                &upload.filename,
                &upload.bytes,
            )?,
            // Metadata-only submissions get a placeholder handle, same as
            // the portal always has.
            None => format!("/uploads/placeholder-{}-{}.txt", student.id, Uuid::new_v4()),
        };

        let record = sqlx::query_as::<_, WorkRecord>(
            r#"
            INSERT INTO records (id, student_id, teacher_id, grade_level, subject, file_url, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, student_id, teacher_id, grade_level, subject, file_url, notes, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student.id)
        .bind(caller.id)
        .bind(&sample.grade_level)
        .bind(&sample.subject)
        .bind(&file_url)
        .bind(&sample.notes)
        .fetch_one(&self.pool)
        .await?;

        self.audit.log(
            &caller.id.to_string(),
            "RECORD_CREATE",
            json!({ "recordId": record.id, "studentId": student.id }),
        );
        Ok(record)
    }

    pub async fn list_work(
        &self,
        caller: &Caller,
        student_id: Uuid,
    ) -> Result<Vec<WorkRecord>, PortalError> {
        let student = self.load_student(student_id).await?;
        self.assert_access(caller, &student)?;

        let rows = sqlx::query_as::<_, WorkRecord>(
            "SELECT id, student_id, teacher_id, grade_level, subject, file_url, notes, created_at \
             FROM records WHERE student_id = $1 ORDER BY created_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Resolve the stored blob for download.
    pub async fn work_file(
        &self,
        caller: &Caller,
        student_id: Uuid,
        record_id: Uuid,
    ) -> Result<(PathBuf, String), PortalError> {
        let student = self.load_student(student_id).await?;
        self.assert_access(caller, &student)?;

        let file_url: Option<String> = sqlx::query_scalar(
            "SELECT file_url FROM records WHERE id = $1 AND student_id = $2",
        )
        .bind(record_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        let file_url = file_url.ok_or_else(|| PortalError::not_found("Record"))?;

        let path = self
            .files
            .resolve(&file_url)
            .ok_or_else(|| PortalError::not_found("File"))?;
        let filename = file_url
            .rsplit('/')
            .next()
            .unwrap_or("download")
            .to_string();
        Ok((path, filename))
    }

    async fn load_student(&self, id: Uuid) -> Result<Student, PortalError> {
        sqlx::query_as::<_, Student>(
            "SELECT id, district_id, first_name, last_name, dob, unique_student_identifier \
             FROM students WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| PortalError::not_found("Student"))
    }

    fn assert_access(&self, caller: &Caller, student: &Student) -> Result<(), PortalError> {
        if !policy::can_access_district(caller, student.district_id) {
            return Err(PortalError::forbidden("Access denied to this student"));
        }
        Ok(())
    }
}
