//! Transfer Database Layer
//!
//! PostgreSQL persistence for the transfer workflow. The resolve path is a
//! single atomic compare-and-swap (`UPDATE ... WHERE status = 'pending'`,
//! affected rows checked) so two concurrent approvals cannot both win.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::state::TransferStatus;
use super::store::{ResolveOutcome, TransferStore};
use super::types::{TransferRecord, TransferView};
use crate::error::PortalError;
use crate::models::Student;

pub struct TransferDb {
    pool: PgPool,
}

impl TransferDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<TransferRecord, PortalError> {
        let status_str: String = row.get("status");
        let status = TransferStatus::parse(&status_str)
            .ok_or_else(|| PortalError::Internal(format!("Invalid status: {}", status_str)))?;

        Ok(TransferRecord {
            id: row.get("id"),
            student_id: row.get("student_id"),
            old_district_id: row.get("old_district_id"),
            new_district_id: row.get("new_district_id"),
            old_school_id: row.get("old_school_id"),
            new_school_id: row.get("new_school_id"),
            requested_by: row.get("requested_by"),
            approved_by: row.get("approved_by"),
            status,
            proof_file_url: row.get("proof_file_url"),
            notes: row.get("notes"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    fn row_to_view(row: &sqlx::postgres::PgRow) -> Result<TransferView, PortalError> {
        let transfer = Self::row_to_record(row)?;
        Ok(TransferView {
            transfer,
            student_name: row.get("student_name"),
            old_district_name: row.get("old_district_name"),
            new_district_name: row.get("new_district_name"),
            requested_by_email: row.get("requested_by_email"),
            approved_by_email: row.get("approved_by_email"),
        })
    }
}

const VIEW_QUERY: &str = r#"
    SELECT t.id, t.student_id, t.old_district_id, t.new_district_id,
           t.old_school_id, t.new_school_id, t.requested_by, t.approved_by,
           t.status, t.proof_file_url, t.notes, t.created_at, t.updated_at,
           s.first_name || ' ' || s.last_name AS student_name,
           od.name AS old_district_name,
           nd.name AS new_district_name,
           rt.email AS requested_by_email,
           ab.email AS approved_by_email
    FROM student_transfers t
    JOIN students s ON s.id = t.student_id
    JOIN districts od ON od.id = t.old_district_id
    LEFT JOIN districts nd ON nd.id = t.new_district_id
    JOIN teachers rt ON rt.id = t.requested_by
    LEFT JOIN teachers ab ON ab.id = t.approved_by
"#;

#[async_trait]
impl TransferStore for TransferDb {
    async fn student(&self, id: Uuid) -> Result<Option<Student>, PortalError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, district_id, first_name, last_name, dob, unique_student_identifier \
             FROM students WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    async fn student_by_identifier(&self, usi: &str) -> Result<Option<Student>, PortalError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, district_id, first_name, last_name, dob, unique_student_identifier \
             FROM students WHERE unique_student_identifier = $1",
        )
        .bind(usi)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    async fn insert(&self, record: &TransferRecord) -> Result<(), PortalError> {
        sqlx::query(
            r#"
            INSERT INTO student_transfers
                (id, student_id, old_district_id, new_district_id, old_school_id,
                 new_school_id, requested_by, status, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())
            "#,
        )
        .bind(record.id)
        .bind(record.student_id)
        .bind(record.old_district_id)
        .bind(record.new_district_id)
        .bind(record.old_school_id)
        .bind(record.new_school_id)
        .bind(record.requested_by)
        .bind(record.status.as_str())
        .bind(&record.notes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn attach_proof(&self, id: Uuid, url: &str) -> Result<(), PortalError> {
        sqlx::query(
            "UPDATE student_transfers SET proof_file_url = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(url)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<TransferRecord>, PortalError> {
        let row = sqlx::query(
            "SELECT id, student_id, old_district_id, new_district_id, old_school_id, \
             new_school_id, requested_by, approved_by, status, proof_file_url, notes, \
             created_at, updated_at FROM student_transfers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn describe(&self, id: Uuid) -> Result<Option<TransferView>, PortalError> {
        let row = sqlx::query(&format!("{} WHERE t.id = $1", VIEW_QUERY))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_view(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_pending(&self) -> Result<Vec<TransferView>, PortalError> {
        let rows = sqlx::query(&format!(
            "{} WHERE t.status = 'pending' ORDER BY t.created_at DESC",
            VIEW_QUERY
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            views.push(Self::row_to_view(&row)?);
        }
        Ok(views)
    }

    async fn resolve(
        &self,
        id: Uuid,
        verdict: TransferStatus,
        approver: Uuid,
        notes: Option<&str>,
    ) -> Result<ResolveOutcome, PortalError> {
        debug_assert!(verdict.is_terminal());

        let mut tx = self.pool.begin().await?;

        // CAS: the status guard and the write are one statement, so under a
        // concurrent resolve exactly one caller gets the row back.
        let winner = sqlx::query(
            r#"
            UPDATE student_transfers
            SET status = $1,
                approved_by = $2,
                notes = CASE
                    WHEN $3::text IS NULL THEN notes
                    WHEN notes IS NULL OR notes = '' THEN $3
                    ELSE notes || E'\n' || $3
                END,
                updated_at = NOW()
            WHERE id = $4 AND status = 'pending'
            RETURNING student_id, new_district_id
            "#,
        )
        .bind(verdict.as_str())
        .bind(approver)
        .bind(notes)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = winner else {
            tx.rollback().await?;
            // Lost the race or the transfer never existed; report which.
            let status_str: Option<String> =
                sqlx::query_scalar("SELECT status FROM student_transfers WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;
            return Ok(match status_str {
                None => ResolveOutcome::Missing,
                Some(s) => {
                    let status = TransferStatus::parse(&s)
                        .ok_or_else(|| PortalError::Internal(format!("Invalid status: {}", s)))?;
                    ResolveOutcome::AlreadyResolved(status)
                }
            });
        };

        if verdict == TransferStatus::Approved {
            let student_id: Uuid = row.get("student_id");
            let new_district_id: Option<Uuid> = row.get("new_district_id");
            if let Some(district_id) = new_district_id {
                sqlx::query("UPDATE students SET district_id = $1 WHERE id = $2")
                    .bind(district_id)
                    .bind(student_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(ResolveOutcome::Applied)
    }
}
