//! Transfer Core Types
//!
//! `CreateTransfer` is the validated command the workflow consumes; the HTTP
//! DTO in the gateway converts into it. `TransferRecord` is the persisted
//! row; `TransferView` joins in display data for API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::state::TransferStatus;
use crate::error::PortalError;
use crate::models::is_valid_dob;

/// Who initiates the request.
///
/// *Outbound*: the sending district files the transfer and names the student
/// by internal id. *Inbound*: the receiving district files it ("student
/// already arrived, prior district never did"), naming the student by the
/// portable identifier plus date of birth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Outbound,
    Inbound,
}

/// Proof attachment payload: opaque bytes plus a suggested filename.
#[derive(Debug, Clone)]
pub struct ProofUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Validated create command (dual-flow).
#[derive(Debug, Clone)]
pub struct CreateTransfer {
    pub kind: RequestKind,
    /// Outbound: required. Inbound: resolved from the identifier.
    pub student_id: Option<Uuid>,
    /// Inbound: required portable identifier (e.g. "DEMO-001").
    pub unique_student_identifier: Option<String>,
    /// Inbound: required anti-spoofing check. Outbound: optional, but must
    /// match exactly when supplied.
    pub dob: Option<String>,
    /// Outbound: required, must equal the student's current district.
    /// Inbound: derived from the resolved student when omitted.
    pub old_district_id: Option<Uuid>,
    /// Outbound: caller-supplied destination. Inbound: defaults to the
    /// caller's home district.
    pub new_district_id: Option<Uuid>,
    pub old_school_id: Option<Uuid>,
    pub new_school_id: Option<Uuid>,
    pub notes: Option<String>,
    pub proof: Option<ProofUpload>,
}

impl CreateTransfer {
    /// Shape validation, before any I/O. Semantic checks (student exists,
    /// district matches) live in the workflow.
    pub fn validate(&self) -> Result<(), PortalError> {
        match self.kind {
            RequestKind::Outbound => {
                if self.student_id.is_none() {
                    return Err(PortalError::invalid("studentId is required"));
                }
                if self.old_district_id.is_none() {
                    return Err(PortalError::invalid("oldDistrictId is required"));
                }
            }
            RequestKind::Inbound => {
                if self
                    .unique_student_identifier
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default()
                    .is_empty()
                {
                    return Err(PortalError::invalid(
                        "uniqueStudentIdentifier is required for inbound requests",
                    ));
                }
                if self.dob.is_none() {
                    return Err(PortalError::invalid("dob is required for inbound requests"));
                }
            }
        }
        if let Some(dob) = &self.dob {
            if !is_valid_dob(dob) {
                return Err(PortalError::invalid("dob must be YYYY-MM-DD"));
            }
        }
        if self.notes.as_deref().is_some_and(|n| n.len() > 2000) {
            return Err(PortalError::invalid("notes must be at most 2000 characters"));
        }
        Ok(())
    }
}

/// Persisted transfer row. Never deleted; mutated exactly once.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub old_district_id: Uuid,
    pub new_district_id: Option<Uuid>,
    pub old_school_id: Option<Uuid>,
    pub new_school_id: Option<Uuid>,
    pub requested_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub status: TransferStatus,
    pub proof_file_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransferRecord {
    /// New pending transfer. `old_district_id` snapshots the student's
    /// district at request time and is never re-checked afterwards.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        student_id: Uuid,
        old_district_id: Uuid,
        new_district_id: Option<Uuid>,
        old_school_id: Option<Uuid>,
        new_school_id: Option<Uuid>,
        requested_by: Uuid,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            student_id,
            old_district_id,
            new_district_id,
            old_school_id,
            new_school_id,
            requested_by,
            approved_by: None,
            status: TransferStatus::Pending,
            proof_file_url: None,
            notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append (never overwrite) free-text notes, newline-joined.
    pub fn appended_notes(existing: Option<&str>, extra: &str) -> String {
        match existing {
            Some(prev) if !prev.is_empty() => format!("{}\n{}", prev, extra),
            _ => extra.to_string(),
        }
    }
}

/// Transfer joined with display data for API responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferView {
    #[serde(flatten)]
    pub transfer: TransferRecord,
    pub student_name: Option<String>,
    pub old_district_name: Option<String>,
    pub new_district_name: Option<String>,
    pub requested_by_email: Option<String>,
    pub approved_by_email: Option<String>,
}

impl From<TransferRecord> for TransferView {
    fn from(transfer: TransferRecord) -> Self {
        Self {
            transfer,
            student_name: None,
            old_district_name: None,
            new_district_name: None,
            requested_by_email: None,
            approved_by_email: None,
        }
    }
}
