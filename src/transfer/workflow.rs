//! Transfer Workflow
//!
//! The only writer of `student_transfers` and the sole path that ever moves
//! a student between districts. Every operation consults the access policy
//! first, then performs its state transition through the store; the audit
//! write happens after commit and is non-transactional.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::state::TransferStatus;
use super::store::{ResolveOutcome, TransferStore};
use super::types::{CreateTransfer, RequestKind, TransferRecord, TransferView};
use crate::audit::AuditSink;
use crate::error::PortalError;
use crate::files::FileStore;
use crate::models::{Caller, Student};
use crate::policy;

pub struct TransferWorkflow {
    store: Arc<dyn TransferStore>,
    files: Arc<dyn FileStore>,
    audit: Arc<dyn AuditSink>,
}

impl TransferWorkflow {
    pub fn new(
        store: Arc<dyn TransferStore>,
        files: Arc<dyn FileStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            store,
            files,
            audit,
        }
    }

    /// File a transfer request. Outbound callers name the student by id;
    /// inbound callers name them by portable identifier + date of birth and
    /// get the destination defaulted to their own district.
    pub async fn create(
        &self,
        caller: &Caller,
        req: CreateTransfer,
    ) -> Result<TransferView, PortalError> {
        req.validate()?;

        let student = self.resolve_student(&req).await?;

        // Anti-spoofing: a requester must know the student to move them.
        if let Some(dob) = &req.dob {
            if *dob != student.dob {
                return Err(PortalError::invalid(
                    "Date of birth does not match student record",
                ));
            }
        }

        let old_district_id = req.old_district_id.unwrap_or(student.district_id);
        if old_district_id != student.district_id {
            return Err(PortalError::invalid(
                "Student is not in the specified previous district",
            ));
        }

        let new_district_id = match req.kind {
            RequestKind::Outbound => req.new_district_id,
            // Receiving district files the request, so the destination is
            // their own district unless stated explicitly.
            RequestKind::Inbound => match req.new_district_id.or(caller.district_id) {
                Some(id) => Some(id),
                None => {
                    return Err(PortalError::invalid(
                        "Destination district could not be determined for inbound request",
                    ));
                }
            },
        };

        if !policy::can_request_transfer(caller, old_district_id) {
            return Err(PortalError::forbidden(
                "You can only request transfers for students in your district",
            ));
        }

        let record = TransferRecord::new(
            student.id,
            old_district_id,
            new_district_id,
            req.old_school_id,
            req.new_school_id,
            caller.id,
            req.notes.clone(),
        );
        self.store.insert(&record).await?;

        // Proof is best-effort: a storage failure after the row exists is
        // logged, never rolled back.
        if let Some(proof) = &req.proof {
            match self
                .files
                .save_transfer_proof(record.id, &proof.filename, &proof.bytes)
            {
                Ok(url) => {
                    if let Err(e) = self.store.attach_proof(record.id, &url).await {
                        warn!(transfer_id = %record.id, "Proof URL not recorded: {}", e);
                    }
                }
                Err(e) => {
                    warn!(transfer_id = %record.id, "Proof upload failed, transfer kept without proof: {}", e);
                }
            }
        }

        self.audit.log(
            &caller.id.to_string(),
            "TRANSFER_REQUEST",
            json!({ "transferId": record.id, "studentId": student.id }),
        );
        info!(transfer_id = %record.id, student_id = %student.id, "Transfer requested");

        self.view(record.id).await
    }

    /// All pending transfers system-wide, newest first. Approval dashboard.
    pub async fn list_pending(&self, caller: &Caller) -> Result<Vec<TransferView>, PortalError> {
        if !policy::can_approve_transfers(caller) {
            return Err(PortalError::forbidden(
                "Only district admins can view the transfer approval dashboard",
            ));
        }
        self.store.list_pending().await
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> Result<TransferView, PortalError> {
        let view = self
            .store
            .describe(id)
            .await?
            .ok_or_else(|| PortalError::not_found("Transfer request"))?;

        let in_scope = policy::can_approve_transfers(caller)
            || policy::can_access_district(caller, view.transfer.old_district_id);
        if !in_scope {
            return Err(PortalError::forbidden("Access denied to this transfer"));
        }
        Ok(view)
    }

    pub async fn approve(
        &self,
        caller: &Caller,
        id: Uuid,
        notes: Option<String>,
    ) -> Result<TransferView, PortalError> {
        self.resolve(caller, id, TransferStatus::Approved, notes, "TRANSFER_APPROVE")
            .await
    }

    pub async fn reject(
        &self,
        caller: &Caller,
        id: Uuid,
        notes: Option<String>,
    ) -> Result<TransferView, PortalError> {
        self.resolve(caller, id, TransferStatus::Rejected, notes, "TRANSFER_REJECT")
            .await
    }

    async fn resolve(
        &self,
        caller: &Caller,
        id: Uuid,
        verdict: TransferStatus,
        notes: Option<String>,
        action: &str,
    ) -> Result<TransferView, PortalError> {
        if !policy::can_approve_transfers(caller) {
            return Err(PortalError::forbidden(
                "Only district admins can approve or reject transfers",
            ));
        }

        match self
            .store
            .resolve(id, verdict, caller.id, notes.as_deref())
            .await?
        {
            ResolveOutcome::Missing => Err(PortalError::not_found("Transfer request")),
            ResolveOutcome::AlreadyResolved(status) => Err(PortalError::conflict(format!(
                "Transfer is already {}",
                status
            ))),
            ResolveOutcome::Applied => {
                let view = self.view(id).await?;
                self.audit.log(
                    &caller.id.to_string(),
                    action,
                    json!({ "transferId": id, "studentId": view.transfer.student_id }),
                );
                info!(transfer_id = %id, verdict = %verdict, "Transfer resolved");
                Ok(view)
            }
        }
    }

    async fn resolve_student(&self, req: &CreateTransfer) -> Result<Student, PortalError> {
        let student = match req.kind {
            RequestKind::Outbound => {
                // validate() guarantees presence
                let id = req
                    .student_id
                    .ok_or_else(|| PortalError::invalid("studentId is required"))?;
                self.store.student(id).await?
            }
            RequestKind::Inbound => {
                let usi = req
                    .unique_student_identifier
                    .as_deref()
                    .map(str::trim)
                    .ok_or_else(|| {
                        PortalError::invalid("uniqueStudentIdentifier is required")
                    })?;
                self.store.student_by_identifier(usi).await?
            }
        };
        student.ok_or_else(|| PortalError::not_found("Student"))
    }

    async fn view(&self, id: Uuid) -> Result<TransferView, PortalError> {
        self.store
            .describe(id)
            .await?
            .ok_or_else(|| PortalError::Internal("Transfer missing after write".to_string()))
    }
}
