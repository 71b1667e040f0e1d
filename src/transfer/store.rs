//! Transfer Persistence Contract
//!
//! The workflow talks to storage only through this trait. The production
//! implementation is `TransferDb` (sqlx/Postgres); tests use the in-memory
//! double from `testing.rs`.

use async_trait::async_trait;
use uuid::Uuid;

use super::state::TransferStatus;
use super::types::{TransferRecord, TransferView};
use crate::error::PortalError;
use crate::models::Student;

/// Result of a conditional resolve (approve/reject).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The compare-and-swap applied; the transfer is now terminal.
    Applied,
    /// The transfer was already terminal; nothing changed.
    AlreadyResolved(TransferStatus),
    /// No such transfer.
    Missing,
}

#[async_trait]
pub trait TransferStore: Send + Sync {
    async fn student(&self, id: Uuid) -> Result<Option<Student>, PortalError>;

    /// Lookup by the portable cross-district identifier (inbound flow).
    async fn student_by_identifier(&self, usi: &str) -> Result<Option<Student>, PortalError>;

    async fn insert(&self, record: &TransferRecord) -> Result<(), PortalError>;

    /// Record the proof handle after a successful (best-effort) upload.
    async fn attach_proof(&self, id: Uuid, url: &str) -> Result<(), PortalError>;

    async fn get(&self, id: Uuid) -> Result<Option<TransferRecord>, PortalError>;

    /// Transfer joined with student/district/teacher display data.
    async fn describe(&self, id: Uuid) -> Result<Option<TransferView>, PortalError>;

    /// All pending transfers system-wide, newest first.
    async fn list_pending(&self) -> Result<Vec<TransferView>, PortalError>;

    /// Atomically move a pending transfer to `verdict` and, when the verdict
    /// is `Approved` and a destination district is set, move the student —
    /// all in one transaction. The status check and write are a single
    /// compare-and-swap: under concurrent calls exactly one wins, the others
    /// observe `AlreadyResolved`.
    async fn resolve(
        &self,
        id: Uuid,
        verdict: TransferStatus,
        approver: Uuid,
        notes: Option<&str>,
    ) -> Result<ResolveOutcome, PortalError>;
}
