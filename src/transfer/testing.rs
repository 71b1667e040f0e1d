//! In-memory doubles for workflow tests: a store with the same CAS resolve
//! semantics as the Postgres layer, plus file/audit stand-ins.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::state::TransferStatus;
use super::store::{ResolveOutcome, TransferStore};
use super::types::{TransferRecord, TransferView};
use crate::audit::AuditSink;
use crate::error::PortalError;
use crate::files::FileStore;
use crate::models::Student;

#[derive(Default)]
struct Inner {
    students: HashMap<Uuid, Student>,
    transfers: HashMap<Uuid, TransferRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_student(&self, student: Student) {
        self.inner
            .lock()
            .unwrap()
            .students
            .insert(student.id, student);
    }

    pub fn student_district(&self, id: Uuid) -> Option<Uuid> {
        self.inner
            .lock()
            .unwrap()
            .students
            .get(&id)
            .map(|s| s.district_id)
    }

    pub fn transfer_count(&self) -> usize {
        self.inner.lock().unwrap().transfers.len()
    }
}

#[async_trait]
impl TransferStore for MemoryStore {
    async fn student(&self, id: Uuid) -> Result<Option<Student>, PortalError> {
        Ok(self.inner.lock().unwrap().students.get(&id).cloned())
    }

    async fn student_by_identifier(&self, usi: &str) -> Result<Option<Student>, PortalError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .students
            .values()
            .find(|s| s.unique_student_identifier == usi)
            .cloned())
    }

    async fn insert(&self, record: &TransferRecord) -> Result<(), PortalError> {
        self.inner
            .lock()
            .unwrap()
            .transfers
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn attach_proof(&self, id: Uuid, url: &str) -> Result<(), PortalError> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .transfers
            .get_mut(&id)
            .ok_or_else(|| PortalError::not_found("Transfer request"))?;
        record.proof_file_url = Some(url.to_string());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<TransferRecord>, PortalError> {
        Ok(self.inner.lock().unwrap().transfers.get(&id).cloned())
    }

    async fn describe(&self, id: Uuid) -> Result<Option<TransferView>, PortalError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .transfers
            .get(&id)
            .cloned()
            .map(TransferView::from))
    }

    async fn list_pending(&self) -> Result<Vec<TransferView>, PortalError> {
        let inner = self.inner.lock().unwrap();
        let mut pending: Vec<&TransferRecord> = inner
            .transfers
            .values()
            .filter(|t| t.status == TransferStatus::Pending)
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pending
            .into_iter()
            .cloned()
            .map(TransferView::from)
            .collect())
    }

    async fn resolve(
        &self,
        id: Uuid,
        verdict: TransferStatus,
        approver: Uuid,
        notes: Option<&str>,
    ) -> Result<ResolveOutcome, PortalError> {
        // Same atomicity as the Postgres CAS: the whole check-and-write
        // happens under one lock.
        let mut inner = self.inner.lock().unwrap();
        let Some(record) = inner.transfers.get(&id).cloned() else {
            return Ok(ResolveOutcome::Missing);
        };
        if record.status != TransferStatus::Pending {
            return Ok(ResolveOutcome::AlreadyResolved(record.status));
        }

        if verdict == TransferStatus::Approved {
            if let Some(district_id) = record.new_district_id {
                if let Some(student) = inner.students.get_mut(&record.student_id) {
                    student.district_id = district_id;
                }
            }
        }

        let record = inner.transfers.get_mut(&id).expect("checked above");
        record.status = verdict;
        record.approved_by = Some(approver);
        if let Some(extra) = notes {
            record.notes = Some(TransferRecord::appended_notes(record.notes.as_deref(), extra));
        }
        record.updated_at = chrono::Utc::now();
        Ok(ResolveOutcome::Applied)
    }
}

/// File store double: records saves, optionally fails every save.
#[derive(Default)]
pub struct MemoryFiles {
    pub fail: bool,
    pub saved: Mutex<Vec<(Uuid, String)>>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl FileStore for MemoryFiles {
    fn save_transfer_proof(
        &self,
        transfer_id: Uuid,
        filename: &str,
        _bytes: &[u8],
    ) -> Result<String, PortalError> {
        if self.fail {
            return Err(PortalError::Internal("disk full".to_string()));
        }
        let url = format!("/uploads/transfers/{}/{}", transfer_id, filename);
        self.saved
            .lock()
            .unwrap()
            .push((transfer_id, filename.to_string()));
        Ok(url)
    }

    fn save_work_sample(
        &self,
        _district_id: Uuid,
        student_id: Uuid,
        year: &str,
        filename: &str,
        _bytes: &[u8],
    ) -> Result<String, PortalError> {
        if self.fail {
            return Err(PortalError::Internal("disk full".to_string()));
        }
        Ok(format!("/uploads/{}/{}/{}", student_id, year, filename))
    }

    fn resolve(&self, _file_url: &str) -> Option<std::path::PathBuf> {
        None
    }
}

/// Audit double collecting (actor, action) pairs.
#[derive(Default)]
pub struct MemoryAudit {
    pub entries: Mutex<Vec<(String, String, Value)>>,
}

impl MemoryAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(_, action, _)| action.clone())
            .collect()
    }
}

impl AuditSink for MemoryAudit {
    fn log(&self, actor: &str, action: &str, details: Value) {
        self.entries
            .lock()
            .unwrap()
            .push((actor.to_string(), action.to_string(), details));
    }
}
