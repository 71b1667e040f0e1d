use std::sync::Arc;

use crate::auth::AuthService;
use crate::classrooms::ClassroomService;
use crate::db::Database;
use crate::districts::DistrictDirectory;
use crate::records::RecordsService;
use crate::students::StudentDirectory;
use crate::transfer::TransferWorkflow;

/// Shared gateway state, one instance behind an `Arc` for all handlers.
pub struct AppState {
    pub db: Database,
    pub auth: Arc<AuthService>,
    pub transfers: Arc<TransferWorkflow>,
    pub students: Arc<StudentDirectory>,
    pub records: Arc<RecordsService>,
    pub classrooms: Arc<ClassroomService>,
    pub districts: Arc<DistrictDirectory>,
    /// Cap on decoded upload payloads (proofs and work samples).
    pub max_upload_bytes: usize,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: Database,
        auth: Arc<AuthService>,
        transfers: Arc<TransferWorkflow>,
        students: Arc<StudentDirectory>,
        records: Arc<RecordsService>,
        classrooms: Arc<ClassroomService>,
        districts: Arc<DistrictDirectory>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            db,
            auth,
            transfers,
            students,
            records,
            classrooms,
            districts,
            max_upload_bytes,
        }
    }
}
