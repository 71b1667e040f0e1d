//! Student Transfer Workflow
//!
//! State machine over `StudentTransfer` records: `pending` on create,
//! terminal `approved`/`rejected` under a two-party requester/approver
//! protocol, with audit trail and optional proof attachment. Approval is
//! the one and only path that moves a student between districts.

pub mod db;
pub mod state;
pub mod store;
pub mod types;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod integration_tests;

pub use db::TransferDb;
pub use state::TransferStatus;
pub use store::{ResolveOutcome, TransferStore};
pub use types::{CreateTransfer, ProofUpload, RequestKind, TransferRecord, TransferView};
pub use workflow::TransferWorkflow;
