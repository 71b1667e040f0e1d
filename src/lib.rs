//! District Records Portal
//!
//! District-scoped student records service with an approval-gated
//! inter-district transfer workflow.
//!
//! # Modules
//!
//! - [`models`] - Domain entities and the authenticated caller identity
//! - [`policy`] - Pure district-scope decision functions (fail-closed)
//! - [`transfer`] - Transfer state machine, store and workflow
//! - [`students`] - District-scoped student directory
//! - [`records`] - Work samples (upload, list, download)
//! - [`classrooms`] - Classroom CRUD and rosters
//! - [`districts`] - District/school directory
//! - [`auth`] - Login, JWT verification, caller resolution
//! - [`gateway`] - HTTP router, handlers, OpenAPI docs
//! - [`audit`] - Append-only JSONL audit trail
//! - [`files`] - Local upload storage for proofs and work samples

pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod files;
pub mod logging;
pub mod models;
pub mod policy;

pub mod classrooms;
pub mod districts;
pub mod records;
pub mod students;
pub mod transfer;

pub mod auth;
pub mod gateway;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use db::Database;
pub use error::PortalError;
pub use models::{Caller, Role};
pub use transfer::{TransferStatus, TransferWorkflow};
