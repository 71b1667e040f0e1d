pub mod handlers;
pub mod middleware;
pub mod service;

pub use service::{AuthService, Claims, hash_password, verify_password};
