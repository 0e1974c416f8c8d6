//! Storage layer: write-once JSON audit entries.

mod error;
pub use error::StoreError;

pub mod audit;
pub use audit::AuditLog;
