//! Persistence layer: libSQL-backed content store for contact requests.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{CONTACT_REQUESTS_COLLECTION, SubmissionStore};
