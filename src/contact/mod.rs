//! Contact form submissions: validation, verification, storage and
//! notification behind `POST /api/contact`.

pub mod handler;
pub mod model;
pub mod routes;
pub mod validation;

pub use handler::{ContactDeps, ContactService};
pub use model::{ContactAccepted, ContactRecord, ContactSubmission};
pub use routes::{app_router, contact_routes};
