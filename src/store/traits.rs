//! `SubmissionStore` trait: the content store as the contact pipeline sees it.

use async_trait::async_trait;
use uuid::Uuid;

use crate::contact::model::{ContactRecord, ContactSubmission};
use crate::error::DatabaseError;

/// Collection name contact requests are filed under.
pub const CONTACT_REQUESTS_COLLECTION: &str = "contact-requests";

/// Create-only record store for contact submissions.
///
/// There is no idempotency key: two identical submissions create two records.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Create exactly one record for `submission`.
    async fn create_contact_request(
        &self,
        submission: &ContactSubmission,
    ) -> Result<ContactRecord, DatabaseError>;

    /// Read a record back by ID.
    async fn get_contact_request(&self, id: Uuid) -> Result<Option<ContactRecord>, DatabaseError>;

    /// Total number of stored records.
    async fn count_contact_requests(&self) -> Result<u64, DatabaseError>;
}
