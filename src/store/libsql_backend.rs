//! libSQL backend: async `SubmissionStore` implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::contact::model::{ContactRecord, ContactSubmission};
use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{CONTACT_REQUESTS_COLLECTION, SubmissionStore};

const CONTACT_COLUMNS: &str = "id, name, email, phone, message, created_at";

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db)?;
        migrations::run_migrations(&backend.conn).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let backend = Self::from_database(db)?;
        migrations::run_migrations(&backend.conn).await?;
        Ok(backend)
    }

    fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Query(format!("invalid created_at {s:?}: {e}")))
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

/// Map a libsql Row to a ContactRecord. Column order matches CONTACT_COLUMNS.
fn row_to_record(row: &libsql::Row) -> Result<ContactRecord, DatabaseError> {
    let parse = |e: libsql::Error| DatabaseError::Query(format!("row parse: {e}"));

    let id_str: String = row.get(0).map_err(parse)?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DatabaseError::Query(format!("invalid record id {id_str}: {e}")))?;
    let created_str: String = row.get(5).map_err(parse)?;

    Ok(ContactRecord {
        id,
        submission: ContactSubmission {
            name: row.get(1).map_err(parse)?,
            email: row.get::<String>(2).ok(),
            phone: row.get(3).map_err(parse)?,
            message: row.get(4).map_err(parse)?,
        },
        created_at: parse_datetime(&created_str)?,
    })
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl SubmissionStore for LibSqlBackend {
    async fn create_contact_request(
        &self,
        submission: &ContactSubmission,
    ) -> Result<ContactRecord, DatabaseError> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();
        self.conn
            .execute(
                "INSERT INTO contact_requests (id, name, email, phone, message, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id.to_string(),
                    submission.name.as_str(),
                    opt_text(submission.email.as_deref()),
                    submission.phone.as_str(),
                    submission.message.as_str(),
                    created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("create_contact_request: {e}")))?;

        debug!(id = %id, collection = CONTACT_REQUESTS_COLLECTION, "Record inserted into DB");
        Ok(ContactRecord {
            id,
            submission: submission.clone(),
            created_at,
        })
    }

    async fn get_contact_request(&self, id: Uuid) -> Result<Option<ContactRecord>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {CONTACT_COLUMNS} FROM contact_requests WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_contact_request: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_record(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_contact_request: {e}"))),
        }
    }

    async fn count_contact_requests(&self) -> Result<u64, DatabaseError> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM contact_requests", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("count_contact_requests: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
                Ok(u64::try_from(count).unwrap_or(0))
            }
            Ok(None) => Ok(0),
            Err(e) => Err(DatabaseError::Query(format!("count_contact_requests: {e}"))),
        }
    }
}
