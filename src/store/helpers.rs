//! Store helper types: errors, schema constants, id/timestamp helpers

use thiserror::Error;

/// Schema version for database migrations
///
/// Increment this when changing the database schema. Store::open() checks this
/// against the stored version and migrates forward where a path exists.
///
/// History:
/// - v1: services/blog/messages/settings/admin_users
/// - v2: service detail pages (slug, detailed_content, pricing_info, features, benefits)
/// - v3: Current (admin_users.last_login)
pub const CURRENT_SCHEMA_VERSION: i32 = 3;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Database integrity check failed: {0}")]
    Corruption(String),
    #[error("Schema version mismatch in {0}: database is v{1}, insectelim expects v{2}. Back up and re-run 'insectelim init'.")]
    SchemaMismatch(String, i32, i32),
    #[error("Database created by newer insectelim version (schema v{0}). Please upgrade insectelim.")]
    SchemaNewerThanApp(i32),
    #[error("No migration path from schema v{0} to v{1}")]
    MigrationNotSupported(i32, i32),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
}

impl StoreError {
    /// Map a unique-constraint violation to `Conflict`, pass everything else through.
    pub(crate) fn from_write(err: sqlx::Error, conflict_message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(conflict_message.to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Current UTC time as RFC 3339 with microseconds.
///
/// Fixed-width so lexicographic order in SQLite matches chronological order.
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Decode a JSON string-array column, tolerating legacy garbage.
pub(crate) fn decode_string_list(raw: &str, column: &str, id: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(
            row_id = %id,
            column,
            error = %e,
            "Failed to decode string list from database, using empty list"
        );
        Vec::new()
    })
}

/// Trim and turn empty strings into `None`.
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
