//! SQLite storage for site content (sqlx async)
//!
//! ## Module Structure
//!
//! - `helpers` - Error type, schema version, id/timestamp helpers
//! - `services` - Service CRUD and ordering
//! - `posts` - Blog post CRUD
//! - `messages` - Contact message inbox
//! - `settings` - Key/value site settings
//! - `users` - Admin accounts
//! - `seed` - Default content for a fresh site

mod messages;
mod migrations;
mod posts;
mod services;
mod settings;
mod users;

pub mod seed;

/// Helper types and functions shared by the entity modules.
pub(crate) mod helpers;

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

/// Store operation errors.
pub use helpers::StoreError;

/// Current database schema version.
pub use helpers::CURRENT_SCHEMA_VERSION;

pub use messages::{ContactMessage, NewMessage};
pub use posts::{BlogPost, BlogPostInput, DEFAULT_CATEGORY};
pub use services::{MoveDirection, PricingInfo, Service, ServiceInput};
pub use settings::{ContactInfo, HeroSection, SiteSetting, CONTACT_INFO_KEY, HERO_SECTION_KEY};
pub use users::AdminUser;

/// Visibility filter for list/get operations
///
/// Admins see drafts and inactive services; the public site does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Everything, including unpublished posts and inactive services
    All,
    /// Only published posts / active services
    Public,
}

/// Async SQLite store for site content
///
/// Uses sqlx connection pooling and WAL mode so the HTTP server can
/// serve concurrent reads while an admin writes.
///
/// # Example
///
/// ```no_run
/// use insectelim::Store;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), insectelim::store::StoreError> {
/// let store = Store::open(Path::new("data/site.db")).await?;
/// store.init().await?;
/// let services = store.list_services(insectelim::store::Visibility::Public).await?;
/// println!("{} active services", services.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Store {
    pub(crate) pool: SqlitePool,
}

impl Store {
    /// Open (or create) the database with connection pooling
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // filename() avoids URL parsing issues with special characters in paths
        let connect_opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .idle_timeout(std::time::Duration::from_secs(300))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA temp_store = MEMORY")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect_with(connect_opts)
            .await?;

        let store = Self { pool };

        // Admin password hashes live here
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let restrictive = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = std::fs::set_permissions(path, restrictive) {
                tracing::debug!(path = %path.display(), error = %e, "Failed to set permissions");
            }
        }

        tracing::info!(path = %path.display(), "Database connected");

        // Quick integrity check catches B-tree corruption early
        let result: (String,) = sqlx::query_as("PRAGMA quick_check")
            .fetch_one(&store.pool)
            .await?;
        if result.0 != "ok" {
            return Err(StoreError::Corruption(result.0));
        }

        store.check_schema_version(path).await?;
        store.check_app_version().await;

        Ok(store)
    }

    /// Create the schema if missing
    ///
    /// Wraps all DDL and metadata inserts in a single transaction so a
    /// crash mid-init cannot leave a partial schema. Safe to call on an
    /// existing database.
    pub async fn init(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let schema = include_str!("../schema.sql");
        for statement in schema.split(';') {
            let stmt: String = statement
                .lines()
                .skip_while(|line| {
                    let trimmed = line.trim();
                    trimmed.is_empty() || trimmed.starts_with("--")
                })
                .collect::<Vec<_>>()
                .join("\n");
            let stmt = stmt.trim();
            if stmt.is_empty() {
                continue;
            }
            sqlx::query(stmt).execute(&mut *tx).await?;
        }

        let now = helpers::now_rfc3339();
        // OR IGNORE keeps the original creation date on re-init
        sqlx::query("INSERT OR IGNORE INTO metadata (key, value) VALUES ('created_at', ?1)")
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT OR IGNORE INTO metadata (key, value) VALUES ('schema_version', ?1)")
            .bind(CURRENT_SCHEMA_VERSION.to_string())
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT OR REPLACE INTO metadata (key, value) VALUES ('app_version', ?1)")
            .bind(env!("CARGO_PKG_VERSION"))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(schema_version = CURRENT_SCHEMA_VERSION, "Schema initialized");

        Ok(())
    }

    /// Stored schema version, or `None` on a database that was never initialized
    pub async fn schema_version(&self) -> Result<Option<i32>, StoreError> {
        let row: Option<(String,)> =
            match sqlx::query_as("SELECT value FROM metadata WHERE key = 'schema_version'")
                .fetch_optional(&self.pool)
                .await
            {
                Ok(r) => r,
                Err(sqlx::Error::Database(e)) if e.message().contains("no such table") => {
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };

        Ok(row.map(|(s,)| {
            s.parse().unwrap_or_else(|e| {
                tracing::warn!(
                    stored_value = %s,
                    error = %e,
                    "Failed to parse schema_version from metadata, defaulting to 0"
                );
                0
            })
        }))
    }

    async fn check_schema_version(&self, path: &Path) -> Result<(), StoreError> {
        let Some(version) = self.schema_version().await? else {
            return Ok(());
        };

        if version > CURRENT_SCHEMA_VERSION {
            return Err(StoreError::SchemaNewerThanApp(version));
        }
        if version < CURRENT_SCHEMA_VERSION && version > 0 {
            match migrations::migrate(&self.pool, version, CURRENT_SCHEMA_VERSION).await {
                Ok(()) => {
                    tracing::info!(
                        path = %path.display(),
                        from = version,
                        to = CURRENT_SCHEMA_VERSION,
                        "Schema migrated successfully"
                    );
                }
                Err(StoreError::MigrationNotSupported(from, to)) => {
                    return Err(StoreError::SchemaMismatch(
                        path.display().to_string(),
                        from,
                        to,
                    ));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    async fn check_app_version(&self) {
        let row: Option<(String,)> =
            match sqlx::query_as("SELECT value FROM metadata WHERE key = 'app_version'")
                .fetch_optional(&self.pool)
                .await
            {
                Ok(row) => row,
                Err(e) => {
                    tracing::debug!(error = %e, "Failed to read app_version from metadata");
                    return;
                }
            };

        let stored_version = row.map(|(s,)| s).unwrap_or_default();
        let current_version = env!("CARGO_PKG_VERSION");
        if !stored_version.is_empty() && stored_version != current_version {
            tracing::info!(
                "Database written by insectelim v{}, running v{}",
                stored_version,
                current_version
            );
        }
    }

    /// Checkpoint the WAL and close all pooled connections
    pub async fn close(self) -> Result<(), StoreError> {
        sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await?;
        self.pool.close().await;
        tracing::debug!("Database closed");
        Ok(())
    }
}
