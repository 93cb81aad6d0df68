//! Schema migrations for the insectelim database
//!
//! When the schema version changes, migrations upgrade existing databases
//! in place so site content survives an upgrade.
//!
//! ## Adding a new migration
//!
//! 1. Increment `CURRENT_SCHEMA_VERSION` in `helpers.rs`
//! 2. Add a migration function: `async fn migrate_vN_to_vM(conn) -> Result<()>`
//! 3. Add the case to `run_migration()`: `(N, M) => migrate_vN_to_vM(conn).await`
//! 4. Update `schema.sql` with the new schema
//!
//! SQLite has no `ADD COLUMN IF NOT EXISTS`, so each step checks
//! `pragma_table_info` first and stays idempotent.

use sqlx::{SqliteConnection, SqlitePool};

use super::helpers::StoreError;

/// Run all migrations from stored version to current version
pub async fn migrate(pool: &SqlitePool, from: i32, to: i32) -> Result<(), StoreError> {
    if from >= to {
        return Ok(());
    }

    tracing::info!(
        from_version = from,
        to_version = to,
        "Starting schema migration"
    );

    let mut tx = pool.begin().await?;
    for version in from..to {
        tracing::info!(from = version, to = version + 1, "Running migration step");
        run_migration(&mut *tx, version, version + 1).await?;
    }
    sqlx::query("UPDATE metadata SET value = ?1 WHERE key = 'schema_version'")
        .bind(to.to_string())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(new_version = to, "Schema migration complete");

    Ok(())
}

/// Run a single migration step
async fn run_migration(conn: &mut SqliteConnection, from: i32, to: i32) -> Result<(), StoreError> {
    match (from, to) {
        (1, 2) => migrate_v1_to_v2(conn).await,
        (2, 3) => migrate_v2_to_v3(conn).await,
        _ => Err(StoreError::MigrationNotSupported(from, to)),
    }
}

async fn has_column(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
) -> Result<bool, StoreError> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT name FROM pragma_table_info(?1) WHERE name = ?2")
            .bind(table)
            .bind(column)
            .fetch_all(&mut *conn)
            .await?;
    Ok(!rows.is_empty())
}

/// Migrate from v1 to v2
///
/// Changes:
/// - services gain slug (unique), detailed_content, pricing_info, features, benefits
async fn migrate_v1_to_v2(conn: &mut SqliteConnection) -> Result<(), StoreError> {
    let additions = [
        ("slug", "ALTER TABLE services ADD COLUMN slug TEXT"),
        (
            "detailed_content",
            "ALTER TABLE services ADD COLUMN detailed_content TEXT",
        ),
        (
            "pricing_info",
            "ALTER TABLE services ADD COLUMN pricing_info TEXT",
        ),
        (
            "features",
            "ALTER TABLE services ADD COLUMN features TEXT NOT NULL DEFAULT '[]'",
        ),
        (
            "benefits",
            "ALTER TABLE services ADD COLUMN benefits TEXT NOT NULL DEFAULT '[]'",
        ),
    ];

    for (column, ddl) in additions {
        if !has_column(conn, "services", column).await? {
            sqlx::query(ddl).execute(&mut *conn).await?;
        }
    }

    // ALTER TABLE cannot add a UNIQUE column; enforce through an index instead
    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_services_slug ON services(slug)")
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Migrate from v2 to v3
///
/// Changes:
/// - admin_users gain last_login
async fn migrate_v2_to_v3(conn: &mut SqliteConnection) -> Result<(), StoreError> {
    if !has_column(conn, "admin_users", "last_login").await? {
        sqlx::query("ALTER TABLE admin_users ADD COLUMN last_login TEXT")
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
