//! Schema upgrade tests: a v1 database opened by the current binary

use std::path::Path;

use insectelim::store::{Store, StoreError, Visibility, CURRENT_SCHEMA_VERSION};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tempfile::TempDir;

/// Tables as they stood before service details and last_login existed
const V1_SCHEMA: &[&str] = &[
    "CREATE TABLE metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
    "CREATE TABLE services (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        icon TEXT NOT NULL DEFAULT 'bug',
        image_url TEXT,
        position INTEGER NOT NULL DEFAULT 0,
        active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE blog_posts (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        excerpt TEXT NOT NULL DEFAULT '',
        content TEXT NOT NULL,
        category TEXT NOT NULL DEFAULT 'prévention',
        image_url TEXT,
        published INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE contact_messages (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT NOT NULL,
        message TEXT NOT NULL,
        is_read INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE site_settings (key TEXT PRIMARY KEY, value TEXT NOT NULL, updated_at TEXT NOT NULL)",
    "CREATE TABLE admin_users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
];

async fn write_old_database(path: &Path, version: &str) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true),
        )
        .await
        .unwrap();
    for ddl in V1_SCHEMA {
        sqlx::query(ddl).execute(&pool).await.unwrap();
    }
    sqlx::query("INSERT INTO metadata (key, value) VALUES ('schema_version', ?1)")
        .bind(version)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO services (id, title, description, created_at, updated_at) \
         VALUES ('svc-1', 'Dératisation', 'Rats et souris', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO admin_users (id, email, password_hash, created_at) \
         VALUES ('adm-1', 'admin@insectelim.fr', 'hash', '2024-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();
    pool.close().await;
}

#[tokio::test]
async fn test_v1_database_upgrades_on_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("old.db");
    write_old_database(&path, "1").await;

    let store = Store::open(&path).await.unwrap();
    assert_eq!(
        store.schema_version().await.unwrap(),
        Some(CURRENT_SCHEMA_VERSION)
    );

    let services = store.list_services(Visibility::All).await.unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].title, "Dératisation");
    assert!(services[0].features.is_empty());
    assert!(services[0].benefits.is_empty());

    let admin = store
        .find_admin_by_email("admin@insectelim.fr")
        .await
        .unwrap()
        .unwrap();
    assert!(admin.last_login.is_none());
    store.touch_last_login(&admin.id).await.unwrap();
    let admin = store.get_admin(&admin.id).await.unwrap().unwrap();
    assert!(admin.last_login.is_some());
}

#[tokio::test]
async fn test_upgraded_database_reopens_cleanly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("old.db");
    write_old_database(&path, "1").await;

    Store::open(&path).await.unwrap().close().await.unwrap();
    let store = Store::open(&path).await.unwrap();
    store.init().await.unwrap();
    assert_eq!(
        store.schema_version().await.unwrap(),
        Some(CURRENT_SCHEMA_VERSION)
    );
    assert_eq!(store.list_services(Visibility::All).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_newer_schema_is_refused() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("future.db");
    write_old_database(&path, "99").await;

    let err = Store::open(&path).await.err().unwrap();
    assert!(matches!(err, StoreError::SchemaNewerThanApp(99)));
}
