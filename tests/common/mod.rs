//! Common test fixtures and helpers
//!
//! Usage in test files:
//! ```ignore
//! mod common;
//! use common::TestStore;
//! ```
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use insectelim::auth::{hash_password, TokenIssuer};
use insectelim::server::{self, AppState};
use insectelim::store::{AdminUser, ServiceInput, Store};
use insectelim::uploads::ImageStore;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Lowest bcrypt cost, keeps tests fast
pub const TEST_BCRYPT_COST: u32 = 4;

pub const TEST_SECRET: &[u8] = b"test-secret-at-least-16-bytes";

pub const ADMIN_EMAIL: &str = "admin@insectelim.fr";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Test store with automatic cleanup
///
/// Wraps a `Store` with its backing `TempDir`, ensuring the directory
/// lives as long as the store is in use.
pub struct TestStore {
    /// The store instance
    pub store: Store,
    /// Temp directory (kept alive to prevent cleanup)
    _dir: TempDir,
}

impl TestStore {
    /// Create an initialized test store in a temporary directory
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = dir.path().join("insectelim.db");
        let store = Store::open(&db_path).await.expect("Failed to open store");
        store.init().await.expect("Failed to init store");
        Self { store, _dir: dir }
    }

    /// Initialized store with the default services, post and settings
    pub async fn seeded() -> Self {
        let ts = Self::new().await;
        ts.store.seed_defaults().await.expect("Failed to seed");
        ts
    }
}

impl std::ops::Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Service input with the required fields filled in
pub fn service_input(title: &str) -> ServiceInput {
    ServiceInput {
        title: title.to_string(),
        description: format!("Description de {}", title),
        icon: "bug".to_string(),
        ..Default::default()
    }
}

/// Full application wired to a temp database and upload directory
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_registration(false).await
    }

    pub async fn with_registration(allow_registration: bool) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = Store::open(&dir.path().join("insectelim.db"))
            .await
            .expect("Failed to open store");
        store.init().await.expect("Failed to init store");
        let images_dir = dir.path().join("images");
        std::fs::create_dir_all(&images_dir).expect("Failed to create images dir");

        let state = Arc::new(AppState {
            store,
            tokens: TokenIssuer::new(TEST_SECRET, Duration::from_secs(3600))
                .expect("Failed to build token issuer"),
            images: ImageStore::new(images_dir, 1),
            allow_registration,
            bcrypt_cost: TEST_BCRYPT_COST,
        });
        let router = server::router(state.clone(), &[]);
        Self {
            router,
            state,
            _dir: dir,
        }
    }

    /// Insert the default admin directly and return a token for it
    pub async fn admin_token(&self) -> String {
        let user = self.create_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        self.state.tokens.issue(&user).expect("Failed to issue token")
    }

    pub async fn create_admin(&self, email: &str, password: &str) -> AdminUser {
        let hash = hash_password(password, TEST_BCRYPT_COST).expect("Failed to hash");
        self.state
            .store
            .create_admin(email, &hash)
            .await
            .expect("Failed to create admin")
    }

    /// Send a request and return status plus raw body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        (status, body.to_vec())
    }

    /// Send a JSON request and parse the JSON response
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let (status, bytes) = self.send(builder.body(body).expect("valid request")).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    /// GET a page and return status plus HTML
    pub async fn page(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request");
        let (status, bytes) = self.send(request).await;
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }
}
