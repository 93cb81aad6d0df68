//! HTTP server: JSON API under `/api`, public pages, uploaded images
//!
//! ## Module Structure
//!
//! - `error` - `ApiError` and request validation
//! - `extract` - Bearer-token extractors
//! - `auth`, `services`, `blog`, `messages`, `settings`, `images` - API handlers
//! - `site` - Server-rendered public pages and the contact form

mod auth;
mod blog;
mod images;
mod messages;
mod services;
mod settings;
mod site;

pub mod error;
pub mod extract;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::TokenIssuer;
use crate::store::Store;
use crate::uploads::{ImageStore, IMAGES_URL_PREFIX};

pub use error::{ApiError, FieldError};

/// Headroom on top of the upload limit for JSON bodies and framing
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Shared state for all handlers
///
/// Store wraps a pool and the other fields are immutable, so no lock is needed.
pub struct AppState {
    pub store: Store,
    pub tokens: TokenIssuer,
    pub images: ImageStore,
    /// Let anyone register an admin account once one exists
    pub allow_registration: bool,
    pub bcrypt_cost: u32,
}

/// Listener and middleware options
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub bind: String,
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);

    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(origin = %o, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(parsed))
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handle_health))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::me))
        .route("/services", get(services::list).post(services::create))
        .route(
            "/services/{id}",
            get(services::show)
                .put(services::update)
                .delete(services::remove),
        )
        .route("/services/{id}/move", post(services::move_service))
        .route("/blog", get(blog::list).post(blog::create))
        .route(
            "/blog/{id}",
            get(blog::show).put(blog::update).delete(blog::remove),
        )
        .route("/messages", get(messages::list).post(messages::create))
        .route("/messages/{id}/read", patch(messages::mark_read))
        .route("/messages/{id}", delete(messages::remove))
        .route("/settings", get(settings::list))
        .route("/settings/{key}", get(settings::show).put(settings::upsert))
        .route("/images", post(images::upload))
        .route("/images/{path}", delete(images::remove))
        .fallback(handle_api_not_found)
}

/// Build the full application router
pub fn router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let body_limit = usize::try_from(state.images.max_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(BODY_LIMIT_SLACK);

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors_layer(cors_origins));

    let images = ServeDir::new(state.images.dir());

    Router::new()
        .nest("/api", api_router())
        .route("/", get(site::home))
        .route("/services/{slug}", get(site::service_page))
        .route("/blog/{slug}", get(site::blog_page))
        .route("/contact", post(site::contact))
        .nest_service(IMAGES_URL_PREFIX, images)
        .fallback(site::not_found)
        // RequestBodyLimitLayer enforces the real cap
        .layer(DefaultBodyLimit::disable())
        .layer(middleware)
        .with_state(state)
}

/// Run the server until Ctrl-C
pub async fn serve(state: Arc<AppState>, options: ServeOptions) -> Result<()> {
    let app = router(state, &options.cors_origins);
    let addr = format!("{}:{}", options.bind, options.port);

    let is_localhost =
        options.bind == "127.0.0.1" || options.bind == "localhost" || options.bind == "::1";
    if !is_localhost {
        eprintln!(
            "WARNING: Binding to {}. The admin API is reachable from the network; use HTTPS in front of it.",
            options.bind
        );
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Listening");
    eprintln!("insectelim listening on http://{}", addr);

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        eprintln!("\nShutting down HTTP server...");
    };
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Handle GET /api/health
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "insectelim",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn handle_api_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
