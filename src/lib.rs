//! # insectelim - pest-control business site
//!
//! Public marketing pages plus an authenticated admin API for managing
//! services, blog posts, site settings and the contact inbox.
//!
//! ## Features
//!
//! - **Server-rendered pages**: home, service detail, blog detail, contact form
//! - **REST API**: `/api/services`, `/api/blog`, `/api/settings`, `/api/messages`, `/api/images`
//! - **Admin sessions**: bcrypt passwords, HS256 bearer tokens
//! - **Markdown subset**: headings, bold lines, bullet lists, paragraphs
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use insectelim::auth::{TokenIssuer, DEFAULT_BCRYPT_COST};
//! use insectelim::server::{self, AppState, ServeOptions};
//! use insectelim::uploads::ImageStore;
//! use insectelim::Store;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = Store::open(std::path::Path::new("data/insectelim.db")).await?;
//! store.init().await?;
//! store.seed_defaults().await?;
//!
//! let state = Arc::new(AppState {
//!     store,
//!     tokens: TokenIssuer::new(b"change-me-please-32-bytes-long!!", Duration::from_secs(3600))?,
//!     images: ImageStore::new("data/images", 5),
//!     allow_registration: false,
//!     bcrypt_cost: DEFAULT_BCRYPT_COST,
//! });
//! server::serve(
//!     state,
//!     ServeOptions { bind: "127.0.0.1".into(), port: 3000, cors_origins: vec![] },
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod format;
pub mod markdown;
pub mod pages;
pub mod server;
pub mod store;
pub mod uploads;

pub use store::Store;
