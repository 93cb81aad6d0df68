//! Serve command for insectelim
//!
//! Starts the HTTP server (public pages + admin API).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use insectelim::auth::{TokenIssuer, MIN_SECRET_LEN};
use insectelim::config::Config;
use insectelim::server::{self, AppState, ServeOptions};
use insectelim::uploads::ImageStore;

use super::{open_store, runtime};
use crate::cli::Cli;

const DEFAULT_BIND: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPLOAD_DIR: &str = "data/images";
/// Upper bound on the configured image size, in megabytes
const MAX_UPLOAD_MB_LIMIT: u64 = 1024;

/// Flags of `insectelim serve`; unset values fall back to the config file
pub(crate) struct ServeArgs {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub upload_dir: Option<PathBuf>,
    pub jwt_secret: Option<String>,
    pub dangerously_allow_network_bind: bool,
}

/// Start the HTTP server
pub(crate) fn cmd_serve(cli: &Cli, config: &Config, args: ServeArgs) -> Result<()> {
    let bind = args
        .bind
        .or_else(|| config.bind.clone())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let port = args.port.or(config.port).unwrap_or(DEFAULT_PORT);
    let upload_dir = args
        .upload_dir
        .or_else(|| config.upload_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR));

    // Block non-localhost bind unless explicitly allowed
    let is_localhost = bind == "127.0.0.1" || bind == "localhost" || bind == "::1";
    if !is_localhost && !args.dangerously_allow_network_bind {
        bail!(
            "Binding to '{}' would expose the admin API to the network.\n\
             If this is intentional, add --dangerously-allow-network-bind",
            bind
        );
    }

    let Some(secret) = args.jwt_secret.or_else(|| config.jwt_secret.clone()) else {
        bail!(
            "No session signing secret.\n\
             Set --jwt-secret, INSECTELIM_JWT_SECRET, or jwt_secret in insectelim.toml."
        );
    };
    if secret.len() < MIN_SECRET_LEN {
        bail!("jwt_secret must be at least {} bytes", MIN_SECRET_LEN);
    }

    let Some(ttl_secs) = config.token_ttl_hours_or_default().checked_mul(3600) else {
        bail!("token_ttl_hours is too large");
    };
    let tokens = TokenIssuer::new(secret.as_bytes(), Duration::from_secs(ttl_secs))?;
    let max_upload_mb = config.max_upload_mb_or_default();
    if max_upload_mb == 0 || max_upload_mb > MAX_UPLOAD_MB_LIMIT {
        bail!(
            "max_upload_mb must be between 1 and {}",
            MAX_UPLOAD_MB_LIMIT
        );
    }
    let images = ImageStore::new(upload_dir, max_upload_mb);
    std::fs::create_dir_all(images.dir()).with_context(|| {
        format!("Failed to create upload directory {}", images.dir().display())
    })?;

    let rt = runtime()?;
    rt.block_on(async {
        let store = open_store(cli).await?;
        if store.admin_count().await? == 0 && !cli.quiet {
            eprintln!(
                "No admin account yet: the first POST /api/auth/register creates one. \
                 Or run 'insectelim admin add'."
            );
        }

        tracing::info!(
            token_ttl_hours = tokens.ttl().as_secs() / 3600,
            max_upload_bytes = images.max_bytes(),
            "Session and upload limits"
        );
        let state = Arc::new(AppState {
            store: store.clone(),
            tokens,
            images,
            allow_registration: config.allow_registration_or_default(),
            bcrypt_cost: config.bcrypt_cost_or_default(),
        });
        let options = ServeOptions {
            bind,
            port,
            cors_origins: config.cors_origins.clone(),
        };
        server::serve(state, options).await?;

        store.close().await?;
        Ok::<_, anyhow::Error>(())
    })
}
