//! CLI command handlers
//!
//! Each submodule handles one CLI subcommand.

mod admin;
mod init;
mod messages;
mod render;
mod serve;

pub(crate) use admin::{cmd_admin, AdminCommand};
pub(crate) use init::cmd_init;
pub(crate) use messages::cmd_messages;
pub(crate) use render::cmd_render;
pub(crate) use serve::{cmd_serve, ServeArgs};

use anyhow::{Context, Result};

use insectelim::Store;

use crate::cli::Cli;

/// Runtime for commands that talk to the async store
pub(super) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

/// Open the database, creating the schema if needed
pub(super) async fn open_store(cli: &Cli) -> Result<Store> {
    let path = cli.database_path();
    let store = Store::open(&path)
        .await
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    store.init().await.context("Failed to initialize schema")?;
    Ok(store)
}
