//! Init command for insectelim
//!
//! Creates the database, optionally seeds default content and a first admin.

use anyhow::{bail, Context, Result};

use insectelim::auth::{hash_password, is_valid_email, normalize_email, MIN_PASSWORD_LEN};
use insectelim::config::Config;

use super::{open_store, runtime};
use crate::cli::Cli;

/// Initialize the site database
pub(crate) fn cmd_init(
    cli: &Cli,
    config: &Config,
    seed: bool,
    admin: Option<(&str, &str)>,
) -> Result<()> {
    let _span = tracing::info_span!("cmd_init").entered();

    if let Some((email, password)) = admin {
        if !is_valid_email(&normalize_email(email)) {
            bail!("'{}' is not a valid email address", email);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            bail!("Password must be at least {} characters", MIN_PASSWORD_LEN);
        }
    }

    if !cli.quiet {
        println!("Initializing {}...", cli.database_path().display());
    }

    let rt = runtime()?;
    rt.block_on(async {
        let store = open_store(cli).await?;

        if seed {
            let report = store
                .seed_defaults()
                .await
                .context("Failed to seed default content")?;
            if !cli.quiet {
                if report.is_empty() {
                    println!("Content already present, nothing seeded.");
                } else {
                    println!(
                        "Seeded {} services, {} blog posts, {} settings.",
                        report.services, report.posts, report.settings
                    );
                }
            }
        }

        if let Some((email, password)) = admin {
            let email = normalize_email(email);
            let hash = hash_password(password, config.bcrypt_cost_or_default())?;
            let user = store.create_admin(&email, &hash).await?;
            if !cli.quiet {
                println!("Created admin {}", user.email);
            }
        }

        store.close().await?;
        Ok::<_, anyhow::Error>(())
    })?;

    if !cli.quiet {
        println!();
        println!("Run 'insectelim serve' to start the site.");
    }
    Ok(())
}
