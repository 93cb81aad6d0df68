//! Admin account management

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;

use insectelim::auth::{hash_password, is_valid_email, normalize_email, MIN_PASSWORD_LEN};
use insectelim::config::Config;

use super::{open_store, runtime};
use crate::cli::Cli;

#[derive(Subcommand)]
pub(crate) enum AdminCommand {
    /// Create an admin account
    Add {
        /// Login email
        email: String,
        /// Password (at least 6 characters)
        #[arg(long, env = "INSECTELIM_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Change an admin's password
    Passwd {
        /// Login email
        email: String,
        /// New password (at least 6 characters)
        #[arg(long, env = "INSECTELIM_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// List admin accounts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn check_credentials(email: &str, password: &str) -> Result<String> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        bail!("'{}' is not a valid email address", email);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("Password must be at least {} characters", MIN_PASSWORD_LEN);
    }
    Ok(email)
}

pub(crate) fn cmd_admin(cli: &Cli, config: &Config, subcmd: &AdminCommand) -> Result<()> {
    let rt = runtime()?;
    rt.block_on(async {
        let store = open_store(cli).await?;
        match subcmd {
            AdminCommand::Add { email, password } => {
                let email = check_credentials(email, password)?;
                let hash = hash_password(password, config.bcrypt_cost_or_default())?;
                let user = store.create_admin(&email, &hash).await?;
                if !cli.quiet {
                    println!("Created admin {}", user.email.bold());
                }
            }
            AdminCommand::Passwd { email, password } => {
                let email = check_credentials(email, password)?;
                let hash = hash_password(password, config.bcrypt_cost_or_default())?;
                store.set_admin_password(&email, &hash).await?;
                if !cli.quiet {
                    println!("Password updated for {}", email.bold());
                }
            }
            AdminCommand::List { json } => {
                let admins = store.list_admins().await?;
                if *json {
                    println!("{}", serde_json::to_string_pretty(&admins)?);
                } else if admins.is_empty() {
                    println!("No admin accounts.");
                } else {
                    for admin in &admins {
                        let last = admin.last_login.as_deref().unwrap_or("never");
                        println!(
                            "{}  {}",
                            admin.email.bold(),
                            format!("created {}, last login {}", admin.created_at, last).dimmed()
                        );
                    }
                }
            }
        }
        store.close().await?;
        Ok::<_, anyhow::Error>(())
    })
}
