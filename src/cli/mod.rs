//! CLI implementation for insectelim

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use config::apply_config_defaults;

/// Database used when neither `--database` nor the config sets one
pub(crate) const DEFAULT_DATABASE: &str = "data/insectelim.db";

#[derive(Parser)]
#[command(name = "insectelim")]
#[command(about = "Marketing site and admin API for a pest-control business")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (overrides ~/.config/insectelim/config.toml and ./insectelim.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true, env = "INSECTELIM_DATABASE")]
    database: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show debug info (sets RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Database path after config defaults are applied
    pub(crate) fn database_path(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    Init {
        /// Insert default services, a blog post and site settings
        #[arg(long)]
        seed: bool,
        /// Create a first admin account with this email
        #[arg(long, requires = "admin_password")]
        admin_email: Option<String>,
        /// Password for --admin-email
        #[arg(long, requires = "admin_email", env = "INSECTELIM_ADMIN_PASSWORD")]
        admin_password: Option<String>,
    },
    /// Start the HTTP server
    Serve {
        /// Bind address
        #[arg(long)]
        bind: Option<String>,
        /// Port
        #[arg(long)]
        port: Option<u16>,
        /// Directory for uploaded images
        #[arg(long)]
        upload_dir: Option<PathBuf>,
        /// Session token signing secret (at least 16 bytes)
        #[arg(long, env = "INSECTELIM_JWT_SECRET", hide_env_values = true)]
        jwt_secret: Option<String>,
        /// Allow binding to a non-localhost address
        #[arg(long)]
        dangerously_allow_network_bind: bool,
    },
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        subcmd: commands::AdminCommand,
    },
    /// List contact messages
    Messages {
        /// Only unread messages
        #[arg(long)]
        unread: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render a markdown file to HTML on stdout
    Render {
        /// Markdown file ("-" for stdin)
        file: PathBuf,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Run CLI with pre-parsed arguments (main.rs inspects --verbose first)
pub fn run_with(mut cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = insectelim::config::Config::load(&cwd, cli.config.as_deref())?;
    apply_config_defaults(&mut cli, &config);

    match cli.command {
        Commands::Init {
            seed,
            ref admin_email,
            ref admin_password,
        } => commands::cmd_init(
            &cli,
            &config,
            seed,
            admin_email.as_deref().zip(admin_password.as_deref()),
        ),
        Commands::Serve {
            ref bind,
            port,
            ref upload_dir,
            ref jwt_secret,
            dangerously_allow_network_bind,
        } => commands::cmd_serve(
            &cli,
            &config,
            commands::ServeArgs {
                bind: bind.clone(),
                port,
                upload_dir: upload_dir.clone(),
                jwt_secret: jwt_secret.clone(),
                dangerously_allow_network_bind,
            },
        ),
        Commands::Admin { ref subcmd } => commands::cmd_admin(&cli, &config, subcmd),
        Commands::Messages { unread, json } => commands::cmd_messages(&cli, unread, json),
        Commands::Render { ref file } => commands::cmd_render(file),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

/// Generate shell completion scripts for the specified shell
fn cmd_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    clap_complete::generate(
        shell,
        &mut Cli::command(),
        "insectelim",
        &mut std::io::stdout(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["insectelim"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["insectelim", "-q", "messages", "--database", "x.db"])
            .unwrap();
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.database, Some(PathBuf::from("x.db")));
    }

    #[test]
    fn test_default_database() {
        let cli = Cli::try_parse_from(["insectelim", "messages"]).unwrap();
        if std::env::var_os("INSECTELIM_DATABASE").is_none() {
            assert_eq!(cli.database_path(), PathBuf::from(DEFAULT_DATABASE));
        }
    }

    #[test]
    fn test_init_flags() {
        let cli = Cli::try_parse_from([
            "insectelim",
            "init",
            "--seed",
            "--admin-email",
            "admin@insectelim.fr",
            "--admin-password",
            "admin123",
        ])
        .unwrap();
        match cli.command {
            Commands::Init {
                seed,
                admin_email,
                admin_password,
            } => {
                assert!(seed);
                assert_eq!(admin_email.as_deref(), Some("admin@insectelim.fr"));
                assert_eq!(admin_password.as_deref(), Some("admin123"));
            }
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_init_admin_email_needs_password() {
        if std::env::var_os("INSECTELIM_ADMIN_PASSWORD").is_none() {
            let result =
                Cli::try_parse_from(["insectelim", "init", "--admin-email", "a@b.fr"]);
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "insectelim",
            "serve",
            "--bind",
            "0.0.0.0",
            "--port",
            "8080",
            "--dangerously-allow-network-bind",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve {
                bind,
                port,
                dangerously_allow_network_bind,
                ..
            } => {
                assert_eq!(bind.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(8080));
                assert!(dangerously_allow_network_bind);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_admin_subcommands() {
        let cli = Cli::try_parse_from([
            "insectelim",
            "admin",
            "add",
            "a@b.fr",
            "--password",
            "secret1",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Admin {
                subcmd: commands::AdminCommand::Add { .. }
            }
        ));

        let cli = Cli::try_parse_from(["insectelim", "admin", "list", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Admin {
                subcmd: commands::AdminCommand::List { json: true }
            }
        ));
    }

    #[test]
    fn test_invalid_port() {
        assert!(Cli::try_parse_from(["insectelim", "serve", "--port", "99999"]).is_err());
    }

    #[test]
    fn test_render_needs_file() {
        assert!(Cli::try_parse_from(["insectelim", "render"]).is_err());
    }
}
