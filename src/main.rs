use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG wins; otherwise -v/-q pick the level
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("insectelim=debug,tower_http=debug,info")
    } else if cli.is_quiet() {
        EnvFilter::new("warn")
    } else {
        EnvFilter::new("info")
    };

    // Log to stderr to keep stdout clean for `render` and `--json` output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    cli::run_with(cli)
}
