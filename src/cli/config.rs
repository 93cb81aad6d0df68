//! Config file application

use super::Cli;

/// Apply config file defaults to CLI options
/// CLI flags always override config values
pub(super) fn apply_config_defaults(cli: &mut Cli, config: &insectelim::config::Config) {
    if cli.database.is_none() {
        cli.database = config.database.clone();
    }
    cli.quiet |= config.quiet_or_default();
    cli.verbose |= config.verbose_or_default();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use insectelim::config::Config;
    use std::path::PathBuf;

    #[test]
    fn test_config_fills_missing_database() {
        let mut cli = Cli::try_parse_from(["insectelim", "messages"]).unwrap();
        cli.database = None;
        let config = Config {
            database: Some(PathBuf::from("/srv/site.db")),
            quiet: Some(true),
            ..Default::default()
        };
        apply_config_defaults(&mut cli, &config);
        assert_eq!(cli.database, Some(PathBuf::from("/srv/site.db")));
        assert!(cli.quiet);
    }

    #[test]
    fn test_cli_flag_wins() {
        let mut cli =
            Cli::try_parse_from(["insectelim", "messages", "--database", "cli.db"]).unwrap();
        let config = Config {
            database: Some(PathBuf::from("config.db")),
            ..Default::default()
        };
        apply_config_defaults(&mut cli, &config);
        assert_eq!(cli.database, Some(PathBuf::from("cli.db")));
    }

    #[test]
    fn test_config_false_keeps_cli_flags() {
        let mut cli = Cli::try_parse_from(["insectelim", "-q", "-v", "messages"]).unwrap();
        let config = Config {
            quiet: Some(false),
            verbose: Some(false),
            ..Default::default()
        };
        apply_config_defaults(&mut cli, &config);
        assert!(cli.quiet);
        assert!(cli.verbose);

        let mut cli = Cli::try_parse_from(["insectelim", "messages"]).unwrap();
        let config = Config {
            verbose: Some(true),
            ..Default::default()
        };
        apply_config_defaults(&mut cli, &config);
        assert!(!cli.quiet);
        assert!(cli.verbose);
    }
}
