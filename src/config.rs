//! Configuration file support for insectelim
//!
//! Config files are loaded in order (later overrides earlier):
//! 1. `~/.config/insectelim/config.toml` (user defaults)
//! 2. `insectelim.toml` in the working directory (site overrides)
//! 3. `--config <path>` if given
//!
//! CLI flags override all config file values.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration options loaded from config files
///
/// # Example
///
/// ```toml
/// # insectelim.toml
/// bind = "127.0.0.1"
/// port = 3000
/// database = "data/insectelim.db"
/// upload_dir = "data/images"
/// jwt_secret = "change-me-to-something-long"
/// token_ttl_hours = 168
/// max_upload_mb = 5
/// allow_registration = false
/// cors_origins = ["https://insectelim.fr"]
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listen address (overridden by --bind)
    pub bind: Option<String>,
    /// Listen port (overridden by --port)
    pub port: Option<u16>,
    /// SQLite database file (overridden by --database)
    pub database: Option<PathBuf>,
    /// Directory for uploaded images (overridden by --upload-dir)
    pub upload_dir: Option<PathBuf>,
    /// HS256 signing secret for session tokens
    pub jwt_secret: Option<String>,
    /// Session token lifetime
    pub token_ttl_hours: Option<u64>,
    /// Upload size limit in megabytes
    pub max_upload_mb: Option<u64>,
    /// Allow anyone to register an admin account
    pub allow_registration: Option<bool>,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: Option<u32>,
    /// Allowed CORS origins (empty = any)
    pub cors_origins: Vec<String>,
    /// Enable quiet mode by default
    pub quiet: Option<bool>,
    /// Enable verbose mode by default
    pub verbose: Option<bool>,
}

impl Config {
    /// Load user, working-directory and explicit config files
    ///
    /// Missing or malformed implicit files are skipped with a warning. An
    /// explicit `--config` file must exist and parse.
    pub fn load(cwd: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let user_config = dirs::config_dir()
            .map(|d| d.join("insectelim/config.toml"))
            .and_then(|p| Self::load_file(&p))
            .unwrap_or_default();

        let site_config = Self::load_file(&cwd.join("insectelim.toml")).unwrap_or_default();

        let mut merged = user_config.override_with(site_config);

        if let Some(path) = explicit {
            let content = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
            let explicit_config: Self = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
            merged = merged.override_with(explicit_config);
        }

        tracing::debug!(
            bind = ?merged.bind,
            port = ?merged.port,
            database = ?merged.database,
            upload_dir = ?merged.upload_dir,
            has_jwt_secret = merged.jwt_secret.is_some(),
            allow_registration = ?merged.allow_registration,
            cors_origins = merged.cors_origins.len(),
            "Effective config after merge"
        );
        Ok(merged)
    }

    /// Load configuration from a specific file
    fn load_file(path: &Path) -> Option<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read config {}: {}", path.display(), e);
                return None;
            }
        };

        match toml::from_str::<Self>(&content) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "Loaded config");
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to parse config {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Layer another config on top (other overrides self where present)
    fn override_with(self, other: Self) -> Self {
        Config {
            bind: other.bind.or(self.bind),
            port: other.port.or(self.port),
            database: other.database.or(self.database),
            upload_dir: other.upload_dir.or(self.upload_dir),
            jwt_secret: other.jwt_secret.or(self.jwt_secret),
            token_ttl_hours: other.token_ttl_hours.or(self.token_ttl_hours),
            max_upload_mb: other.max_upload_mb.or(self.max_upload_mb),
            allow_registration: other.allow_registration.or(self.allow_registration),
            bcrypt_cost: other.bcrypt_cost.or(self.bcrypt_cost),
            cors_origins: if other.cors_origins.is_empty() {
                self.cors_origins
            } else {
                other.cors_origins
            },
            quiet: other.quiet.or(self.quiet),
            verbose: other.verbose.or(self.verbose),
        }
    }

    // ===== Accessors with defaults =====

    pub const DEFAULT_TOKEN_TTL_HOURS: u64 = 168;
    pub const DEFAULT_MAX_UPLOAD_MB: u64 = 5;

    /// Session lifetime with default fallback (7 days)
    pub fn token_ttl_hours_or_default(&self) -> u64 {
        self.token_ttl_hours.unwrap_or(Self::DEFAULT_TOKEN_TTL_HOURS)
    }

    /// Upload limit with default fallback (5 MB)
    pub fn max_upload_mb_or_default(&self) -> u64 {
        self.max_upload_mb.unwrap_or(Self::DEFAULT_MAX_UPLOAD_MB)
    }

    pub fn allow_registration_or_default(&self) -> bool {
        self.allow_registration.unwrap_or(false)
    }

    pub fn bcrypt_cost_or_default(&self) -> u32 {
        self.bcrypt_cost.unwrap_or(crate::auth::DEFAULT_BCRYPT_COST)
    }

    /// Get quiet mode with default fallback (false)
    pub fn quiet_or_default(&self) -> bool {
        self.quiet.unwrap_or(false)
    }

    /// Get verbose mode with default fallback (false)
    pub fn verbose_or_default(&self) -> bool {
        self.verbose.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("insectelim.toml");
        std::fs::write(
            &config_path,
            "port = 8080\nallow_registration = true\ncors_origins = [\"https://insectelim.fr\"]\n",
        )
        .unwrap();

        let config = Config::load_file(&config_path).unwrap();
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.allow_registration, Some(true));
        assert_eq!(config.cors_origins, vec!["https://insectelim.fr".to_string()]);
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_file(&dir.path().join("nope.toml")).is_none());
    }

    #[test]
    fn test_load_malformed_toml() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("insectelim.toml");
        std::fs::write(&config_path, "not valid [[[").unwrap();
        assert!(Config::load_file(&config_path).is_none());
    }

    #[test]
    fn test_explicit_config_must_parse() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "port = \"eighty\"").unwrap();
        assert!(Config::load(dir.path(), Some(&bad)).is_err());
        assert!(Config::load(dir.path(), Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_explicit_overrides_site_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("insectelim.toml"), "port = 3000\nbind = \"0.0.0.0\"\n")
            .unwrap();
        let explicit = dir.path().join("prod.toml");
        std::fs::write(&explicit, "port = 9000\n").unwrap();

        let config = Config::load(dir.path(), Some(&explicit)).unwrap();
        assert_eq!(config.port, Some(9000));
        assert_eq!(config.bind.as_deref(), Some("0.0.0.0"));
    }

    #[test]
    fn test_merge_override() {
        let base = Config {
            port: Some(3000),
            token_ttl_hours: Some(24),
            cors_origins: vec!["https://a.fr".into()],
            ..Default::default()
        };
        let over = Config {
            port: Some(4000),
            max_upload_mb: Some(10),
            ..Default::default()
        };

        let merged = base.override_with(over);
        assert_eq!(merged.port, Some(4000));
        assert_eq!(merged.token_ttl_hours, Some(24));
        assert_eq!(merged.max_upload_mb, Some(10));
        assert_eq!(merged.cors_origins.len(), 1);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.token_ttl_hours_or_default(), 168);
        assert_eq!(config.max_upload_mb_or_default(), 5);
        assert!(!config.allow_registration_or_default());
        assert!(!config.quiet_or_default());
        assert!(!config.verbose_or_default());
    }
}
