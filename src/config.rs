//! Layered configuration loading using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`PR_REVIEWER_*` prefix, `__` as separator)
//! 2. TOML file (`pr-reviewer.toml` in the working directory, or `--config`)
//! 3. Built-in defaults
//!
//! Figment maps `PR_REVIEWER_SERVER__PORT` -> `server.port`,
//! `PR_REVIEWER_REVIEW__MAX_REVIEWERS` -> `review.max_reviewers`, etc.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default TOML file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "pr-reviewer.toml";

/// Environment variable prefix.
const ENV_PREFIX: &str = "PR_REVIEWER_";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A configuration field has an invalid value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// SQLite settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("pr-reviewer.db")
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_busy_timeout_secs() -> u64 {
    30
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout_secs(),
        }
    }
}

/// Reviewer assignment settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReviewConfig {
    /// Reviewers picked for a new pull request.
    #[serde(default = "default_max_reviewers")]
    pub max_reviewers: usize,
}

const fn default_max_reviewers() -> usize {
    crate::review::DEFAULT_MAX_REVIEWERS
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_reviewers: default_max_reviewers(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub review: ReviewConfig,
}

impl AppConfig {
    /// Load configuration from defaults, the TOML file and the environment.
    ///
    /// `config_file` overrides the default `pr-reviewer.toml` lookup. A
    /// missing file is not an error.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading a `.env` file, if one exists.
    pub fn load_with_dotenv(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(config_file)
    }

    /// Build the figment provider chain.
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let path = config_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".into(),
                reason: "must be non-zero".into(),
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.max_connections".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.review.max_reviewers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "review.max_reviewers".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn default_config_loads() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.database.path, PathBuf::from("pr-reviewer.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.review.max_reviewers, 2);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                [server]
                port = 9090

                [database]
                path = "data/reviews.db"
                "#,
            )?;

            let config = AppConfig::load(None).expect("config");
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.database.path, PathBuf::from("data/reviews.db"));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[review]\nmax_reviewers = 3\n")?;
            jail.set_env("PR_REVIEWER_REVIEW__MAX_REVIEWERS", "1");
            jail.set_env("PR_REVIEWER_SERVER__PORT", "7000");

            let config = AppConfig::load(Some(Path::new("custom.toml"))).expect("config");
            assert_eq!(config.review.max_reviewers, 1);
            assert_eq!(config.server.port, 7000);
            Ok(())
        });
    }

    #[test]
    fn zero_reviewers_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("PR_REVIEWER_REVIEW__MAX_REVIEWERS", "0");

            let err = AppConfig::load(None).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "review.max_reviewers"));
            Ok(())
        });
    }
}
