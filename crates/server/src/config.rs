//! Server configuration

use anyhow::{Context, Result};
use estimator_lib::artifact::{default_search_paths, DEFAULT_MODEL_FILE, DEFAULT_SCHEMA_FILE};
use estimator_lib::{ArtifactConfig, BackoffPolicy, LifecycleConfig};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable prefix, e.g. `HPE_PORT`
pub const ENV_PREFIX: &str = "HPE";

/// Optional config file name (any extension the `config` crate knows)
pub const CONFIG_FILE: &str = "price-server";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    Fixed,
    Exponential,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Artifact directories, highest priority first
    #[serde(default = "default_artifact_dirs")]
    pub artifact_dirs: Vec<PathBuf>,

    #[serde(default = "default_schema_file")]
    pub schema_file: String,

    #[serde(default = "default_model_file")]
    pub model_file: String,

    /// Attempts made at startup and on explicit reload
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    #[serde(default = "default_backoff_kind")]
    pub backoff_strategy: BackoffKind,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Attempts made by a request that finds no snapshot
    #[serde(default = "default_recovery_attempts")]
    pub recovery_attempts: u32,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_artifact_dirs() -> Vec<PathBuf> {
    default_search_paths()
}

fn default_schema_file() -> String {
    DEFAULT_SCHEMA_FILE.to_string()
}

fn default_model_file() -> String {
    DEFAULT_MODEL_FILE.to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    2000
}

fn default_backoff_kind() -> BackoffKind {
    BackoffKind::Fixed
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_recovery_attempts() -> u32 {
    1
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}

impl ServerConfig {
    /// Load configuration from `price-server.*` and `HPE_*` variables
    pub fn load() -> Result<Self> {
        Self::from_sources(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn from_sources(env: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                env.try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("artifact_dirs"),
            )
            .build()
            .context("Failed to read configuration sources")?;

        config
            .try_deserialize()
            .context("Failed to parse server configuration")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn artifact_config(&self) -> ArtifactConfig {
        ArtifactConfig {
            search_paths: self.artifact_dirs.clone(),
            schema_file: self.schema_file.clone(),
            model_file: self.model_file.clone(),
        }
    }

    pub fn lifecycle_config(&self) -> LifecycleConfig {
        let delay = Duration::from_millis(self.backoff_ms);
        let startup = match self.backoff_strategy {
            BackoffKind::Fixed => BackoffPolicy::fixed(self.max_attempts, delay),
            BackoffKind::Exponential => BackoffPolicy::exponential(
                self.max_attempts,
                delay,
                self.backoff_multiplier,
                Duration::from_millis(self.max_backoff_ms),
            ),
        };
        LifecycleConfig {
            startup,
            recovery: BackoffPolicy::fixed(self.recovery_attempts, delay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estimator_lib::BackoffStrategy;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> ServerConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_sources(config::Environment::with_prefix(ENV_PREFIX).source(Some(map)))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = from_vars(&[]);

        assert_eq!(config.port, 5000);
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert_eq!(config.schema_file, "columns.json");
        assert_eq!(config.model_file, "home_prices_model.json");
        assert_eq!(config.artifact_dirs.first(), Some(&PathBuf::from("./artifacts")));
        assert_eq!(config.log_format, LogFormat::Json);

        let lifecycle = config.lifecycle_config();
        assert_eq!(lifecycle.startup, BackoffPolicy::fixed(3, Duration::from_secs(2)));
        assert_eq!(lifecycle.recovery.attempts(), 1);
    }

    #[test]
    fn test_env_overrides() {
        let config = from_vars(&[
            ("HPE_PORT", "8081"),
            ("HPE_ARTIFACT_DIRS", "/srv/a,/srv/b"),
            ("HPE_MAX_ATTEMPTS", "5"),
            ("HPE_BACKOFF_STRATEGY", "exponential"),
            ("HPE_BACKOFF_MS", "100"),
            ("HPE_LOG_FORMAT", "text"),
        ]);

        assert_eq!(config.port, 8081);
        assert_eq!(
            config.artifact_config().search_paths,
            vec![PathBuf::from("/srv/a"), PathBuf::from("/srv/b")]
        );
        assert_eq!(config.log_format, LogFormat::Text);

        let startup = config.lifecycle_config().startup;
        assert_eq!(startup.max_attempts, 5);
        assert!(matches!(
            startup.strategy,
            BackoffStrategy::Exponential { initial, .. } if initial == Duration::from_millis(100)
        ));
    }
}
