// common/src/config.rs
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use config::{Config as ConfigFile, File, Environment};

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_STORAGE_PATH: &str = ".webnok/session.json";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Central configuration for the dashboard client
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Absolute `http(s)` base URL the API paths are appended to
    pub backend_url: String,
    /// File backing the durable `token`/`role` storage
    pub storage_path: PathBuf,
    /// Maximum tracing level (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        // Locate the config directory
        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::debug!("Loading configuration from {}", config_dir.display());
        tracing::debug!("Using run mode: {}", run_mode);

        let config = ConfigFile::builder()
            .set_default("backend_url", DEFAULT_BACKEND_URL)?
            .set_default("storage_path", DEFAULT_STORAGE_PATH)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            // Local overrides, never committed
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // APP__BACKEND_URL, APP__STORAGE_PATH, APP__LOG_LEVEL
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;
        let config: Self = config.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the HTTP client cannot use.
    ///
    /// Paths are joined onto `backend_url` by concatenation, and the client
    /// only accepts absolute URLs, so an empty or scheme-less base would fail
    /// every request.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let base = self.backend_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(config::ConfigError::Message(format!(
                "backend_url must be an absolute http(s) URL, got {:?}",
                self.backend_url
            )));
        }
        Ok(())
    }

    /// Load from files and environment, falling back to plain environment variables
    pub fn from_env() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to environment variables only");
                Self::from_vars(|key| env::var(key).ok())
            }
        }
    }

    /// Build a config from `BACKEND_URL`, `STORAGE_PATH` and `LOG_LEVEL` as
    /// returned by `lookup`.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            backend_url: lookup("BACKEND_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.backend_url),
            storage_path: lookup("STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }

    /// Backend URL without a trailing slash, ready for `format!("{}{}", base, path)`
    pub fn api_base(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }
}
