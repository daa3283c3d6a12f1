use crate::error::{config_error, ShiftResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default Workjam API host
pub const DEFAULT_WORKJAM_BASE_URL: &str = "https://api.workjam.com";
/// Default suffix appended to every synced event UID
pub const DEFAULT_DOMAIN: &str = "shiftsync.local";
/// Default directory for cached credentials
pub const DEFAULT_STORAGE_DIR: &str = ".shiftsync";
/// Optional config file merged over the defaults
pub const CONFIG_FILE: &str = "config/shiftsync.toml";

/// Main configuration structure for the application
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Base URL of the Workjam API
    pub workjam_base_url: String,
    /// Suffix of event UIDs, `{eventId}@{domain}`
    pub domain: String,
    /// Directory holding cached tokens
    pub storage_dir: PathBuf,
    /// Timeout applied to each Workjam request
    pub request_timeout_secs: u64,
    /// Retries after the first attempt, server errors only
    pub max_retries: usize,
    /// First retry delay, doubled on every further retry
    pub retry_base_backoff_ms: u64,
    /// Cap on concurrently transformed events
    pub max_concurrency: usize,
    /// Locale for calendar text
    pub locale: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workjam_base_url: DEFAULT_WORKJAM_BASE_URL.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            request_timeout_secs: 30,
            max_retries: 5,
            retry_base_backoff_ms: 200,
            max_concurrency: 8,
            locale: "en".to_string(),
        }
    }
}

/// Partial config as read from the TOML file, every key optional
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    workjam_base_url: Option<String>,
    domain: Option<String>,
    storage_dir: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    max_retries: Option<usize>,
    retry_base_backoff_ms: Option<u64>,
    max_concurrency: Option<usize>,
    locale: Option<String>,
}

/// Load a `.env` file into the process environment, variables already set win
pub fn load_env_file(path: Option<&Path>) -> bool {
    match path {
        Some(path) => dotenvy::from_path(path).is_ok(),
        None => dotenv().is_ok(),
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> ShiftResult<Self> {
        load_env_file(None);

        let mut config = Config::default();

        if Path::new(CONFIG_FILE).exists() {
            let content = fs::read_to_string(CONFIG_FILE)?;
            config.merge_toml(&content)?;
            debug!("Merged configuration from {}", CONFIG_FILE);
        }

        config.merge_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Merge values from a TOML document over the current ones
    pub fn merge_toml(&mut self, content: &str) -> ShiftResult<()> {
        let file: FileConfig = toml::from_str(content)?;

        if let Some(v) = file.workjam_base_url {
            self.workjam_base_url = v;
        }
        if let Some(v) = file.domain {
            self.domain = v;
        }
        if let Some(v) = file.storage_dir {
            self.storage_dir = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout_secs = v;
        }
        if let Some(v) = file.max_retries {
            self.max_retries = v;
        }
        if let Some(v) = file.retry_base_backoff_ms {
            self.retry_base_backoff_ms = v;
        }
        if let Some(v) = file.max_concurrency {
            self.max_concurrency = v;
        }
        if let Some(v) = file.locale {
            self.locale = v;
        }

        Ok(())
    }

    fn merge_env(&mut self) -> ShiftResult<()> {
        if let Ok(v) = env::var("WORKJAM_BASE_URL") {
            self.workjam_base_url = v;
        }
        if let Ok(v) = env::var("SHIFTSYNC_DOMAIN") {
            self.domain = v;
        }
        if let Ok(v) = env::var("SHIFTSYNC_STORAGE_DIR") {
            self.storage_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("SHIFTSYNC_MAX_CONCURRENCY") {
            self.max_concurrency = v
                .parse()
                .map_err(|_| config_error("Invalid SHIFTSYNC_MAX_CONCURRENCY format"))?;
        }
        if let Ok(v) = env::var("SHIFTSYNC_LOCALE") {
            self.locale = v;
        }

        Ok(())
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> ShiftResult<()> {
        if self.domain.trim().is_empty() || self.domain.contains('@') {
            return Err(config_error(&format!("Invalid UID domain: {:?}", self.domain)));
        }
        if self.max_concurrency == 0 {
            return Err(config_error("max_concurrency must be at least 1"));
        }
        url::Url::parse(&self.workjam_base_url)
            .map_err(|e| config_error(&format!("Invalid Workjam base URL: {}", e)))?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_base_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_base_backoff_ms)
    }
}
