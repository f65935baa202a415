//! Runtime configuration, read from the environment (and `.env` when present).

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com/users";
pub const DEFAULT_LOG_FILE: &str = "jarurat-care.log";
pub const DEFAULT_FRAMERATE: f64 = 30.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be a positive number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Collection endpoint the patient directory reads from.
    pub api_url: String,
    pub log_file: PathBuf,
    /// UI ticks per second.
    pub framerate: f64,
    /// `None` leaves the fetch without a timeout.
    pub fetch_timeout: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            framerate: DEFAULT_FRAMERATE,
            fetch_timeout: None,
        }
    }
}

impl AppConfig {
    /// Loads `.env` if one exists, then reads `JARURAT_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = non_empty(lookup("JARURAT_API_URL")) {
            config.api_url = url;
        }
        if let Some(path) = non_empty(lookup("JARURAT_LOG_FILE")) {
            config.log_file = PathBuf::from(path);
        }
        if let Some(raw) = non_empty(lookup("JARURAT_FRAMERATE")) {
            config.framerate = parse_positive("JARURAT_FRAMERATE", &raw)?;
        }
        if let Some(raw) = non_empty(lookup("JARURAT_FETCH_TIMEOUT_SECS")) {
            let secs = parse_positive("JARURAT_FETCH_TIMEOUT_SECS", &raw)?;
            config.fetch_timeout = Some(Duration::from_secs_f64(secs));
        }

        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_positive(var: &'static str, raw: &str) -> Result<f64, ConfigError> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: raw.to_string(),
        }),
    }
}
