//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Artifacts ===
    /// Training CSV consumed by `train`.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Persisted classifier written by `train` and read by the predictor.
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Version string reported with every prediction.
    #[serde(default = "default_model_version")]
    pub model_version: String,

    // === Server Configuration ===
    /// HTTP bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/health_samples.csv")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/health_model.json")
}

fn default_model_version() -> String {
    "0.1.0".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            model_path: default_model_path(),
            model_version: default_model_version(),
            host: default_host(),
            port: default_port(),
            rust_log: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.data_path.as_os_str().is_empty() {
            return Err("DATA_PATH must not be empty".to_string());
        }

        if self.model_path.as_os_str().is_empty() {
            return Err("MODEL_PATH must not be empty".to_string());
        }

        if self.model_version.trim().is_empty() {
            return Err("MODEL_VERSION must not be empty".to_string());
        }

        Ok(())
    }

    /// `host:port` string for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
