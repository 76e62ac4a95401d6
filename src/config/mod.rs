//! Configuration module for the relay server
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use live_relay::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable fallbacks
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

mod env;
mod merge;
mod validation;
mod yaml;

pub use merge::{
    DEFAULT_CORS_ALLOWED_ORIGINS, DEFAULT_HOST, DEFAULT_PING_INTERVAL_SECONDS, DEFAULT_PORT,
    DEFAULT_SETUP_TIMEOUT_SECONDS, DEFAULT_STATIC_DIR,
};
pub use yaml::YamlConfig;

use crate::core::realtime::gemini::{DEFAULT_SYSTEM_INSTRUCTION, GEMINI_DEFAULT_MODEL, GEMINI_LIVE_URL};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse YAML config: {0}")]
    Parse(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Server configuration
///
/// Contains all configuration needed to run the relay:
/// - Server settings (host, port, static files, CORS)
/// - Gemini Live settings (API key, model, endpoint, system instruction, setup timeout)
/// - Keepalive interval for client connections
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,
    /// Directory served at `/`; `None` disables static files
    pub static_dir: Option<PathBuf>,
    /// "*" or a comma-separated list of allowed origins
    pub cors_allowed_origins: String,

    // Gemini Live settings
    /// Google API key. Absence is reported per session, not at startup.
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_live_url: String,
    /// System instruction sent once at session setup
    pub system_instruction: String,
    pub setup_timeout_seconds: u64,

    // Keepalive
    pub ping_interval_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: Some(PathBuf::from(DEFAULT_STATIC_DIR)),
            cors_allowed_origins: DEFAULT_CORS_ALLOWED_ORIGINS.to_string(),
            google_api_key: None,
            gemini_model: GEMINI_DEFAULT_MODEL.to_string(),
            gemini_live_url: GEMINI_LIVE_URL.to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            setup_timeout_seconds: DEFAULT_SETUP_TIMEOUT_SECONDS,
            ping_interval_seconds: DEFAULT_PING_INTERVAL_SECONDS,
        }
    }
}

impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.google_api_key {
            key.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        // .env is loaded in main.rs before this runs
        let config = merge::merge_config(None, env::EnvConfig::load()?);
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file. Values missing from the file fall
    /// back to environment variables, then defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config), env::EnvConfig::load()?);
        validation::validate_config(&config)?;
        Ok(config)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Allowed CORS origins, or `None` when any origin is allowed.
    pub fn allowed_origins(&self) -> Option<Vec<String>> {
        if self.cors_allowed_origins.trim() == "*" {
            return None;
        }
        Some(
            self.cors_allowed_origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
        )
    }

    /// Setup handshake bound in milliseconds.
    pub fn setup_timeout_ms(&self) -> u64 {
        self.setup_timeout_seconds.saturating_mul(1000)
    }
}
