use serde::Deserialize;
use std::path::Path;

use super::ConfigError;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present in
/// the file override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 8080
///   static_dir: "public"
///   cors_allowed_origins: "https://app.example.com,https://admin.example.com"
///
/// gemini:
///   api_key: "your-google-api-key"
///   model: "gemini-live-2.5-flash-preview"
///   live_url: "wss://generativelanguage.googleapis.com/ws/..."
///   system_instruction: "You are a helpful assistant."
///   setup_timeout_seconds: 15
///
/// keepalive:
///   ping_interval_seconds: 15
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub gemini: Option<GeminiYaml>,
    pub keepalive: Option<KeepaliveYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Directory served as static files; an empty string disables it
    pub static_dir: Option<String>,
    /// "*" or a comma-separated list of origins
    pub cors_allowed_origins: Option<String>,
}

/// Gemini Live configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeminiYaml {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub live_url: Option<String>,
    pub system_instruction: Option<String>,
    pub setup_timeout_seconds: Option<u64>,
}

/// Keepalive configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct KeepaliveYaml {
    pub ping_interval_seconds: Option<u64>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
