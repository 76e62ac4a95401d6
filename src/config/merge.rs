use std::path::PathBuf;

use super::ServerConfig;
use super::env::EnvConfig;
use super::yaml::YamlConfig;
use crate::core::realtime::gemini::{DEFAULT_SYSTEM_INSTRUCTION, GEMINI_DEFAULT_MODEL, GEMINI_LIVE_URL};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STATIC_DIR: &str = "public";
pub const DEFAULT_CORS_ALLOWED_ORIGINS: &str = "*";
pub const DEFAULT_SETUP_TIMEOUT_SECONDS: u64 = 15;
pub const DEFAULT_PING_INTERVAL_SECONDS: u64 = 15;

/// Merge YAML values over environment values over defaults.
///
/// Empty strings count as unset, except for `static_dir` where an empty
/// value disables static file serving.
pub fn merge_config(yaml: Option<YamlConfig>, env: EnvConfig) -> ServerConfig {
    let yaml = yaml.unwrap_or_default();
    let server = yaml.server.unwrap_or_default();
    let gemini = yaml.gemini.unwrap_or_default();
    let keepalive = yaml.keepalive.unwrap_or_default();

    let static_dir = server
        .static_dir
        .or(env.static_dir)
        .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());

    ServerConfig {
        host: non_empty(server.host)
            .or(non_empty(env.host))
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: server.port.or(env.port).unwrap_or(DEFAULT_PORT),
        static_dir: (!static_dir.trim().is_empty()).then(|| PathBuf::from(static_dir)),
        cors_allowed_origins: non_empty(server.cors_allowed_origins)
            .or(non_empty(env.cors_allowed_origins))
            .unwrap_or_else(|| DEFAULT_CORS_ALLOWED_ORIGINS.to_string()),
        google_api_key: non_empty(gemini.api_key).or(non_empty(env.google_api_key)),
        gemini_model: non_empty(gemini.model)
            .or(non_empty(env.gemini_model))
            .unwrap_or_else(|| GEMINI_DEFAULT_MODEL.to_string()),
        gemini_live_url: non_empty(gemini.live_url)
            .or(non_empty(env.gemini_live_url))
            .unwrap_or_else(|| GEMINI_LIVE_URL.to_string()),
        system_instruction: non_empty(gemini.system_instruction)
            .or(non_empty(env.system_instruction))
            .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string()),
        setup_timeout_seconds: gemini
            .setup_timeout_seconds
            .or(env.setup_timeout_seconds)
            .unwrap_or(DEFAULT_SETUP_TIMEOUT_SECONDS),
        ping_interval_seconds: keepalive
            .ping_interval_seconds
            .or(env.ping_interval_seconds)
            .unwrap_or(DEFAULT_PING_INTERVAL_SECONDS),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
