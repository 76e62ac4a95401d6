use url::Url;

use super::{ConfigError, ServerConfig};

/// Validate a merged configuration.
///
/// A missing Google API key is accepted here; sessions report it instead.
pub fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
    validate_positive("ping_interval_seconds", config.ping_interval_seconds)?;
    validate_positive("setup_timeout_seconds", config.setup_timeout_seconds)?;
    validate_live_url(&config.gemini_live_url)?;
    Ok(())
}

fn validate_positive(key: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{key} must be greater than 0"
        )));
    }
    Ok(())
}

fn validate_live_url(value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| {
        ConfigError::Validation(format!("gemini_live_url '{value}' is not a valid URL: {e}"))
    })?;

    match url.scheme() {
        "ws" | "wss" => Ok(()),
        other => Err(ConfigError::Validation(format!(
            "gemini_live_url must use ws or wss, got '{other}'"
        ))),
    }
}
