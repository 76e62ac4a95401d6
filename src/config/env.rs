use std::env;
use std::fmt::Display;
use std::str::FromStr;

use super::ConfigError;

/// Raw values read from the process environment. `None` means unset.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<String>,
    pub cors_allowed_origins: Option<String>,
    pub google_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub gemini_live_url: Option<String>,
    pub system_instruction: Option<String>,
    pub setup_timeout_seconds: Option<u64>,
    pub ping_interval_seconds: Option<u64>,
}

impl EnvConfig {
    /// Read every supported variable.
    ///
    /// # Errors
    /// Returns an error if a numeric variable is set but does not parse.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_string("HOST"),
            port: env_parse("PORT")?,
            static_dir: env_string("STATIC_DIR"),
            cors_allowed_origins: env_string("CORS_ALLOWED_ORIGINS"),
            google_api_key: env_string("GOOGLE_API_KEY"),
            gemini_model: env_string("GEMINI_MODEL"),
            gemini_live_url: env_string("GEMINI_LIVE_URL"),
            system_instruction: env_string("SYSTEM_INSTRUCTION"),
            setup_timeout_seconds: env_parse("GEMINI_SETUP_TIMEOUT_SECONDS")?,
            ping_interval_seconds: env_parse("PING_INTERVAL_SECONDS")?,
        })
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_parse<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value,
                    reason: e.to_string(),
                })
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_parse_valid_and_unset() {
        unsafe {
            env::set_var("PING_INTERVAL_SECONDS", " 20 ");
            env::remove_var("GEMINI_SETUP_TIMEOUT_SECONDS");
        }

        assert_eq!(env_parse::<u64>("PING_INTERVAL_SECONDS").unwrap(), Some(20));
        assert_eq!(
            env_parse::<u64>("GEMINI_SETUP_TIMEOUT_SECONDS").unwrap(),
            None
        );

        unsafe {
            env::remove_var("PING_INTERVAL_SECONDS");
        }
    }

    #[test]
    #[serial]
    fn test_env_parse_invalid() {
        unsafe {
            env::set_var("PORT", "eighty");
        }

        let err = EnvConfig::load().unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert!(err.to_string().contains("eighty"));

        unsafe {
            env::remove_var("PORT");
        }
    }
}
