use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::constants::{DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::models::{Account, Platform};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Loader configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // HTTP
    pub request_timeout: Duration,
    pub user_agent: String,

    // Paging
    pub page_size: u32,

    // Filtering
    pub filter_rules_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // HTTP
            request_timeout: Duration::from_secs(parse_env_u64(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            user_agent: env_or_default("USER_AGENT", DEFAULT_USER_AGENT),

            // Paging
            page_size: parse_env_u32("PAGE_SIZE", DEFAULT_PAGE_SIZE)?,

            // Filtering
            filter_rules_path: optional_env("FILTER_RULES_PATH").map(PathBuf::from),
        })
    }

    /// Configuration with defaults, for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            filter_rules_path: None,
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "PAGE_SIZE".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "REQUEST_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.user_agent.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "USER_AGENT".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Account settings for the command-line loader.
pub struct AccountConfig;

impl AccountConfig {
    /// Build the account to load conversations through from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_env() -> Result<Account, ConfigError> {
        let platform: Platform = match required_env("ACCOUNT_PLATFORM")?.parse() {
            Ok(platform) => platform,
            Err(never) => match never {},
        };
        let api_base_url = required_env("ACCOUNT_API_BASE_URL")?;
        if url::Url::parse(&api_base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                name: "ACCOUNT_API_BASE_URL".to_string(),
                message: format!("not a valid URL: '{api_base_url}'"),
            });
        }

        Ok(Account {
            key: env_or_default("ACCOUNT_KEY", "default"),
            platform,
            api_base_url,
            web_base_url: optional_env("ACCOUNT_WEB_BASE_URL"),
            access_token: optional_env("ACCOUNT_ACCESS_TOKEN"),
            is_official: parse_env_bool("ACCOUNT_OFFICIAL", false)?,
        })
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}
