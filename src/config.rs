// config.rs

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use dotenv::dotenv;
use thiserror::Error;

use crate::models::message::Role;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
/// Roughly four minutes of 44.1 kHz 16-bit mono WAV
pub const DEFAULT_MAX_AUDIO_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_DB_POOL_SIZE: usize = 16;
pub const DEFAULT_DB_TIMEOUT_SECS: u64 = 5;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error when a variable is set but cannot be used
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Settings for the hosted language model
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Missing key is not a startup error; every model call fails instead
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

/// Connection pool limits for the message database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbPoolConfig {
    pub max_size: usize,
    /// Applies both to opening a connection and to waiting for a free one
    pub timeout: Duration,
}

impl Default for DbPoolConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_DB_POOL_SIZE,
            timeout: Duration::from_secs(DEFAULT_DB_TIMEOUT_SECS),
        }
    }
}

/// Server process settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub db_pool: DbPoolConfig,
    pub openai: OpenAiConfig,
    pub audio_dir: Option<PathBuf>,
    /// Largest accepted `POST /audio` body
    pub max_audio_bytes: usize,
    pub public_base_url: String,
}

/// Target language for each sender role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageMap {
    pub doctor: String,
    pub patient: String,
}

impl Default for LanguageMap {
    fn default() -> Self {
        Self {
            doctor: "es".to_string(),
            patient: "en".to_string(),
        }
    }
}

impl LanguageMap {
    /// Language a message sent by `role` is translated into
    pub fn target_for(&self, role: Role) -> &str {
        match role {
            Role::Doctor => &self.doctor,
            Role::Patient => &self.patient,
        }
    }
}

/// Conversation client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub languages: LanguageMap,
}

/// Reads an optional variable, treating an empty value as unset
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    optional_var(name).unwrap_or_else(|| default.to_string())
}

fn number_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + From<u8>,
    T::Err: std::fmt::Display,
{
    let Some(raw) = optional_var(name) else {
        return Ok(default);
    };
    let value = raw
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))?;
    if value < T::from(1) {
        return Err(ConfigError::InvalidValue(
            name.to_string(),
            "must be at least 1".to_string(),
        ));
    }
    Ok(value)
}

fn language_var(name: &str, default: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::InvalidValue(
            name.to_string(),
            "language tag must not be empty".to_string(),
        )),
        Ok(value) => Ok(value.trim().to_string()),
        Err(_) => Ok(default.to_string()),
    }
}

impl ServerConfig {
    /// Loads server settings from the environment (and `.env` when present)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let bind_raw = var_or("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDR".to_string(), e.to_string()))?;

        Ok(Self {
            bind_addr,
            database_url: optional_var("DATABASE_URL"),
            db_pool: DbPoolConfig {
                max_size: number_var("DB_POOL_MAX_SIZE", DEFAULT_DB_POOL_SIZE)?,
                timeout: Duration::from_secs(number_var(
                    "DB_TIMEOUT_SECS",
                    DEFAULT_DB_TIMEOUT_SECS,
                )?),
            },
            openai: OpenAiConfig {
                api_key: optional_var("OPENAI_API_KEY"),
                model: var_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
                base_url: var_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)
                    .trim_end_matches('/')
                    .to_string(),
            },
            audio_dir: optional_var("AUDIO_STORAGE_DIR").map(PathBuf::from),
            max_audio_bytes: number_var("MAX_AUDIO_BYTES", DEFAULT_MAX_AUDIO_BYTES)?,
            public_base_url: var_or("PUBLIC_BASE_URL", DEFAULT_SERVER_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

impl ClientConfig {
    /// Loads client settings from the environment (and `.env` when present)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        Ok(Self {
            server_url: var_or("CHAT_SERVER_URL", DEFAULT_SERVER_URL)
                .trim_end_matches('/')
                .to_string(),
            languages: LanguageMap {
                doctor: language_var("DOCTOR_TARGET_LANG", "es")?,
                patient: language_var("PATIENT_TARGET_LANG", "en")?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mapping_is_doctor_spanish_patient_english() {
        let languages = LanguageMap::default();
        assert_eq!(languages.target_for(Role::Doctor), "es");
        assert_eq!(languages.target_for(Role::Patient), "en");
    }

    #[test]
    fn custom_mapping_is_respected() {
        let languages = LanguageMap {
            doctor: "fr".to_string(),
            patient: "de".to_string(),
        };
        assert_eq!(languages.target_for(Role::Doctor), "fr");
        assert_eq!(languages.target_for(Role::Patient), "de");
    }

    #[test]
    fn numeric_settings_reject_zero_and_garbage() {
        env::set_var("CLINIC_TEST_ZERO_LIMIT", "0");
        env::set_var("CLINIC_TEST_BAD_LIMIT", "lots");
        env::set_var("CLINIC_TEST_GOOD_LIMIT", "4096");

        assert!(matches!(
            number_var("CLINIC_TEST_ZERO_LIMIT", 10usize),
            Err(ConfigError::InvalidValue(..))
        ));
        assert!(matches!(
            number_var("CLINIC_TEST_BAD_LIMIT", 10usize),
            Err(ConfigError::InvalidValue(..))
        ));
        assert_eq!(number_var("CLINIC_TEST_GOOD_LIMIT", 10usize).unwrap(), 4096);
        assert_eq!(number_var("CLINIC_TEST_UNSET_LIMIT", 10u64).unwrap(), 10);
    }
}
