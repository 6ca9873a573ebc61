use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::core::catalog::ModelCatalog;
use crate::core::config::io::ConfigError;
use crate::core::inference::DEFAULT_REQUEST_TIMEOUT;
use crate::core::session::DEFAULT_INPUT_CHAR_LIMIT;
use crate::ui::theme::Theme;

const DATABASE_FILE: &str = "sessions.db";

/// Persistent user preferences. Every field is optional; absent values fall
/// back to built-in defaults, and command-line flags override all of them.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub default_model: Option<String>,
    pub database_path: Option<PathBuf>,
    pub theme: Option<String>,
    pub input_char_limit: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    DefaultModel,
    Database,
    Theme,
    InputCharLimit,
    RequestTimeout,
    ApiBaseUrl,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::DefaultModel,
        ConfigKey::Database,
        ConfigKey::Theme,
        ConfigKey::InputCharLimit,
        ConfigKey::RequestTimeout,
        ConfigKey::ApiBaseUrl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::DefaultModel => "default-model",
            ConfigKey::Database => "database",
            ConfigKey::Theme => "theme",
            ConfigKey::InputCharLimit => "input-char-limit",
            ConfigKey::RequestTimeout => "request-timeout",
            ConfigKey::ApiBaseUrl => "api-base-url",
        }
    }

    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| ConfigError::UnknownKey(name.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn invalid(key: ConfigKey, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.as_str(),
        reason: reason.into(),
    }
}

fn parse_positive<T>(key: ConfigKey, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(invalid(key, format!("expected a positive number, got '{value}'"))),
    }
}

impl Config {
    /// Validate and store `value` under `key`. Model names are resolved
    /// against `catalog` so the stored value is always an identifier.
    pub fn set(
        &mut self,
        key: ConfigKey,
        value: &str,
        catalog: &ModelCatalog,
    ) -> Result<(), ConfigError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(invalid(key, "value must not be empty"));
        }

        match key {
            ConfigKey::DefaultModel => {
                let model = catalog
                    .resolve(value)
                    .ok_or_else(|| invalid(key, format!("unknown model '{value}'")))?;
                self.default_model = Some(model.identifier.to_string());
            }
            ConfigKey::Database => self.database_path = Some(PathBuf::from(value)),
            ConfigKey::Theme => {
                if Theme::from_name(value).is_none() {
                    return Err(invalid(key, format!("unknown theme '{value}' (dark, light)")));
                }
                self.theme = Some(value.to_ascii_lowercase());
            }
            ConfigKey::InputCharLimit => {
                self.input_char_limit = Some(parse_positive(key, value)?);
            }
            ConfigKey::RequestTimeout => {
                self.request_timeout_secs = Some(parse_positive(key, value)?);
            }
            ConfigKey::ApiBaseUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(invalid(key, "expected an http:// or https:// URL"));
                }
                self.api_base_url = Some(value.to_string());
            }
        }
        Ok(())
    }

    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::DefaultModel => self.default_model = None,
            ConfigKey::Database => self.database_path = None,
            ConfigKey::Theme => self.theme = None,
            ConfigKey::InputCharLimit => self.input_char_limit = None,
            ConfigKey::RequestTimeout => self.request_timeout_secs = None,
            ConfigKey::ApiBaseUrl => self.api_base_url = None,
        }
    }

    pub fn get(&self, key: ConfigKey) -> Option<String> {
        match key {
            ConfigKey::DefaultModel => self.default_model.clone(),
            ConfigKey::Database => self
                .database_path
                .as_ref()
                .map(|path| path.display().to_string()),
            ConfigKey::Theme => self.theme.clone(),
            ConfigKey::InputCharLimit => self.input_char_limit.map(|n| n.to_string()),
            ConfigKey::RequestTimeout => self.request_timeout_secs.map(|n| n.to_string()),
            ConfigKey::ApiBaseUrl => self.api_base_url.clone(),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }

    pub fn input_char_limit(&self) -> usize {
        self.input_char_limit.unwrap_or(DEFAULT_INPUT_CHAR_LIMIT)
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }
}

/// `sessions.db` in the platform data directory, or in the working
/// directory when the platform has none.
pub fn default_database_path() -> PathBuf {
    ProjectDirs::from("org", "chatbox", "chatbox")
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}
