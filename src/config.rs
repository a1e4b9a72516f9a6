//! Application Configuration
//!
//! Read from an optional TOML file, then overridden by `SHOPPING_LIST_*`
//! environment variables. The `[backend]` table picks the persistence
//! variant at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::SortMode;
use crate::repository::{RemoteTable, DEFAULT_ITEMS_KEY};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("toml error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Persistence variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// JSON array on the device
    Local {
        #[serde(default = "default_items_key")]
        key: String,
    },
    /// Hosted table
    Remote(RemoteTable),
    /// Nothing persisted beyond the process
    Memory,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Local {
            key: default_items_key(),
        }
    }
}

fn default_items_key() -> String {
    DEFAULT_ITEMS_KEY.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default)]
    pub sort: SortMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app_name: String,
    /// Where the local backend and the remembered session live
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub backend: BackendConfig,
    pub list: ListConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "ShoppingList".to_string(),
            data_dir: PathBuf::from("data"),
            log_dir: PathBuf::from("logs"),
            backend: BackendConfig::default(),
            list: ListConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load `path` (defaults when absent or missing), apply env overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml(&text)?
            }
            _ => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Setting both `SHOPPING_LIST_REMOTE_URL` and `SHOPPING_LIST_API_KEY`
    /// switches to the remote backend.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("SHOPPING_LIST_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("SHOPPING_LIST_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(sort) = lookup("SHOPPING_LIST_SORT") {
            self.list.sort = SortMode::from_str(&sort);
        }

        if let (Some(url), Some(api_key)) = (
            lookup("SHOPPING_LIST_REMOTE_URL"),
            lookup("SHOPPING_LIST_API_KEY"),
        ) {
            let mut table = match &self.backend {
                BackendConfig::Remote(existing) => existing.clone(),
                _ => RemoteTable {
                    url: String::new(),
                    api_key: String::new(),
                    table: "shopping_items".to_string(),
                    timeout_secs: 15,
                },
            };
            table.url = url;
            table.api_key = api_key;
            if let Some(name) = lookup("SHOPPING_LIST_REMOTE_TABLE") {
                table.table = name;
            }
            self.backend = BackendConfig::Remote(table);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.trim().is_empty() {
            return Err(ConfigError::Invalid("app_name is empty".to_string()));
        }
        match &self.backend {
            BackendConfig::Local { key } if key.trim().is_empty() => {
                Err(ConfigError::Invalid("backend.key is empty".to_string()))
            }
            BackendConfig::Remote(table) => {
                if !(table.url.starts_with("http://") || table.url.starts_with("https://")) {
                    return Err(ConfigError::Invalid(format!(
                        "backend.url must be an http(s) URL, got '{}'",
                        table.url
                    )));
                }
                if table.api_key.trim().is_empty() {
                    return Err(ConfigError::Invalid("backend.api_key is empty".to_string()));
                }
                if table.table.trim().is_empty() {
                    return Err(ConfigError::Invalid("backend.table is empty".to_string()));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
