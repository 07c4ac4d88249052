//! Configuration management for libris.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "libris";

/// Default books collection file name.
const BOOKS_FILE_NAME: &str = "books.json";

/// Default users collection file name.
const USERS_FILE_NAME: &str = "users.json";

/// Default checkouts collection file name.
const CHECKOUTS_FILE_NAME: &str = "checkouts.json";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `LIBRIS_`)
/// 2. TOML config file at `~/.config/libris/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the collection files.
    /// Defaults to `~/.local/share/libris`
    pub data_dir: Option<PathBuf>,
    /// File name of the books collection.
    pub books_file: String,
    /// File name of the users collection.
    pub users_file: String,
    /// File name of the checkouts collection.
    pub checkouts_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None, // Will be resolved to default at runtime
            books_file: BOOKS_FILE_NAME.to_string(),
            users_file: USERS_FILE_NAME.to_string(),
            checkouts_file: CHECKOUTS_FILE_NAME.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("LIBRIS_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("books_file", &self.storage.books_file),
            ("users_file", &self.storage.users_file),
            ("checkouts_file", &self.storage.checkouts_file),
        ];

        for (field, name) in &names {
            if name.is_empty() {
                return Err(Error::ConfigValidation {
                    message: format!("{field} must not be empty"),
                });
            }
            if name.contains('/') || name.contains('\\') {
                return Err(Error::ConfigValidation {
                    message: format!("{field} must be a plain file name, got '{name}'"),
                });
            }
        }

        // One collection per file
        for (i, (field_a, name_a)) in names.iter().enumerate() {
            for (field_b, name_b) in &names[i + 1..] {
                if name_a == name_b {
                    return Err(Error::ConfigValidation {
                        message: format!("{field_a} and {field_b} must differ, both are '{name_a}'"),
                    });
                }
            }
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the path to the books collection file.
    #[must_use]
    pub fn books_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.books_file)
    }

    /// Get the path to the users collection file.
    #[must_use]
    pub fn users_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.users_file)
    }

    /// Get the path to the checkouts collection file.
    #[must_use]
    pub fn checkouts_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.checkouts_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.data_dir.is_none());
        assert_eq!(config.storage.books_file, "books.json");
        assert_eq!(config.storage.users_file, "users.json");
        assert_eq!(config.storage.checkouts_file, "checkouts.json");
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_file_name() {
        let mut config = Config::default();
        config.storage.books_file = String::new();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("books_file"));
    }

    #[test]
    fn test_validate_path_separator_rejected() {
        let mut config = Config::default();
        config.storage.users_file = "nested/users.json".to_string();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("plain file name"));
    }

    #[test]
    fn test_validate_duplicate_file_names() {
        let mut config = Config::default();
        config.storage.checkouts_file = "books.json".to_string();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("must differ"));
    }

    #[test]
    fn test_collection_paths_use_data_dir() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/var/lib/library"));

        assert_eq!(
            config.books_path(),
            PathBuf::from("/var/lib/library/books.json")
        );
        assert_eq!(
            config.users_path(),
            PathBuf::from("/var/lib/library/users.json")
        );
        assert_eq!(
            config.checkouts_path(),
            PathBuf::from("/var/lib/library/checkouts.json")
        );
    }

    #[test]
    fn test_collection_paths_default() {
        let config = Config::default();
        assert!(config
            .books_path()
            .to_string_lossy()
            .contains("books.json"));
        assert!(config.books_path().to_string_lossy().contains("libris"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("libris"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_storage_config_deserialize() {
        let json = r#"{"books_file": "catalog.json", "data_dir": "/tmp/lib"}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.books_file, "catalog.json");
        assert_eq!(storage.data_dir, Some(PathBuf::from("/tmp/lib")));
        // Unspecified fields fall back to defaults
        assert_eq!(storage.users_file, "users.json");
    }

    #[test]
    fn test_config_serialize() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("books_file"));
        assert!(json.contains("checkouts_file"));
    }

    #[test]
    fn test_config_clone() {
        let config = Config::default();
        let cloned = config.clone();
        assert_eq!(config, cloned);
    }
}
