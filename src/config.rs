// ABOUTME: Configuration management for Schema Scribe
// ABOUTME: Connection profiles for the metadata store, persisted as JSON

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Config directory not found")]
    NoDirFound,
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),
    #[error("Cannot remove the last profile")]
    LastProfile,
}

/// Backend holding the system schemas
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    SqlServer,
    Sqlite,
}

/// Where and how to reach the metadata store.
///
/// `host` is the account/server address. For SQLite, `database` is the
/// directory holding `<SYSTEM>_SCHEMA.db` files and the network fields are unused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub name: String,
    #[serde(rename = "type", default)]
    pub db_type: DatabaseType,
    #[serde(default, alias = "account")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default, alias = "user")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub database: String,
    #[serde(default = "default_true")]
    pub trust_certificate: bool,
}

fn default_port() -> u16 {
    1433
}

fn default_true() -> bool {
    true
}

impl Default for ConnectionProfile {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            db_type: DatabaseType::SqlServer,
            host: "localhost".to_string(),
            port: 1433,
            username: "sa".to_string(),
            password: String::new(),
            database: String::new(),
            trust_certificate: true,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_active_profile")]
    pub active_profile: String,
    #[serde(default)]
    pub profiles: HashMap<String, ConnectionProfile>,
}

fn default_version() -> u32 {
    1
}

fn default_active_profile() -> String {
    "default".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert("default".to_string(), ConnectionProfile::default());

        Self {
            version: 1,
            active_profile: "default".to_string(),
            profiles,
        }
    }
}

impl AppConfig {
    /// Get the config file path based on OS
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoDirFound)?;
        let app_dir = config_dir.join("Schema Scribe");
        Ok(app_dir.join("config.json"))
    }

    /// Load config from the default location, or create default if not exists
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from `path`, writing a default config there if it is missing
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config at {}, creating default", path.display());
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the active connection profile
    pub fn active_profile(&self) -> Result<&ConnectionProfile, ConfigError> {
        self.profiles
            .get(&self.active_profile)
            .ok_or_else(|| ConfigError::ProfileNotFound(self.active_profile.clone()))
    }

    /// Get a mutable reference to the active profile
    pub fn active_profile_mut(&mut self) -> Result<&mut ConnectionProfile, ConfigError> {
        let active = self.active_profile.clone();
        self.profiles
            .get_mut(&active)
            .ok_or(ConfigError::ProfileNotFound(active))
    }

    /// Add or update a profile
    pub fn set_profile(&mut self, key: String, profile: ConnectionProfile) {
        self.profiles.insert(key, profile);
    }

    /// Remove a profile (cannot remove if it's the only one)
    pub fn remove_profile(&mut self, key: &str) -> Result<(), ConfigError> {
        if !self.profiles.contains_key(key) {
            return Err(ConfigError::ProfileNotFound(key.to_string()));
        }
        if self.profiles.len() <= 1 {
            return Err(ConfigError::LastProfile);
        }
        self.profiles.remove(key);

        // If we removed the active profile, switch to another one
        if self.active_profile == key {
            if let Some(first_key) = self.profiles.keys().min() {
                self.active_profile = first_key.clone();
            }
        }
        Ok(())
    }
}
