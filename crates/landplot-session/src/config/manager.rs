//! Configuration manager for loading, saving, and resetting session configuration

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use super::SessionConfig;

/// Config manager shared between the host and the session
pub type SharedConfig = Arc<RwLock<ConfigManager>>;

/// Errors reading or writing the config file
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

/// Loads, tracks and saves the session configuration file
pub struct ConfigManager {
    config: SessionConfig,
    config_path: PathBuf,
    dirty: bool,
}

impl ConfigManager {
    /// Create a manager for the OS-standard config file, loading it if present
    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    /// Create a manager for a specific config file, loading it if present
    pub fn with_path(config_path: PathBuf) -> Self {
        let config = Self::load_from_path(&config_path).unwrap_or_else(|| {
            tracing::info!("No usable config at {:?}, using defaults", config_path);
            SessionConfig::new()
        });

        Self {
            config,
            config_path,
            dirty: false,
        }
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("landplot")
            .join("config.ron")
    }

    fn load_from_path(path: &Path) -> Option<SessionConfig> {
        let content = std::fs::read_to_string(path).ok()?;
        match Self::parse(&content) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to parse config file: {}", e);
                None
            }
        }
    }

    /// Parse configuration text
    pub fn parse(content: &str) -> Result<SessionConfig, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Mutable access; the manager is considered dirty afterwards
    pub fn config_mut(&mut self) -> &mut SessionConfig {
        self.dirty = true;
        &mut self.config
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write pretty RON to the config path if anything changed
    pub fn save(&mut self) -> Result<(), ConfigError> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content = ron::ser::to_string_pretty(&self.config, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(&self.config_path, &content).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::info!("Saved config to {:?}", self.config_path);
        self.dirty = false;
        Ok(())
    }

    pub fn reset_to_defaults(&mut self) {
        self.config = SessionConfig::new();
        self.dirty = true;
    }

    pub fn config_file_path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Load the default config file into a [`SharedConfig`]
pub fn create_shared_config() -> SharedConfig {
    Arc::new(RwLock::new(ConfigManager::new()))
}
