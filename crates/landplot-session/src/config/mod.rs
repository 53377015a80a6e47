//! Session configuration module
//!
//! This module handles configuration for the interaction session: rotation
//! pivot, where shapes are stored, and how distances are reported.

mod manager;

pub use manager::{ConfigError, ConfigManager, SharedConfig, create_shared_config};

use std::path::PathBuf;

use landplot_core::PivotMode;
use serde::{Deserialize, Serialize};

use crate::store::DEFAULT_STORAGE_KEY;

/// Rotation gesture settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RotationConfig {
    /// Pivot used for two-finger rotation
    #[serde(default)]
    pub pivot: PivotMode,
}

/// Where saved shapes live
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Key the whole collection is stored under
    pub key: String,
    /// Storage directory; the OS data directory when unset
    pub directory: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            directory: None,
        }
    }
}

/// Distance measuring settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasureConfig {
    /// Decimals shown when reporting kilometers
    pub distance_decimals: usize,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            distance_decimals: 2,
        }
    }
}

/// Complete session configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionConfig {
    /// Configuration format version
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub measure: MeasureConfig,
}

impl SessionConfig {
    /// Current configuration version
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            ..Default::default()
        }
    }
}
