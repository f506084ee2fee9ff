//! Application Configuration
//!
//! Tunables for segmentation, matching and extraction, stored in TOML format.
//! Every section falls back to its defaults, so a config file only needs the
//! values it changes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::catalog::DEFAULT_RECORD_CONFIDENCE;
use crate::error::{Result, ShelfError};
use crate::segmentation::{BOOK_SEPARATOR, DEFAULT_GAP_THRESHOLD};

/// Name of the config file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Segmentation settings
    pub segmentation: SegmentationConfig,
    /// Catalog matching settings
    pub matching: MatchingConfig,
    /// Extractor response handling
    pub extraction: ExtractionConfig,
    /// Storage locations
    pub storage: StorageSettings,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log filter used when RUST_LOG is not set
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Spine text segmentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Detections must score strictly above this to be clustered
    pub min_confidence: f64,
    /// Pixel gap below which neighbouring detections share a book
    pub gap_threshold: f64,
    /// Token placed between books in the serialized text
    pub separator: String,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            gap_threshold: f64::from(DEFAULT_GAP_THRESHOLD),
            separator: BOOK_SEPARATOR.to_string(),
        }
    }
}

/// Catalog matching settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum title similarity to take a catalog entry (inclusive)
    pub similarity_threshold: f64,
    /// Confidence floor for corrected records
    pub enhanced_confidence: f64,
    /// Maximum catalog entries compared per request
    pub catalog_limit: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            enhanced_confidence: 0.95,
            catalog_limit: 1000,
        }
    }
}

/// Extractor response handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Confidence given to records that arrive without one
    pub default_confidence: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_confidence: f64::from(DEFAULT_RECORD_CONFIDENCE),
        }
    }
}

/// Storage locations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// SQLite database holding accepted books
    pub database_path: Option<PathBuf>,
    /// JSON catalog file, used when no database is configured
    pub catalog_path: Option<PathBuf>,
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Where the effective configuration came from
#[derive(Debug)]
pub enum ConfigOrigin {
    /// Read from the config file
    File,
    /// No config file; defaults apply
    Defaults,
    /// The file exists but could not be read; defaults apply
    Rejected(ShelfError),
}

impl ConfigOrigin {
    /// Log how the configuration at `path` was obtained; call once the
    /// subscriber is installed
    pub fn report(&self, path: &Path) {
        match self {
            ConfigOrigin::File => info!("Loaded configuration from {:?}", path),
            ConfigOrigin::Defaults => info!("No configuration at {:?}, using defaults", path),
            ConfigOrigin::Rejected(e) => {
                warn!("Ignoring unreadable configuration {:?}: {}", path, e)
            }
        }
    }
}

/// Load configuration from `path` if it exists, otherwise use defaults.
///
/// A file that exists but cannot be parsed is ignored; the returned origin
/// says so.
pub fn load_or_default(path: &Path) -> (AppConfig, ConfigOrigin) {
    if !path.exists() {
        return (AppConfig::default(), ConfigOrigin::Defaults);
    }

    match load_config(path) {
        Ok(config) => (config, ConfigOrigin::File),
        Err(e) => (AppConfig::default(), ConfigOrigin::Rejected(e)),
    }
}
