//! Configuration file support for PGLabel.
//!
//! This module provides serialization and deserialization of application settings,
//! allowing users to export and import their configuration.

use pglabel_raster::{FilterParams, DEFAULT_MIN_LEVEL_DIMENSION};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_RESIZE_DEBOUNCE_MS, DEFAULT_STROKE_THICKNESS};
use crate::detection::DetectorParams;
use crate::keybindings::KeyBindings;
use crate::zoom_math::ZoomLimits;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Pan/zoom behaviour
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// Image pyramid construction
    #[serde(default)]
    pub pyramid: PyramidConfig,

    /// Initial filter parameters for the filtered view and detection
    #[serde(default = "default_filter_params")]
    pub filter: FilterParams,

    /// Initial blob detector parameters
    #[serde(default)]
    pub detector: DetectorParams,

    /// Keybinding configuration
    #[serde(default)]
    pub keybindings: KeyBindings,
}

fn default_filter_params() -> FilterParams {
    FilterParams {
        diameter: 5,
        sigma_color: 75,
        sigma_space: 75,
    }
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Blob ring thickness in original-image pixels
    #[serde(default = "default_stroke_thickness")]
    pub stroke_thickness: f32,

    /// Draw blob overlays on load
    #[serde(default = "default_show_annotations")]
    pub show_annotations: bool,
}

fn default_stroke_thickness() -> f32 {
    DEFAULT_STROKE_THICKNESS
}

fn default_show_annotations() -> bool {
    true
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            stroke_thickness: default_stroke_thickness(),
            show_annotations: default_show_annotations(),
        }
    }
}

/// Viewport section of the config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(flatten)]
    pub zoom: ZoomLimits,

    /// Quiet period after a resize before redrawing, in milliseconds
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,
}

fn default_resize_debounce_ms() -> u64 {
    DEFAULT_RESIZE_DEBOUNCE_MS
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            zoom: ZoomLimits::default(),
            resize_debounce_ms: default_resize_debounce_ms(),
        }
    }
}

/// Pyramid section of the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyramidConfig {
    /// Halving stops once a level fits within this size on both axes
    #[serde(default = "default_min_level_dimension")]
    pub min_level_dimension: u32,
}

fn default_min_level_dimension() -> u32 {
    DEFAULT_MIN_LEVEL_DIMENSION
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            min_level_dimension: default_min_level_dimension(),
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: UserPreferences::default(),
            viewport: ViewportConfig::default(),
            pyramid: PyramidConfig::default(),
            filter: default_filter_params(),
            detector: DetectorParams::default(),
            keybindings: KeyBindings::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "pglabel-config.json"
    }

    /// Get the default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("pglabel").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("pglabel")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save(&path)
    }

    /// Write the configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
