//! Configuration management for hark.
//!
//! This module provides core configuration that doesn't depend on
//! platform-specific UI libraries.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::APP_NAME;

/// Core configuration structure for the application.
///
/// Platform-specific settings like hotkeys are stored as strings and
/// interpreted by the main application.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Hotkey that toggles the meter
    /// Format: "modifier+modifier+key" e.g., "shift+alt+KeyM"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<String>,

    /// Start metering as soon as the app launches
    #[serde(default, skip_serializing_if = "is_false")]
    pub start_on_launch: bool,

    /// Lowest reported level in dB
    #[serde(default = "default_floor_db", skip_serializing_if = "is_default_floor_db")]
    pub floor_db: f32,

    /// Time constant of the average power window (in milliseconds)
    #[serde(
        default = "default_average_time_constant_ms",
        skip_serializing_if = "is_default_average_time_constant_ms"
    )]
    pub average_time_constant_ms: u32,

    /// Time constant of the peak hold decay (in milliseconds)
    #[serde(
        default = "default_peak_decay_time_constant_ms",
        skip_serializing_if = "is_default_peak_decay_time_constant_ms"
    )]
    pub peak_decay_time_constant_ms: u32,

    /// Levels are rounded to a multiple of this many dB
    #[serde(
        default = "default_resolution_db",
        skip_serializing_if = "is_default_resolution_db"
    )]
    pub resolution_db: f32,

    /// Decimal places shown in the menu
    #[serde(
        default = "default_display_precision",
        skip_serializing_if = "is_default_display_precision"
    )]
    pub display_precision: usize,
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn default_floor_db() -> f32 {
    -120.0
}

fn is_default_floor_db(v: &f32) -> bool {
    (*v - default_floor_db()).abs() < f32::EPSILON
}

fn default_average_time_constant_ms() -> u32 {
    300
}

fn is_default_average_time_constant_ms(v: &u32) -> bool {
    *v == default_average_time_constant_ms()
}

fn default_peak_decay_time_constant_ms() -> u32 {
    1500
}

fn is_default_peak_decay_time_constant_ms(v: &u32) -> bool {
    *v == default_peak_decay_time_constant_ms()
}

fn default_resolution_db() -> f32 {
    0.1
}

fn is_default_resolution_db(v: &f32) -> bool {
    (*v - default_resolution_db()).abs() < f32::EPSILON
}

fn default_display_precision() -> usize {
    1
}

fn is_default_display_precision(v: &usize) -> bool {
    *v == default_display_precision()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hotkey: None,
            start_on_launch: false,
            floor_db: default_floor_db(),
            average_time_constant_ms: default_average_time_constant_ms(),
            peak_decay_time_constant_ms: default_peak_decay_time_constant_ms(),
            resolution_db: default_resolution_db(),
            display_precision: default_display_precision(),
        }
    }
}

impl Config {
    /// Get the average power time constant as a Duration
    pub fn average_time_constant(&self) -> Duration {
        Duration::from_millis(self.average_time_constant_ms.into())
    }

    /// Get the peak decay time constant as a Duration
    pub fn peak_decay_time_constant(&self) -> Duration {
        Duration::from_millis(self.peak_decay_time_constant_ms.into())
    }

    /// Replace out of range values with their defaults.
    pub fn sanitized(mut self) -> Self {
        if !self.floor_db.is_finite() || self.floor_db >= 0.0 {
            warn!(floor_db = self.floor_db, "floor_db must be below 0 dB, using default");
            self.floor_db = default_floor_db();
        }
        if !self.resolution_db.is_finite() || self.resolution_db <= 0.0 {
            warn!(
                resolution_db = self.resolution_db,
                "resolution_db must be positive, using default"
            );
            self.resolution_db = default_resolution_db();
        }
        self
    }
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new ConfigManager with the default configuration directory.
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Creates a new ConfigManager with a specified configuration directory.
    pub fn with_config_dir<P: AsRef<std::path::Path>>(dir: P) -> Self {
        let config_path = dir.as_ref().join(format!("{}.toml", APP_NAME));
        Self { config_path }
    }

    /// Returns the default path to the configuration file.
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to retrieve configuration directory")?;
        Ok(config_dir.join(APP_NAME).join(format!("{}.toml", APP_NAME)))
    }

    /// Loads the configuration from the config file or returns default.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let config_content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file at {:?}", self.config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file at {:?}", self.config_path))?;

        Ok(config.sanitized())
    }

    /// Saves the configuration to the config file.
    pub fn save(&self, config: &Config) -> Result<()> {
        let config_dir = self
            .config_path
            .parent()
            .with_context(|| format!("Failed to get parent directory of {:?}", self.config_path))?;

        fs::create_dir_all(config_dir)
            .with_context(|| format!("Failed to create config directory at {:?}", config_dir))?;

        let serialized =
            toml::to_string_pretty(&config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, serialized)
            .with_context(|| format!("Failed to write config file at {:?}", self.config_path))?;

        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path(&self) -> &std::path::Path {
        &self.config_path
    }
}
