#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Allow truncation when narrowing the clamped speed value back to its storage type
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

// Global configuration instance with thread-safe access
pub static CONFIG: Lazy<Arc<RwLock<Config>>> =
    Lazy::new(|| Arc::new(RwLock::new(Config::default())));

// Modification time of the config file as of the last (re)load
static LAST_MODIFIED: Lazy<RwLock<Option<SystemTime>>> = Lazy::new(|| RwLock::new(None));

// Fallback path when no config directory is available
const CONFIG_FILE_PATH: &str = "config/blockfall.toml";

pub const DEFAULT_SPEED: u8 = 50;
pub const MAX_SPEED: u8 = 100;
pub const SPEED_STEP: i16 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Drop-speed setting in 0..=100; 50 is neutral, lower is slower,
    /// higher is faster.
    pub speed: u8,
    pub show_ghost: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            show_ghost: true,
        }
    }
}

impl Config {
    /// Multiplier applied to the drop interval. Settings at or below
    /// the neutral point stretch the interval up to 2x; settings above
    /// it shrink the interval down to a 0.35 floor.
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        let v = f32::from(self.speed.min(MAX_SPEED));
        if v <= 50.0 {
            1.0 + (50.0 - v) / 50.0
        } else {
            1.0 - 0.65 * (v - 50.0) / 50.0
        }
    }
}

/// Current speed multiplier from the global configuration.
#[must_use]
pub fn speed_multiplier() -> f32 {
    CONFIG.read().unwrap().speed_multiplier()
}

/// Nudges the speed setting by `delta` steps of 5, clamped to the
/// valid range, and persists the result. Returns the new setting.
pub fn adjust_speed(delta: i16) -> u8 {
    let snapshot = {
        let mut config = CONFIG.write().unwrap();
        let speed = (i16::from(config.speed) + delta * SPEED_STEP).clamp(0, i16::from(MAX_SPEED));
        config.speed = speed as u8;
        config.clone()
    };
    if let Err(e) = save_config_to_file(&snapshot) {
        log::warn!("failed to persist speed setting: {e:?}");
    }
    snapshot.speed
}

/// Loads the configuration, creating a default file on first run. A
/// malformed file is reported as an error so the caller can fall back
/// to defaults.
pub fn load_config_from_file() -> Result<Config, ConfigError> {
    let config_path = config_file_path();
    let config = load_config_from_path(&config_path)?;
    if let Ok(metadata) = fs::metadata(&config_path) {
        *LAST_MODIFIED.write().unwrap() = metadata.modified().ok();
    }
    Ok(config)
}

pub fn load_config_from_path(config_path: &Path) -> Result<Config, ConfigError> {
    if !config_path.exists() {
        let default_config = Config::default();
        save_config_to_path(&default_config, config_path)?;
        return Ok(default_config);
    }

    let contents = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

pub fn save_config_to_file(config: &Config) -> Result<(), ConfigError> {
    let config_path = config_file_path();
    save_config_to_path(config, &config_path)?;

    // Remember our own write so the reload check doesn't re-read it
    if let Ok(metadata) = fs::metadata(&config_path) {
        *LAST_MODIFIED.write().unwrap() = metadata.modified().ok();
    }
    Ok(())
}

pub fn save_config_to_path(config: &Config, config_path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = config_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let toml_string = toml::to_string_pretty(config)?;
    fs::write(config_path, toml_string)?;
    Ok(())
}

/// Re-reads the config file if its modification time changed since the
/// last load, swapping the global configuration on success, so edits
/// to the file apply without restarting the game.
pub fn reload_if_changed() -> bool {
    let config_path = config_file_path();
    let Ok(metadata) = fs::metadata(&config_path) else {
        return false;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };
    if *LAST_MODIFIED.read().unwrap() == Some(modified) {
        return false;
    }
    *LAST_MODIFIED.write().unwrap() = Some(modified);

    match load_config_from_path(&config_path) {
        Ok(new_config) => {
            *CONFIG.write().unwrap() = new_config;
            true
        }
        Err(e) => {
            log::warn!("ignoring malformed config file: {e:?}");
            false
        }
    }
}

// Env override first, then the platform config directory
fn config_file_path() -> PathBuf {
    if let Ok(path) = std::env::var("BLOCKFALL_CONFIG") {
        return PathBuf::from(path);
    }
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("blockfall").join("config.toml")
    } else {
        PathBuf::from(CONFIG_FILE_PATH)
    }
}

// Custom error type for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::Serialize(err)
    }
}
