//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/ghisa/config.toml`.
//! Everything has a sensible default so a missing or partial file works.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Timer polling configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Periodic tick interval driving phase advancement and display
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_millis: default_tick_millis(),
        }
    }
}

/// Fallback parameters when the plan leaves a value unspecified
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: u32,

    #[serde(default = "default_tabata_work_seconds")]
    pub tabata_work_seconds: u32,

    #[serde(default = "default_tabata_rest_seconds")]
    pub tabata_rest_seconds: u32,

    #[serde(default = "default_tabata_rounds")]
    pub tabata_rounds: u32,

    #[serde(default = "default_emom_interval_seconds")]
    pub emom_interval_seconds: u32,

    #[serde(default = "default_amrap_seconds")]
    pub amrap_seconds: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            rest_seconds: default_rest_seconds(),
            tabata_work_seconds: default_tabata_work_seconds(),
            tabata_rest_seconds: default_tabata_rest_seconds(),
            tabata_rounds: default_tabata_rounds(),
            emom_interval_seconds: default_emom_interval_seconds(),
            amrap_seconds: default_amrap_seconds(),
        }
    }
}

// Default value functions
fn default_tick_millis() -> u64 {
    250
}

fn default_rest_seconds() -> u32 {
    90
}

fn default_tabata_work_seconds() -> u32 {
    20
}

fn default_tabata_rest_seconds() -> u32 {
    10
}

fn default_tabata_rounds() -> u32 {
    8
}

fn default_emom_interval_seconds() -> u32 {
    60
}

fn default_amrap_seconds() -> u32 {
    300
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("ghisa").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
