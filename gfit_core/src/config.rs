//! Configuration file support for GFit.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/gfit/config.toml`.

use crate::{Error, IntensityLevel, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub subject: SubjectConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub plan: PlanConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// The person working out
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubjectConfig {
    #[serde(default = "default_weight_kg")]
    pub weight_kg: f64,

    /// Profile key; sync is skipped when unset
    #[serde(default)]
    pub email: Option<String>,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            weight_kg: default_weight_kg(),
            email: None,
        }
    }
}

/// Session timing
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_rest_duration_ms")]
    pub rest_duration_ms: u64,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rest_duration_ms: default_rest_duration_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            sync_interval_secs: default_sync_interval_secs(),
        }
    }
}

impl SessionConfig {
    pub fn rest_duration(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.rest_duration_ms.min(i64::MAX as u64) as i64)
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }

    pub fn sync_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sync_interval_secs)
    }
}

/// Plan generator defaults
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct PlanConfig {
    #[serde(default)]
    pub default_intensity: IntensityLevel,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("gfit")
}

fn default_weight_kg() -> f64 {
    70.0
}

fn default_rest_duration_ms() -> u64 {
    60_000
}

fn default_tick_interval_ms() -> u64 {
    1_000
}

fn default_sync_interval_secs() -> u64 {
    10
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
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values the workout core cannot run with
    pub fn validate(&self) -> Result<()> {
        if !self.subject.weight_kg.is_finite() || self.subject.weight_kg <= 0.0 {
            return Err(Error::Config(format!(
                "subject.weight_kg must be positive, got {}",
                self.subject.weight_kg
            )));
        }
        if self.session.tick_interval_ms == 0 {
            return Err(Error::Config("session.tick_interval_ms must be at least 1".into()));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("gfit").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
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
