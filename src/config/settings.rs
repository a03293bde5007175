// src/config/settings.rs
//
// Session settings, loaded from an optional TOML file.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::buffer::{DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE};
use crate::core::threshold::DEFAULT_SENSITIVITY;
use crate::error::{ReedError, Result};

/// Directory name under the home directory holding all recordings
pub const DATA_DIR_NAME: &str = ".reed_reviewer_data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Root of the baseline / subject / archive directories
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,

    /// Length of every capture, including baselines
    #[serde(default = "default_duration")]
    pub duration_secs: f64,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_channels")]
    pub channels: usize,

    /// Multiple of baseline RMS a capture must exceed to be saved
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,

    /// Pause before each capture so button clicks are not recorded
    #[serde(default = "default_guard_delay_ms")]
    pub guard_delay_ms: u64,
}

fn default_data_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

fn default_duration() -> f64 {
    1.0
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_channels() -> usize {
    DEFAULT_CHANNELS
}

fn default_sensitivity() -> f64 {
    DEFAULT_SENSITIVITY
}

fn default_guard_delay_ms() -> u64 {
    100
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            duration_secs: default_duration(),
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            sensitivity: default_sensitivity(),
            guard_delay_ms: default_guard_delay_ms(),
        }
    }
}

impl SessionConfig {
    /// Load from `path`. A missing file yields defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(ReedError::io(path, e)),
        };

        let config: Self = toml::from_str(&contents)
            .map_err(|e| ReedError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        config.validate()?;

        info!("loaded settings from {}", path.display());
        Ok(config)
    }

    /// Load from the default location, see [`config_path`]
    pub fn load_default() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ReedError::io(parent, e))?;
        }
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ReedError::InvalidConfig(format!("cannot serialise settings: {}", e)))?;
        fs::write(path, toml).map_err(|e| ReedError::io(path, e))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.duration_secs > 0.0) || !self.duration_secs.is_finite() {
            return Err(ReedError::InvalidConfig(format!(
                "duration_secs must be positive, got {}",
                self.duration_secs
            )));
        }
        if self.sample_rate == 0 {
            return Err(ReedError::InvalidConfig("sample_rate must be positive".to_string()));
        }
        if self.channels == 0 {
            return Err(ReedError::InvalidConfig("channels must be positive".to_string()));
        }
        if !(self.sensitivity >= 0.0) || !self.sensitivity.is_finite() {
            return Err(ReedError::InvalidConfig(format!(
                "sensitivity must be a non-negative number, got {}",
                self.sensitivity
            )));
        }
        Ok(())
    }

    pub fn guard_delay(&self) -> Duration {
        Duration::from_millis(self.guard_delay_ms)
    }

    pub fn with_data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = root.into();
        self
    }

    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn with_guard_delay_ms(mut self, ms: u64) -> Self {
        self.guard_delay_ms = ms;
        self
    }
}

/// `<config dir>/reedrev/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("reedrev").join("config.toml"))
}
