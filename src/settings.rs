//! Runtime settings
//!
//! Read from a JSON file; every field is optional and falls back to its
//! default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::MAX_FRAME_DT;

/// Environment variable naming the settings file
pub const SETTINGS_ENV: &str = "LITTLE_ECHOES_SETTINGS";

/// Errors loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed; `None` derives one from the clock
    pub seed: Option<u64>,
    /// Initial state of the music/sound toggle
    pub music_enabled: bool,
    /// Step the simulation at a fixed rate instead of once per frame
    pub fixed_timestep: bool,
    /// Largest frame dt fed to the simulation (seconds)
    pub max_frame_dt: f32,
    /// Headless runner: let the autopilot play
    pub autopilot: bool,
    /// Headless runner: how long to play (seconds)
    pub run_seconds: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            music_enabled: true,
            fixed_timestep: true,
            max_frame_dt: MAX_FRAME_DT,
            autopilot: true,
            run_seconds: 60.0,
        }
    }
}

impl Settings {
    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from the file named by `LITTLE_ECHOES_SETTINGS`, or defaults.
    /// A broken file is reported and replaced by defaults.
    pub fn load() -> Self {
        let Ok(path) = std::env::var(SETTINGS_ENV) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path);
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file {}: {}", path, e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if !self.max_frame_dt.is_finite() || self.max_frame_dt <= 0.0 {
            return Err(SettingsError::Invalid {
                field: "max_frame_dt",
                reason: "must be a positive number",
            });
        }
        if !self.run_seconds.is_finite() || self.run_seconds < 0.0 {
            return Err(SettingsError::Invalid {
                field: "run_seconds",
                reason: "must be zero or more",
            });
        }
        Ok(())
    }

    /// Seed to use for this run
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
    }
}
