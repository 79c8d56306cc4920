use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::replay::SpeedRange;
use crate::util::paths::config_path;

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Playback speed limits and default
    pub speed_range: SpeedRange,
    /// Interval between frames (and playback ticks)
    pub frame_interval: Duration,
    /// Arrow-key seek distance as a fraction of the timeline
    pub seek_step: f64,
    /// Re-read interval for sessions that are still open
    pub refresh_interval: Duration,
    /// Warn when entities lack a creation timestamp
    pub warn_missing_timestamps: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed_range: SpeedRange::default(),
            frame_interval: Duration::from_millis(16),
            seek_step: 0.05,
            refresh_interval: Duration::from_secs(2),
            warn_missing_timestamps: true,
        }
    }
}

/// TOML representation of the `[playback]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlPlaybackConfig {
    pub default_speed: Option<f64>,
    pub min_speed: Option<f64>,
    pub max_speed: Option<f64>,
    pub frame_interval_ms: Option<u64>,
    pub seek_step_percent: Option<f64>,
}

/// TOML representation of the `[session]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlSessionConfig {
    pub refresh_interval_secs: Option<u64>,
    pub warn_missing_timestamps: Option<bool>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub playback: Option<TomlPlaybackConfig>,
    pub session: Option<TomlSessionConfig>,
}

impl Config {
    /// Load configuration from the default location, merging with defaults.
    ///
    /// Writes the bundled example on first run. An unreadable or invalid file is
    /// logged and ignored.
    pub fn load() -> Self {
        let config_file = config_path();

        if !config_file.exists() {
            Self::create_default_config(&config_file);
        }

        match Self::load_from(&config_file) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring config file; using defaults");
                Config::default()
            }
        }
    }

    /// Load configuration from an explicit path, merging with defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        let toml_config: TomlConfig = toml::from_str(contents)?;
        let mut config = Config::default();
        config.merge(toml_config);
        Ok(config)
    }

    fn merge(&mut self, toml_config: TomlConfig) {
        if let Some(playback) = toml_config.playback {
            let range = self.speed_range;
            self.speed_range = SpeedRange::new(
                playback.min_speed.unwrap_or(range.min),
                playback.max_speed.unwrap_or(range.max),
                playback.default_speed.unwrap_or(range.default),
            );
            if let Some(ms) = playback.frame_interval_ms {
                self.frame_interval = Duration::from_millis(ms.max(1));
            }
            if let Some(percent) = playback.seek_step_percent {
                if percent.is_finite() && percent > 0.0 {
                    self.seek_step = (percent / 100.0).min(1.0);
                }
            }
        }

        if let Some(session) = toml_config.session {
            if let Some(secs) = session.refresh_interval_secs {
                self.refresh_interval = Duration::from_secs(secs.max(1));
            }
            if let Some(warn) = session.warn_missing_timestamps {
                self.warn_missing_timestamps = warn;
            }
        }
    }

    /// Override the default speed (e.g. from the command line), clamped to the range
    pub fn with_default_speed(mut self, speed: f64) -> Self {
        let range = self.speed_range;
        self.speed_range = SpeedRange::new(range.min, range.max, speed);
        self
    }

    /// Create the default config file from the bundled example
    fn create_default_config(path: &PathBuf) {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    tracing::warn!(error = %e, "Failed to create config directory");
                    return;
                }
            }
        }

        if let Err(e) = fs::write(path, EXAMPLE_CONFIG) {
            tracing::warn!(error = %e, "Failed to write default config");
        }
    }
}
