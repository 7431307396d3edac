use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for beat-montage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Energy profiling and strength scoring
    pub analysis: AnalysisConfig,

    /// Beat detector settings
    pub detection: DetectionConfig,

    /// Diagnostic stream settings
    pub logging: LoggingConfig,

    /// Query defaults and export location
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        self.detection.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Energy curve framing and beat strength window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Samples per RMS frame
    pub frame_length: usize,

    /// Samples between consecutive RMS frames
    pub hop_length: usize,

    /// Width in seconds of the window centred on each beat
    pub strength_window: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_length: 2048,
            hop_length: 512,
            strength_window: 0.05,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.frame_length == 0 {
            return Err(invalid("analysis.frame_length", self.frame_length).into());
        }

        if self.hop_length == 0 {
            return Err(invalid("analysis.hop_length", self.hop_length).into());
        }

        if !(self.strength_window > 0.0 && self.strength_window.is_finite()) {
            return Err(invalid("analysis.strength_window", self.strength_window).into());
        }

        Ok(())
    }
}

/// Spectral flux beat detector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// FFT window size
    pub window_size: usize,

    /// Hop size between FFT windows
    pub hop_size: usize,

    /// Minimum BPM to detect
    pub min_bpm: f32,

    /// Maximum BPM to detect
    pub max_bpm: f32,

    /// Peak picking sensitivity (0.0-1.0)
    pub sensitivity: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            window_size: 1024,
            hop_size: 512,
            min_bpm: 60.0,
            max_bpm: 200.0,
            sensitivity: 0.7,
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size < 2 || !self.window_size.is_power_of_two() {
            return Err(invalid("detection.window_size", self.window_size).into());
        }

        if self.hop_size == 0 {
            return Err(invalid("detection.hop_size", self.hop_size).into());
        }

        if self.min_bpm <= 0.0 || self.min_bpm >= self.max_bpm {
            return Err(invalid(
                "detection.bpm_range",
                format!("{}-{}", self.min_bpm, self.max_bpm),
            )
            .into());
        }

        if !(0.0..=1.0).contains(&self.sensitivity) {
            return Err(invalid("detection.sensitivity", self.sensitivity).into());
        }

        Ok(())
    }
}

/// Console verbosity and optional log file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Show informational messages on the console, not just warnings
    pub verbose: bool,

    /// Capture every diagnostic level to this file
    pub log_file: Option<PathBuf>,
}

/// Defaults for beat queries and CSV export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// How many beats `top` returns
    pub top_n: usize,

    /// Percentile used to select strong beats, in (0, 1]
    pub percentile: f64,

    /// Where the beat table is written
    pub csv_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            percentile: 0.75,
            csv_path: PathBuf::from("beat_times.csv"),
        }
    }
}

impl OutputConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.percentile > 0.0 && self.percentile <= 1.0) {
            return Err(invalid("output.percentile", self.percentile).into());
        }

        Ok(())
    }
}
