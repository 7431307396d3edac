use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the beat-montage library
#[derive(Error, Debug)]
pub enum MontageError {
    #[error("Audio processing error: {0}")]
    Audio(#[from] AudioError),

    #[error("Beat analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Audio loading and beat detection errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load audio file {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Beat detection failed: {reason}")]
    DetectionFailed { reason: String },

    #[error("Invalid audio parameters: {details}")]
    InvalidParameters { details: String },
}

/// Errors raised by the energy / strength / ranking stages
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Audio is not loaded: the sample buffer is empty")]
    NotLoaded,

    #[error("Beat table has not been built; run process() first")]
    NotBuilt,

    #[error("Analyzer is not ready for queries (state: {state})")]
    NotReady { state: String },

    #[error("Stage '{stage}' is missing its input: {missing}")]
    MissingStageOutput { stage: &'static str, missing: &'static str },

    #[error("Beat times and strengths differ in length: {beats} beats, {strengths} strengths")]
    ShapeMismatch { beats: usize, strengths: usize },

    #[error("Percentile must be in (0, 1], got {value}")]
    InvalidPercentile { value: f64 },

    #[error("Invalid analysis parameters: {details}")]
    InvalidParameters { details: String },
}

/// Errors writing analysis results to disk
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Flat classification of every error the pipeline can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Load,
    NotLoaded,
    NotBuilt,
    NotReady,
    Detection,
    ShapeMismatch,
    InvalidPercentile,
    InvalidParameters,
    Export,
    Config,
    Io,
}

/// Convenience type alias for Results using MontageError
pub type Result<T> = std::result::Result<T, MontageError>;

impl MontageError {
    /// Classify this error without matching on the nested enums
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Audio(AudioError::LoadFailed { .. })
            | Self::Audio(AudioError::UnsupportedFormat { .. }) => ErrorKind::Load,
            Self::Audio(AudioError::DetectionFailed { .. }) => ErrorKind::Detection,
            Self::Audio(AudioError::InvalidParameters { .. })
            | Self::Analysis(AnalysisError::InvalidParameters { .. }) => ErrorKind::InvalidParameters,
            Self::Analysis(AnalysisError::NotLoaded)
            | Self::Analysis(AnalysisError::MissingStageOutput { .. }) => ErrorKind::NotLoaded,
            Self::Analysis(AnalysisError::NotBuilt) => ErrorKind::NotBuilt,
            Self::Analysis(AnalysisError::NotReady { .. }) => ErrorKind::NotReady,
            Self::Analysis(AnalysisError::ShapeMismatch { .. }) => ErrorKind::ShapeMismatch,
            Self::Analysis(AnalysisError::InvalidPercentile { .. }) => ErrorKind::InvalidPercentile,
            Self::Export(_) => ErrorKind::Export,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Audio(AudioError::LoadFailed { path, .. }) => {
                format!("Could not load audio file '{}'. Please check the file exists and is a supported format.", path)
            }
            Self::Audio(AudioError::UnsupportedFormat { format }) => {
                format!("Audio format '{}' is not supported. Use wav, mp3, flac, ogg, m4a or aac.", format)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            Self::Export(ExportError::WriteFailed { path, .. }) => {
                format!("Could not write beats to '{}'.", path.display())
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err: MontageError = AnalysisError::InvalidPercentile { value: 1.5 }.into();
        assert_eq!(err.kind(), ErrorKind::InvalidPercentile);

        let err: MontageError = AudioError::UnsupportedFormat { format: "xyz".into() }.into();
        assert_eq!(err.kind(), ErrorKind::Load);

        let err: MontageError = AudioError::DetectionFailed { reason: "fft".into() }.into();
        assert_eq!(err.kind(), ErrorKind::Detection);
    }

    #[test]
    fn test_user_message_mentions_path() {
        let err: MontageError = AudioError::LoadFailed {
            path: "song.mp3".into(),
            reason: "no such file".into(),
        }
        .into();
        assert!(err.user_message().contains("song.mp3"));
    }
}
