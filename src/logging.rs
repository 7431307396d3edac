//! Diagnostic stream with a console sink and an optional file sink.
//!
//! The stream is a scoped [`Dispatch`] rather than a global subscriber, so each
//! [`Analyzer`](crate::analysis::Analyzer) carries its own sinks and releases the
//! log file when it is dropped.

use std::fs::{self, File, OpenOptions};
use std::sync::{Arc, Mutex};

use tracing::Dispatch;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, reload, Layer, Registry};

use crate::config::LoggingConfig;
use crate::error::Result;

type ConsoleLevelHandle = reload::Handle<LevelFilter, Registry>;

/// Owns the diagnostic dispatch and the handle that adjusts console verbosity
#[derive(Clone)]
pub struct Diagnostics {
    dispatch: Dispatch,
    console_level: ConsoleLevelHandle,
    verbose: Arc<Mutex<bool>>,
}

impl Diagnostics {
    /// Build the console sink and, when configured, the file sink
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let (level_filter, console_level) = reload::Layer::new(console_level(config.verbose));

        let console = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(level_filter);

        let file_layer = match &config.log_file {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                let file: File = OpenOptions::new().create(true).append(true).open(path)?;
                Some(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_filter(LevelFilter::TRACE),
                )
            }
            None => None,
        };

        let subscriber = Registry::default().with(console).with(file_layer);

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            console_level,
            verbose: Arc::new(Mutex::new(config.verbose)),
        })
    }

    /// Run `f` with this stream as the active diagnostic sink
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Switch the console between informational and warnings-only output
    pub fn set_verbose(&self, verbose: bool) {
        if let Err(e) = self.console_level.modify(|level| *level = console_level(verbose)) {
            self.scope(|| tracing::warn!("Could not change console log level: {}", e));
            return;
        }
        if let Ok(mut current) = self.verbose.lock() {
            *current = verbose;
        }
        self.scope(|| tracing::info!("Verbose mode set to {}", verbose));
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose.lock().map(|v| *v).unwrap_or(false)
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("verbose", &self.is_verbose())
            .finish()
    }
}

fn console_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_file_sink_captures_debug_and_creates_parent() {
        let dir = tempdir().unwrap();
        let log_file = dir.path().join("logs").join("montage.log");

        let diagnostics = Diagnostics::init(&LoggingConfig {
            verbose: false,
            log_file: Some(log_file.clone()),
        })
        .unwrap();

        diagnostics.scope(|| {
            tracing::debug!("debug line for the file");
            tracing::error!("error line for everyone");
        });
        drop(diagnostics);

        let contents = fs::read_to_string(&log_file).unwrap();
        assert!(contents.contains("debug line for the file"));
        assert!(contents.contains("error line for everyone"));
    }

    #[test]
    fn test_set_verbose_toggles_state() {
        let diagnostics = Diagnostics::init(&LoggingConfig::default()).unwrap();
        assert!(!diagnostics.is_verbose());

        assert_eq!(diagnostics.console_level.clone_current(), Some(LevelFilter::WARN));
        assert!(!info_enabled(&diagnostics));

        diagnostics.set_verbose(true);
        assert!(diagnostics.is_verbose());
        assert_eq!(diagnostics.console_level.clone_current(), Some(LevelFilter::INFO));
        assert!(info_enabled(&diagnostics));

        diagnostics.set_verbose(false);
        assert!(!diagnostics.is_verbose());
        assert_eq!(diagnostics.console_level.clone_current(), Some(LevelFilter::WARN));
        assert!(!info_enabled(&diagnostics));
    }

    fn info_enabled(diagnostics: &Diagnostics) -> bool {
        diagnostics.scope(|| tracing::enabled!(tracing::Level::INFO))
    }

    #[test]
    fn test_unwritable_log_file_is_io_error() {
        let dir = tempdir().unwrap();
        // A directory cannot be opened as a log file
        let err = Diagnostics::init(&LoggingConfig {
            verbose: false,
            log_file: Some(PathBuf::from(dir.path())),
        })
        .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
