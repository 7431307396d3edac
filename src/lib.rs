//! # Beat-Montage
//!
//! Find the strongest beats in a music track so that beat-synced video
//! overlays can be placed on them.
//!
//! The library loads an audio file, computes a short-time RMS energy curve,
//! detects beats, scores each beat by the energy around it, and exposes the
//! result as a table of `(time, strength)` records that can be ranked or
//! filtered by percentile.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use beat_montage::{Analyzer, Config};
//!
//! # fn main() -> beat_montage::Result<()> {
//! let config = Config::default();
//! let mut analyzer = Analyzer::new("song.mp3", &config)?;
//! analyzer.process()?;
//!
//! for beat in analyzer.above_percentile(0.75)? {
//!     println!("{:.3}s  {:.4}", beat.time, beat.strength);
//! }
//! analyzer.save_csv("beat_times.csv")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`audio`] - Decoding and beat detection collaborators
//! - [`analysis`] - Energy curve, strength scoring, beat table, orchestration
//! - [`export`] - CSV output
//! - [`config`] - Configuration management
//! - [`logging`] - Console and file diagnostic sinks
//!
//! ## Custom collaborators
//!
//! Any decoder or beat tracker can be plugged in through the
//! [`AudioSource`](audio::AudioSource) and [`BeatDetector`](audio::BeatDetector)
//! traits:
//!
//! ```rust,no_run
//! use beat_montage::audio::{AudioBuffer, BeatDetector, Detection};
//!
//! struct Metronome;
//!
//! impl BeatDetector for Metronome {
//!     fn detect(&self, buffer: &AudioBuffer) -> beat_montage::Result<Detection> {
//!         let beat_times = (0..)
//!             .map(|i| i as f64 * 0.5)
//!             .take_while(|&t| t <= buffer.duration())
//!             .collect();
//!         Ok(Detection { tempo: 120.0, beat_times })
//!     }
//! }
//! ```

pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;

// Re-export commonly used types for convenience
pub use crate::{
    analysis::{Analyzer, AnalyzerState, BeatRecord, BeatTable},
    config::Config,
    error::{ErrorKind, MontageError, Result},
};
