//! # Audio Input
//!
//! The two collaborators the beat analysis depends on: an [`AudioSource`] that
//! decodes a file into a mono [`AudioBuffer`], and a [`BeatDetector`] that turns
//! that buffer into beat timestamps and a tempo.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use beat_montage::audio::{AudioLoader, AudioSource, BeatDetector, SpectralFluxDetector};
//!
//! # fn main() -> beat_montage::Result<()> {
//! let buffer = AudioLoader.load(Path::new("song.wav"))?;
//! let detection = SpectralFluxDetector::new().detect(&buffer)?;
//!
//! println!("Tempo: {:.1} BPM", detection.tempo);
//! println!("Found {} beats", detection.beat_times.len());
//! # Ok(())
//! # }
//! ```

pub mod detector;
pub mod loader;
pub mod types;

pub use detector::{BeatDetector, SpectralFluxDetector};
pub use loader::{AudioLoader, AudioSource};
pub use types::{AudioBuffer, AudioFormat, Detection};
