//! # Beat Strength Analysis
//!
//! Energy profiling, per-beat strength scoring and ranking, plus the
//! [`Analyzer`] that runs them in order over one audio file.
//!
//! ```text
//! AudioSource ─► AudioBuffer ─┬─► EnergyProfiler ─► EnergyCurve ─┐
//!                             └─► BeatDetector ──► beat times ───┴─► BeatStrengthScorer ─► BeatTable
//! ```

pub mod analyzer;
pub mod energy;
pub mod strength;
pub mod table;

pub use analyzer::{AnalysisSummary, Analyzer, AnalyzerState, BeatAnalysis};
pub use energy::{EnergyCurve, EnergyLevel, EnergyProfiler};
pub use strength::BeatStrengthScorer;
pub use table::{BeatRecord, BeatTable};
