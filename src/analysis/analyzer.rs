use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::analysis::energy::{EnergyCurve, EnergyProfiler};
use crate::analysis::strength::BeatStrengthScorer;
use crate::analysis::table::{BeatRecord, BeatTable};
use crate::audio::{AudioBuffer, AudioLoader, AudioSource, BeatDetector, Detection, SpectralFluxDetector};
use crate::config::{AnalysisConfig, Config};
use crate::error::{AnalysisError, Result};
use crate::export;
use crate::logging::Diagnostics;

/// Where the analyzer is in its pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerState {
    Created,
    Loaded,
    ProfiledAndDetected,
    Scored,
    Built,
    Failed,
}

impl fmt::Display for AnalyzerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Loaded => "loaded",
            Self::ProfiledAndDetected => "profiled and detected",
            Self::Scored => "scored",
            Self::Built => "built",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Output of the load stage
struct Loaded {
    buffer: AudioBuffer,
}

/// Output of the energy and detection stages
struct Profiled {
    buffer: AudioBuffer,
    curve: EnergyCurve,
    detection: Detection,
}

/// Output of the scoring stage
struct Scored {
    buffer: AudioBuffer,
    curve: EnergyCurve,
    detection: Detection,
    strengths: Vec<f32>,
}

/// Everything a successful run produces
#[derive(Debug, Clone)]
pub struct BeatAnalysis {
    pub buffer: AudioBuffer,
    pub curve: EnergyCurve,
    pub tempo: f32,
    pub table: BeatTable,
}

/// Headline numbers for a finished analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    pub duration: f64,
    pub sample_rate: u32,
    pub tempo: f32,
    pub beat_count: usize,
    pub min_strength: f32,
    pub mean_strength: f32,
    pub max_strength: f32,
}

/// Runs load, energy profiling, beat detection, scoring and table building
/// for one audio file, and answers beat queries on the result
///
/// Each `process` call recomputes everything. A failed run leaves the last
/// successful analysis in place.
pub struct Analyzer {
    audio_path: PathBuf,
    settings: AnalysisConfig,
    source: Box<dyn AudioSource>,
    detector: Box<dyn BeatDetector>,
    diagnostics: Diagnostics,
    state: AnalyzerState,
    analysis: Option<BeatAnalysis>,
}

impl Analyzer {
    /// Create an analyzer with the default decoder and beat detector
    pub fn new<P: AsRef<Path>>(audio_path: P, config: &Config) -> Result<Self> {
        config.validate()?;
        let diagnostics = Diagnostics::init(&config.logging)?;
        Ok(Self::with_components(
            audio_path,
            config.analysis.clone(),
            Box::new(AudioLoader),
            Box::new(SpectralFluxDetector::with_config(config.detection.clone())),
            diagnostics,
        ))
    }

    /// Create an analyzer with caller-supplied collaborators
    pub fn with_components<P: AsRef<Path>>(
        audio_path: P,
        settings: AnalysisConfig,
        source: Box<dyn AudioSource>,
        detector: Box<dyn BeatDetector>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            audio_path: audio_path.as_ref().to_path_buf(),
            settings,
            source,
            detector,
            diagnostics,
            state: AnalyzerState::Created,
            analysis: None,
        }
    }

    pub fn state(&self) -> AnalyzerState {
        self.state
    }

    pub fn audio_path(&self) -> &Path {
        &self.audio_path
    }

    /// Point the analyzer at another file; takes effect on the next `process`
    pub fn set_audio_path<P: AsRef<Path>>(&mut self, audio_path: P) {
        self.audio_path = audio_path.as_ref().to_path_buf();
    }

    pub fn set_verbose(&self, verbose: bool) {
        self.diagnostics.set_verbose(verbose);
    }

    /// Run the whole pipeline, replacing any earlier analysis on success
    pub fn process(&mut self) -> Result<()> {
        let diagnostics = self.diagnostics.clone();
        diagnostics.scope(|| {
            match self.run_pipeline() {
                Ok(analysis) => {
                    info!(
                        "Analysis complete: {} beats, {:.1} BPM",
                        analysis.table.len(),
                        analysis.tempo
                    );
                    self.analysis = Some(analysis);
                    self.state = AnalyzerState::Built;
                    Ok(())
                }
                Err(e) => {
                    error!("Analysis aborted in state '{}': {}", self.state, e);
                    self.state = AnalyzerState::Failed;
                    Err(e)
                }
            }
        })
    }

    fn run_pipeline(&mut self) -> Result<BeatAnalysis> {
        self.state = AnalyzerState::Created;
        let loaded = self.load()?;
        self.state = AnalyzerState::Loaded;
        let profiled = self.profile_and_detect(loaded)?;
        self.state = AnalyzerState::ProfiledAndDetected;
        let scored = self.score(profiled)?;
        self.state = AnalyzerState::Scored;
        self.build(scored)
    }

    fn load(&self) -> Result<Loaded> {
        debug!("Loading audio from {:?}", self.audio_path);
        let buffer = self.source.load(&self.audio_path)?;
        info!(
            "Loaded '{}': {:.2}s at {} Hz",
            self.audio_path.display(),
            buffer.duration(),
            buffer.sample_rate()
        );
        Ok(Loaded { buffer })
    }

    fn profile_and_detect(&self, loaded: Loaded) -> Result<Profiled> {
        let Loaded { buffer } = loaded;
        if buffer.is_empty() {
            return Err(AnalysisError::NotLoaded.into());
        }

        let profiler = EnergyProfiler::new(self.settings.frame_length, self.settings.hop_length)?;
        let curve = profiler.compute(&buffer)?;
        info!("RMS energy computed over {} frames", curve.len());

        let detection = self.detector.detect(&buffer)?;
        info!(
            "Beats detected: {} at {:.1} BPM",
            detection.beat_times.len(),
            detection.tempo
        );

        Ok(Profiled { buffer, curve, detection })
    }

    fn score(&self, profiled: Profiled) -> Result<Scored> {
        let Profiled { buffer, curve, detection } = profiled;
        let scorer = BeatStrengthScorer::new(self.settings.strength_window)?;
        let strengths = scorer.score(&detection.beat_times, &curve)?;
        info!("Beat strengths scored with a {:.3}s window", scorer.window());

        Ok(Scored { buffer, curve, detection, strengths })
    }

    fn build(&self, scored: Scored) -> Result<BeatAnalysis> {
        let Scored { buffer, curve, detection, strengths } = scored;
        let table = BeatTable::build(&detection.beat_times, &strengths)?;
        debug!("Beat table built with {} records", table.len());

        Ok(BeatAnalysis {
            buffer,
            curve,
            tempo: detection.tempo,
            table,
        })
    }

    /// The last successful analysis
    pub fn analysis(&self) -> Result<&BeatAnalysis> {
        self.analysis.as_ref().ok_or_else(|| {
            AnalysisError::NotReady { state: self.state.to_string() }.into()
        })
    }

    pub fn table(&self) -> Result<&BeatTable> {
        self.analysis().map(|analysis| &analysis.table)
    }

    pub fn tempo(&self) -> Result<f32> {
        self.analysis().map(|analysis| analysis.tempo)
    }

    /// The `n` strongest beats, strongest first
    pub fn top(&self, n: usize) -> Result<Vec<BeatRecord>> {
        self.logged("top", || {
            let table = self.table()?;
            let top = table.top(n);
            info!("Selected the top {} of {} beats", top.len(), table.len());
            Ok(top)
        })
    }

    /// Beats at or above percentile `p` of strength, in detection order
    pub fn above_percentile(&self, p: f64) -> Result<Vec<BeatRecord>> {
        self.logged("above_percentile", || {
            let table = self.table()?;
            let threshold = table.threshold(p)?;
            let strong = table.above_percentile(p)?;
            if let Some(threshold) = threshold {
                info!(
                    "Selected {} beats at or above the {:.0}th percentile ({:.4})",
                    strong.len(),
                    p * 100.0,
                    threshold
                );
            }
            Ok(strong)
        })
    }

    /// Write every beat to a CSV file in detection order
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.logged("save_csv", || {
            let table = self
                .analysis
                .as_ref()
                .map(|analysis| &analysis.table)
                .ok_or(AnalysisError::NotBuilt)?;

            export::write_csv(table, path)?;
            info!("Beats saved to '{}'", path.display());
            Ok(())
        })
    }

    /// Run `f` inside the diagnostic scope, logging any error it returns
    fn logged<T>(&self, operation: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.diagnostics.scope(|| {
            f().map_err(|e| {
                error!("{} failed: {}", operation, e);
                e
            })
        })
    }

    pub fn summary(&self) -> Result<AnalysisSummary> {
        let analysis = self.analysis()?;
        let strengths: Vec<f32> = analysis.table.strengths().collect();

        let (min_strength, max_strength) = strengths
            .iter()
            .fold(None, |acc: Option<(f32, f32)>, &s| match acc {
                Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
                None => Some((s, s)),
            })
            .unwrap_or((0.0, 0.0));

        let mean_strength = if strengths.is_empty() {
            0.0
        } else {
            strengths.iter().sum::<f32>() / strengths.len() as f32
        };

        Ok(AnalysisSummary {
            duration: analysis.buffer.duration(),
            sample_rate: analysis.buffer.sample_rate(),
            tempo: analysis.tempo,
            beat_count: strengths.len(),
            min_strength,
            mean_strength,
            max_strength,
        })
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("audio_path", &self.audio_path)
            .field("settings", &self.settings)
            .field("state", &self.state)
            .finish()
    }
}
