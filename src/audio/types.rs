use std::path::PathBuf;

/// Decoded, mono audio ready for analysis
///
/// Immutable once produced by an [`AudioSource`](crate::audio::AudioSource).
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Mono samples in the range -1.0..=1.0
    samples: Vec<f32>,

    /// Sample rate in Hz
    sample_rate: u32,

    /// Channel count of the source before mixdown
    source_channels: u16,

    /// Original file path
    file_path: PathBuf,

    /// Audio format information
    format: AudioFormat,
}

impl AudioBuffer {
    /// Create a buffer from mono samples
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            source_channels: 1,
            file_path: PathBuf::new(),
            format: AudioFormat::default(),
        }
    }

    /// Create a buffer from interleaved samples, mixing all channels down to mono
    pub fn from_interleaved(samples: &[f32], channels: u16, sample_rate: u32) -> Self {
        let mut buffer = Self::new(downmix(samples, channels), sample_rate);
        buffer.source_channels = channels.max(1);
        buffer
    }

    /// Attach the originating file and its format
    pub fn with_source(mut self, file_path: PathBuf, format: AudioFormat) -> Self {
        self.file_path = file_path;
        self.format = format;
        self
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn source_channels(&self) -> u16 {
        self.source_channels
    }

    pub fn file_path(&self) -> &PathBuf {
        &self.file_path
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when there is nothing to analyze
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty() || self.sample_rate == 0
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Average interleaved channels into one
fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
        .collect()
}

/// Audio file format information
#[derive(Debug, Clone, Default)]
pub struct AudioFormat {
    /// File extension (wav, mp3, flac, etc.)
    pub extension: String,

    /// Bit depth (16, 24, 32, etc.)
    pub bit_depth: Option<u16>,

    /// Codec name for compressed formats
    pub compression: Option<String>,
}

/// Output of a beat detector: a tempo estimate plus beat timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Estimated tempo in BPM
    pub tempo: f32,

    /// Beat times in seconds, in detection order
    pub beat_times: Vec<f64>,
}
