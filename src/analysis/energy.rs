use crate::audio::AudioBuffer;
use crate::error::{AnalysisError, Result};

/// One point of the short-time energy curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyLevel {
    /// Frame start time in seconds
    pub time: f64,

    /// RMS amplitude of the frame
    pub rms: f32,
}

/// Framed RMS energy over a whole buffer, on a uniform time axis
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyCurve {
    levels: Vec<EnergyLevel>,
}

impl EnergyCurve {
    /// Build a curve from raw RMS values spaced `hop_seconds` apart
    pub fn from_rms(rms: Vec<f32>, hop_seconds: f64) -> Self {
        let levels = rms
            .into_iter()
            .enumerate()
            .map(|(i, rms)| EnergyLevel {
                time: i as f64 * hop_seconds,
                rms,
            })
            .collect();

        Self { levels }
    }

    pub fn levels(&self) -> &[EnergyLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Index range of points whose time lies in `[start, end]`
    ///
    /// Times are sorted, so both ends are found by binary search.
    pub fn range(&self, start: f64, end: f64) -> std::ops::Range<usize> {
        let lo = self.levels.partition_point(|level| level.time < start);
        let hi = self.levels.partition_point(|level| level.time <= end);
        lo..hi.max(lo)
    }
}

/// Computes the framed RMS energy curve of a buffer
#[derive(Debug, Clone, Copy)]
pub struct EnergyProfiler {
    frame_length: usize,
    hop_length: usize,
}

impl EnergyProfiler {
    pub fn new(frame_length: usize, hop_length: usize) -> Result<Self> {
        if frame_length == 0 || hop_length == 0 {
            return Err(AnalysisError::InvalidParameters {
                details: format!(
                    "frame_length ({}) and hop_length ({}) must be positive",
                    frame_length, hop_length
                ),
            }
            .into());
        }

        Ok(Self { frame_length, hop_length })
    }

    /// Number of frames for `sample_count` samples
    ///
    /// `ceil((n - frame_length) / hop_length) + 1`, and a single zero-padded
    /// frame when the buffer is no longer than one frame.
    pub fn frame_count(&self, sample_count: usize) -> usize {
        if sample_count <= self.frame_length {
            return 1;
        }
        (sample_count - self.frame_length).div_ceil(self.hop_length) + 1
    }

    pub fn compute(&self, buffer: &AudioBuffer) -> Result<EnergyCurve> {
        if buffer.is_empty() {
            return Err(AnalysisError::NotLoaded.into());
        }

        let samples = buffer.samples();
        let n_frames = self.frame_count(samples.len());

        let rms = (0..n_frames)
            .map(|i| {
                let start = (i * self.hop_length).min(samples.len());
                let end = (start + self.frame_length).min(samples.len());
                // Missing tail samples count as zeros
                let sum_sq: f64 = samples[start..end]
                    .iter()
                    .map(|&x| (x as f64) * (x as f64))
                    .sum();
                (sum_sq / self.frame_length as f64).sqrt() as f32
            })
            .collect();

        let hop_seconds = self.hop_length as f64 / buffer.sample_rate() as f64;
        Ok(EnergyCurve::from_rms(rms, hop_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_frame_count() {
        let profiler = EnergyProfiler::new(4, 2).unwrap();
        assert_eq!(profiler.frame_count(1), 1);
        assert_eq!(profiler.frame_count(4), 1);
        assert_eq!(profiler.frame_count(5), 2); // ceil(1/2) + 1
        assert_eq!(profiler.frame_count(6), 2);
        assert_eq!(profiler.frame_count(7), 3);
    }

    #[test]
    fn test_constant_signal_rms() {
        let buffer = AudioBuffer::new(vec![0.5; 4096], 22050);
        let curve = EnergyProfiler::new(1024, 512).unwrap().compute(&buffer).unwrap();

        assert_eq!(curve.len(), 7);
        for level in curve.levels() {
            assert!((level.rms - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_final_frame_is_zero_padded() {
        // 6 ones, frame 4, hop 4: second frame holds 2 ones + 2 padding zeros
        let buffer = AudioBuffer::new(vec![1.0; 6], 10);
        let curve = EnergyProfiler::new(4, 4).unwrap().compute(&buffer).unwrap();

        assert_eq!(curve.len(), 2);
        assert_eq!(curve.levels()[0].rms, 1.0);
        assert!((curve.levels()[1].rms - 0.5f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_time_axis_spacing() {
        for (frame, hop, rate) in [(2048, 512, 22050), (1024, 256, 44100), (300, 700, 8000)] {
            let buffer = AudioBuffer::new(vec![0.1; 20_000], rate);
            let curve = EnergyProfiler::new(frame, hop).unwrap().compute(&buffer).unwrap();
            let spacing = hop as f64 / rate as f64;

            assert_eq!(curve.levels()[0].time, 0.0);
            for pair in curve.levels().windows(2) {
                assert!((pair[1].time - pair[0].time - spacing).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_energy_is_non_negative() {
        let samples: Vec<f32> = (0..10_000).map(|i| ((i as f32) * 0.01).sin() - 0.3).collect();
        let buffer = AudioBuffer::new(samples, 22050);
        let curve = EnergyProfiler::new(2048, 512).unwrap().compute(&buffer).unwrap();
        assert!(curve.levels().iter().all(|level| level.rms >= 0.0));
    }

    #[test]
    fn test_empty_buffer_is_not_loaded() {
        let buffer = AudioBuffer::new(vec![], 22050);
        let err = EnergyProfiler::new(2048, 512).unwrap().compute(&buffer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotLoaded);
    }

    #[test]
    fn test_zero_lengths_rejected() {
        assert!(EnergyProfiler::new(0, 512).is_err());
        assert!(EnergyProfiler::new(2048, 0).is_err());
    }

    #[test]
    fn test_range_is_inclusive() {
        let curve = EnergyCurve::from_rms(vec![0.1, 0.9, 0.1, 0.4], 0.05);
        assert_eq!(curve.range(0.05, 0.1), 1..3);
        assert_eq!(curve.range(0.2, 0.3), 4..4);
        assert_eq!(curve.range(-1.0, -0.5), 0..0);
    }
}
