use std::collections::HashMap;

use realfft::RealFftPlanner;
use rustfft::num_complex::Complex;

use crate::audio::types::{AudioBuffer, Detection};
use crate::config::DetectionConfig;
use crate::error::{AudioError, Result};

/// Fallback tempo when too few beats are found to measure one
const DEFAULT_BPM: f32 = 120.0;

/// Half-width, in frames, of the neighbourhood used for peak picking
const PEAK_RADIUS: usize = 3;

/// Produces beat timestamps and a tempo estimate from decoded audio
pub trait BeatDetector: Send + Sync {
    fn detect(&self, buffer: &AudioBuffer) -> Result<Detection>;
}

/// Beat tracker built on half-wave rectified spectral flux
///
/// Beat times come back ascending and inside `[0, duration]`.
#[derive(Debug, Clone)]
pub struct SpectralFluxDetector {
    config: DetectionConfig,
}

impl SpectralFluxDetector {
    pub fn new() -> Self {
        Self::with_config(DetectionConfig::default())
    }

    pub fn with_config(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Spectral flux per analysis frame (sum of positive magnitude differences)
    fn onset_envelope(&self, samples: &[f32]) -> Result<Vec<f32>> {
        let window_size = self.config.window_size;
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(window_size);
        let mut input_buffer = fft.make_input_vec();
        let mut spectrum_buffer: Vec<Complex<f32>> = fft.make_output_vec();

        let hann: Vec<f32> = (0..window_size)
            .map(|i| {
                0.5 * (1.0
                    - (2.0 * std::f32::consts::PI * i as f32 / (window_size - 1) as f32).cos())
            })
            .collect();

        let mut previous_magnitude = vec![0.0f32; spectrum_buffer.len()];
        let mut flux = Vec::new();

        for window in samples.windows(window_size).step_by(self.config.hop_size) {
            for ((dst, &sample), &w) in input_buffer.iter_mut().zip(window).zip(&hann) {
                *dst = sample * w;
            }

            fft.process(&mut input_buffer, &mut spectrum_buffer)
                .map_err(|e| AudioError::DetectionFailed {
                    reason: format!("FFT processing failed: {}", e),
                })?;

            let mut frame_flux = 0.0f32;
            for (prev, bin) in previous_magnitude.iter_mut().zip(&spectrum_buffer) {
                let magnitude = bin.norm();
                frame_flux += (magnitude - *prev).max(0.0);
                *prev = magnitude;
            }
            flux.push(frame_flux);
        }

        Ok(flux)
    }

    /// Frame indices of onset peaks in the flux envelope
    fn pick_onsets(&self, flux: &[f32]) -> Vec<usize> {
        let mut onsets = Vec::new();

        for (i, &value) in flux.iter().enumerate() {
            let start = i.saturating_sub(PEAK_RADIUS);
            let end = (i + PEAK_RADIUS + 1).min(flux.len());
            let neighbourhood = &flux[start..end];

            let local_max = neighbourhood.iter().fold(0.0f32, |acc, &x| acc.max(x));
            let local_mean = neighbourhood.iter().sum::<f32>() / neighbourhood.len() as f32;
            let threshold =
                local_mean + self.config.sensitivity * (local_max - local_mean) * 0.5;

            if value > 0.0 && value == local_max && value >= threshold && value > local_mean * 1.5 {
                onsets.push(i);
            }
        }

        if onsets.is_empty() && !flux.is_empty() {
            // Flat envelopes have no local peaks; fall back to a global threshold
            let mean_flux = flux.iter().sum::<f32>() / flux.len() as f32;
            let simple_threshold = mean_flux * (2.0 + self.config.sensitivity);
            onsets = flux
                .iter()
                .enumerate()
                .filter(|&(_, &value)| value > simple_threshold)
                .map(|(i, _)| i)
                .collect();

            tracing::debug!(
                "Global threshold {:.3} (mean: {:.3}) picked {} onsets",
                simple_threshold,
                mean_flux,
                onsets.len()
            );
        }

        onsets
    }

    /// Drop onsets closer together than the fastest allowed tempo
    fn enforce_min_interval(&self, onset_times: &[f64]) -> Vec<f64> {
        let min_beat_interval = 60.0 / self.config.max_bpm as f64;
        let mut beats = Vec::with_capacity(onset_times.len());
        let mut last_beat: Option<f64> = None;

        for &time in onset_times {
            if last_beat.map_or(true, |last| time - last >= min_beat_interval) {
                beats.push(time);
                last_beat = Some(time);
            }
        }

        beats
    }

    /// Tempo from the most common inter-beat interval
    fn estimate_tempo(&self, beat_times: &[f64]) -> f32 {
        if beat_times.len() < 2 {
            return DEFAULT_BPM;
        }

        let mut interval_counts: HashMap<i64, usize> = HashMap::new();
        for pair in beat_times.windows(2) {
            let interval = pair[1] - pair[0];
            let bpm = 60.0 / interval;
            if bpm >= self.config.min_bpm as f64 && bpm <= self.config.max_bpm as f64 {
                // 1 ms buckets
                *interval_counts.entry((interval * 1000.0).round() as i64).or_insert(0) += 1;
            }
        }

        // Ties go to the shorter interval so the result does not depend on hash order
        interval_counts
            .into_iter()
            .max_by(|(a_ms, a_count), (b_ms, b_count)| a_count.cmp(b_count).then(b_ms.cmp(a_ms)))
            .filter(|(interval_ms, _)| *interval_ms > 0)
            .map(|(interval_ms, _)| (60_000.0 / interval_ms as f64) as f32)
            .unwrap_or(DEFAULT_BPM)
    }
}

impl Default for SpectralFluxDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl BeatDetector for SpectralFluxDetector {
    fn detect(&self, buffer: &AudioBuffer) -> Result<Detection> {
        self.config.validate()?;
        if buffer.sample_rate() == 0 {
            return Err(AudioError::DetectionFailed {
                reason: "sample rate is zero".to_string(),
            }
            .into());
        }

        let flux = self.onset_envelope(buffer.samples())?;
        let onsets = self.pick_onsets(&flux);

        let hop_seconds = self.config.hop_size as f64 / buffer.sample_rate() as f64;
        let duration = buffer.duration();
        let onset_times: Vec<f64> = onsets
            .iter()
            .map(|&frame| frame as f64 * hop_seconds)
            .filter(|&time| time <= duration)
            .collect();

        let beat_times = self.enforce_min_interval(&onset_times);
        let tempo = self.estimate_tempo(&beat_times);

        tracing::debug!(
            "Spectral flux: {} frames, {} onsets, {} beats, {:.1} BPM",
            flux.len(),
            onsets.len(),
            beat_times.len(),
            tempo
        );

        Ok(Detection { tempo, beat_times })
    }
}
