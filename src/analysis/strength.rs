use crate::analysis::energy::EnergyCurve;
use crate::error::{AnalysisError, Result};

/// Default width of the strength window, in seconds
pub const DEFAULT_STRENGTH_WINDOW: f64 = 0.05;

/// Scores each beat by the mean energy in a window centred on it
#[derive(Debug, Clone, Copy)]
pub struct BeatStrengthScorer {
    window: f64,
}

impl BeatStrengthScorer {
    pub fn new(window: f64) -> Result<Self> {
        if !(window > 0.0 && window.is_finite()) {
            return Err(AnalysisError::InvalidParameters {
                details: format!("strength window must be positive, got {}", window),
            }
            .into());
        }

        Ok(Self { window })
    }

    pub fn window(&self) -> f64 {
        self.window
    }

    /// Mean energy of curve points in `[time - window/2, time + window/2]`
    ///
    /// Returns 0.0 when no point falls inside the window.
    pub fn strength_at(&self, time: f64, curve: &EnergyCurve) -> f32 {
        let half = self.window / 2.0;
        let selected = &curve.levels()[curve.range(time - half, time + half)];

        if selected.is_empty() {
            return 0.0;
        }

        let sum: f64 = selected.iter().map(|level| level.rms as f64).sum();
        (sum / selected.len() as f64) as f32
    }

    /// One strength per beat time, in the same order
    pub fn score(&self, beat_times: &[f64], curve: &EnergyCurve) -> Result<Vec<f32>> {
        if curve.is_empty() {
            return Err(AnalysisError::MissingStageOutput {
                stage: "score",
                missing: "energy curve",
            }
            .into());
        }

        let strengths: Vec<f32> = beat_times
            .iter()
            .map(|&time| self.strength_at(time, curve))
            .collect();

        let empty_windows = strengths.iter().filter(|&&s| s == 0.0).count();
        if empty_windows > 0 {
            tracing::debug!(
                "{} of {} beats scored 0.0 (no energy in window or silence)",
                empty_windows,
                strengths.len()
            );
        }

        Ok(strengths)
    }
}

impl Default for BeatStrengthScorer {
    fn default() -> Self {
        Self { window: DEFAULT_STRENGTH_WINDOW }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn three_point_curve() -> EnergyCurve {
        EnergyCurve::from_rms(vec![0.1, 0.9, 0.1], 0.05)
    }

    #[test]
    fn test_window_selects_single_point() {
        let scorer = BeatStrengthScorer::new(0.05).unwrap();
        let strengths = scorer.score(&[0.05], &three_point_curve()).unwrap();
        assert_eq!(strengths, vec![0.9]);
    }

    #[test]
    fn test_window_averages_inclusive_bounds() {
        // [0.0, 0.1] covers all three points
        let scorer = BeatStrengthScorer::new(0.1).unwrap();
        let strength = scorer.strength_at(0.05, &three_point_curve());
        assert!((strength - (1.1 / 3.0)).abs() < 1e-6);
    }

    #[test]
    fn test_beats_outside_curve_score_zero() {
        let scorer = BeatStrengthScorer::default();
        let strengths = scorer.score(&[-1.0, 5.0, 100.0], &three_point_curve()).unwrap();
        assert_eq!(strengths, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_window_narrower_than_spacing_scores_zero() {
        // [0.02, 0.03] sits between curve points
        let scorer = BeatStrengthScorer::new(0.01).unwrap();
        assert_eq!(scorer.strength_at(0.025, &three_point_curve()), 0.0);
    }

    #[test]
    fn test_output_parallels_input() {
        let scorer = BeatStrengthScorer::default();
        let beats = [0.1, 0.0, 0.05];
        let strengths = scorer.score(&beats, &three_point_curve()).unwrap();
        assert_eq!(strengths, vec![0.1, 0.1, 0.9]);
    }

    #[test]
    fn test_no_beats_no_strengths() {
        let scorer = BeatStrengthScorer::default();
        assert!(scorer.score(&[], &three_point_curve()).unwrap().is_empty());
    }

    #[test]
    fn test_empty_curve_is_rejected() {
        let scorer = BeatStrengthScorer::default();
        let curve = EnergyCurve::from_rms(vec![], 0.05);
        let err = scorer.score(&[0.5], &curve).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotLoaded);
    }

    #[test]
    fn test_invalid_window() {
        assert!(BeatStrengthScorer::new(0.0).is_err());
        assert!(BeatStrengthScorer::new(-0.1).is_err());
        assert!(BeatStrengthScorer::new(f64::NAN).is_err());
    }
}
