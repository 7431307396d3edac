use crate::error::{AnalysisError, Result};

/// A detected beat and the local energy around it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatRecord {
    /// Beat time in seconds
    pub time: f64,

    /// Mean RMS energy around the beat; only comparable within one table
    pub strength: f32,
}

/// Beat records in detection order
///
/// Never mutated once built; a new analysis run produces a new table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeatTable {
    records: Vec<BeatRecord>,
}

impl BeatTable {
    /// Zip beat times with their strengths
    pub fn build(beat_times: &[f64], strengths: &[f32]) -> Result<Self> {
        if beat_times.len() != strengths.len() {
            return Err(AnalysisError::ShapeMismatch {
                beats: beat_times.len(),
                strengths: strengths.len(),
            }
            .into());
        }

        let records = beat_times
            .iter()
            .zip(strengths)
            .map(|(&time, &strength)| BeatRecord { time, strength })
            .collect();

        Ok(Self { records })
    }

    pub fn records(&self) -> &[BeatRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn strengths(&self) -> impl Iterator<Item = f32> + '_ {
        self.records.iter().map(|record| record.strength)
    }

    /// The `n` strongest beats, strongest first
    ///
    /// Equal strengths keep their detection order. Asking for more beats than
    /// the table holds returns all of them.
    pub fn top(&self, n: usize) -> Vec<BeatRecord> {
        let mut ranked = self.records.clone();
        ranked.sort_by(|a, b| b.strength.total_cmp(&a.strength));
        ranked.truncate(n);
        ranked
    }

    /// Strength at percentile `p` of the table, or `None` for an empty table
    pub fn threshold(&self, p: f64) -> Result<Option<f64>> {
        validate_percentile(p)?;

        let mut sorted: Vec<f64> = self.strengths().map(f64::from).collect();
        sorted.sort_by(f64::total_cmp);
        Ok(quantile(&sorted, p))
    }

    /// Beats at or above percentile `p`, in detection order
    ///
    /// The strongest beat always qualifies, so a non-empty table never yields an
    /// empty result.
    pub fn above_percentile(&self, p: f64) -> Result<Vec<BeatRecord>> {
        let Some(threshold) = self.threshold(p)? else {
            return Ok(Vec::new());
        };

        Ok(self
            .records
            .iter()
            .filter(|record| f64::from(record.strength) >= threshold)
            .copied()
            .collect())
    }
}

fn validate_percentile(p: f64) -> Result<()> {
    if p > 0.0 && p <= 1.0 {
        Ok(())
    } else {
        Err(AnalysisError::InvalidPercentile { value: p }.into())
    }
}

/// Linear interpolation between order statistics of an ascending slice
fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = p * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn table(strengths: &[f32]) -> BeatTable {
        let times: Vec<f64> = (0..strengths.len()).map(|i| i as f64 * 0.5).collect();
        BeatTable::build(&times, strengths).unwrap()
    }

    fn one_to_ten() -> BeatTable {
        table(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0])
    }

    #[test]
    fn test_build_rejects_shape_mismatch() {
        let err = BeatTable::build(&[0.0, 1.0], &[0.5]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn test_build_preserves_detection_order() {
        let table = BeatTable::build(&[2.0, 1.0], &[0.2, 0.1]).unwrap();
        assert_eq!(table.records()[0], BeatRecord { time: 2.0, strength: 0.2 });
        assert_eq!(table.records()[1], BeatRecord { time: 1.0, strength: 0.1 });
    }

    #[test]
    fn test_quantile_interpolates() {
        assert_eq!(one_to_ten().threshold(0.75).unwrap(), Some(7.75));
        assert_eq!(one_to_ten().threshold(1.0).unwrap(), Some(10.0));
        assert_eq!(table(&[3.0]).threshold(0.3).unwrap(), Some(3.0));
    }

    #[test]
    fn test_above_percentile_scenario() {
        let strong = one_to_ten().above_percentile(0.75).unwrap();
        let strengths: Vec<f32> = strong.iter().map(|r| r.strength).collect();
        assert_eq!(strengths, vec![8.0, 9.0, 10.0]);
    }

    #[test]
    fn test_above_percentile_keeps_detection_order() {
        let table = table(&[5.0, 1.0, 9.0, 7.0]);
        let strong = table.above_percentile(0.5).unwrap();
        let strengths: Vec<f32> = strong.iter().map(|r| r.strength).collect();
        assert_eq!(strengths, vec![9.0, 7.0]);
    }

    #[test]
    fn test_above_percentile_is_subset_and_shrinks() {
        let table = table(&[0.3, 0.0, 0.8, 0.8, 0.1, 0.5, 0.05, 0.9, 0.2]);
        let mut previous = usize::MAX;

        for step in 1..=20 {
            let p = step as f64 / 20.0;
            let strong = table.above_percentile(p).unwrap();

            assert!(!strong.is_empty());
            assert!(strong.len() <= previous);
            assert!(strong.iter().all(|r| table.records().contains(r)));
            previous = strong.len();
        }
        assert_eq!(table.above_percentile(1.0).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_percentile() {
        for p in [0.0, -0.1, 1.5, f64::NAN] {
            let err = one_to_ten().above_percentile(p).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidPercentile);
        }
        // Checked before looking at the (empty) table
        let err = BeatTable::default().above_percentile(1.5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPercentile);
    }

    #[test]
    fn test_top_sorted_descending() {
        let top = table(&[0.2, 0.9, 0.5, 0.7]).top(3);
        let strengths: Vec<f32> = top.iter().map(|r| r.strength).collect();
        assert_eq!(strengths, vec![0.9, 0.7, 0.5]);
    }

    #[test]
    fn test_top_ties_keep_detection_order() {
        let top = table(&[0.5, 0.9, 0.5, 0.9]).top(4);
        let times: Vec<f64> = top.iter().map(|r| r.time).collect();
        assert_eq!(times, vec![0.5, 1.5, 0.0, 1.0]);
    }

    #[test]
    fn test_top_beyond_size_returns_all_ranked() {
        let table = table(&[0.2, 0.9, 0.5]);
        let top = table.top(50);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].strength, 0.9);
        assert_eq!(top[2].strength, 0.2);
    }

    #[test]
    fn test_empty_table_queries() {
        let empty = BeatTable::build(&[], &[]).unwrap();
        assert!(empty.top(5).is_empty());
        assert!(empty.above_percentile(0.5).unwrap().is_empty());
        assert_eq!(empty.threshold(0.5).unwrap(), None);
    }
}
