//! Sample series produced by one solver run, plus the shared resampling
//! primitive used by both the playback controller and the trace view.
//!
//! A series is a pair of parallel, time-ordered sequences. Resampling is
//! piecewise-constant: a query time selects the most recent sample at or
//! before it, never an interpolation. Both consumers of the index search go
//! through [`prefix_len`]/[`sample_index`] so they can never disagree on
//! boundary frames.

use thiserror::Error;

/// Errors raised when building a playback session from solver output
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The series is empty or its sequences disagree in length
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// One simulation result: parallel time and position sequences.
///
/// Created once per successful solve and never mutated afterwards; a new
/// solve replaces the series wholesale. Times are non-decreasing (guaranteed
/// by the solver, not re-validated here beyond bounds checks).
#[derive(Debug, Clone)]
pub struct SampleSeries {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl SampleSeries {
    /// Build a series from solver output.
    ///
    /// Fails with [`PlaybackError::InvalidInput`] when the sequences are
    /// empty or of different lengths, so every constructed series has at
    /// least one sample.
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Result<Self, PlaybackError> {
        if times.is_empty() {
            return Err(PlaybackError::InvalidInput(
                "empty sample series".to_string(),
            ));
        }
        if times.len() != values.len() {
            return Err(PlaybackError::InvalidInput(format!(
                "time/value length mismatch: {} != {}",
                times.len(),
                values.len()
            )));
        }
        debug_assert!(
            times.windows(2).all(|w| w[0] <= w[1]),
            "sample times must be non-decreasing"
        );
        Ok(Self { times, values })
    }

    /// Number of samples (always ≥ 1)
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false; a series cannot be constructed empty
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Sample times, non-decreasing
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Sample values, parallel to [`times`](Self::times)
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Time of the last sample; playback runs over `[times[0], duration]`
    pub fn duration(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Value of the first sample (reset target)
    pub fn first_value(&self) -> f64 {
        self.values[0]
    }

    /// Value of the last sample (terminal playback state)
    pub fn last_value(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Piecewise-constant lookup: the value held at time `t`
    pub fn value_at(&self, t: f64) -> f64 {
        self.values[sample_index(&self.times, t)]
    }

    /// Index of the sample held at time `t` (see [`sample_index`])
    pub fn sample_index(&self, t: f64) -> usize {
        sample_index(&self.times, t)
    }

    /// Number of samples with time ≤ `t` (see [`prefix_len`])
    pub fn prefix_len(&self, t: f64) -> usize {
        prefix_len(&self.times, t)
    }
}

/// Number of samples with time ≤ `t`.
///
/// Closed-below tie-break: a sample whose time equals `t` is counted. This is
/// the reveal length for a chart cursor at `t`; it can never include a
/// future sample. O(log n) binary search.
pub fn prefix_len(times: &[f64], t: f64) -> usize {
    times.partition_point(|&x| x <= t)
}

/// Greatest index `i` with `times[i] <= t`, clamped to 0 when `t` precedes
/// the first sample.
///
/// Sample `i` covers the half-open interval `[times[i], times[i+1])`; at
/// exactly `times[i]` the selected sample is `i`. The clamp implements
/// hold-first behavior for query times before the series starts.
pub fn sample_index(times: &[f64], t: f64) -> usize {
    prefix_len(times, t).saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> SampleSeries {
        SampleSeries::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, -1.0, -2.0, -1.0]).unwrap()
    }

    #[test]
    fn rejects_empty_series() {
        let err = SampleSeries::new(vec![], vec![]).unwrap_err();
        assert!(matches!(err, PlaybackError::InvalidInput(_)));
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = SampleSeries::new(vec![0.0, 1.0], vec![0.0]).unwrap_err();
        assert!(matches!(err, PlaybackError::InvalidInput(_)));
    }

    #[test]
    fn duration_is_last_time() {
        assert_eq!(series().duration(), 3.0);
    }

    #[test]
    fn index_at_zero_selects_first_sample() {
        assert_eq!(series().sample_index(0.0), 0);
    }

    #[test]
    fn index_between_samples_holds_previous() {
        let s = series();
        assert_eq!(s.sample_index(1.5), 1);
        assert_eq!(s.value_at(1.5), -1.0);
    }

    #[test]
    fn tie_break_is_closed_below() {
        // At exactly times[i] the selected sample is i, never i-1 or i+1.
        let s = series();
        for (i, &t) in s.times().iter().enumerate() {
            assert_eq!(s.sample_index(t), i, "at t = {t}");
        }
    }

    #[test]
    fn index_clamps_before_first_sample() {
        let times = [0.5, 1.0, 2.0];
        assert_eq!(sample_index(&times, 0.0), 0);
        assert_eq!(prefix_len(&times, 0.0), 0);
    }

    #[test]
    fn index_clamps_past_end() {
        let s = series();
        assert_eq!(s.sample_index(100.0), 3);
        assert_eq!(s.prefix_len(100.0), 4);
    }

    #[test]
    fn prefix_len_is_monotonic() {
        let s = series();
        let mut previous = 0;
        for step in 0..=60 {
            let t = step as f64 * 0.05;
            let len = s.prefix_len(t);
            assert!(len >= previous, "prefix shrank at t = {t}");
            previous = len;
        }
    }

    #[test]
    fn prefix_never_leaks_future_samples() {
        let s = series();
        for step in 0..=30 {
            let t = step as f64 * 0.1;
            let len = s.prefix_len(t);
            if len > 0 {
                assert!(s.times()[len - 1] <= t);
            }
            if len < s.len() {
                assert!(s.times()[len] > t);
            }
        }
    }

    #[test]
    fn repeated_times_select_last_duplicate() {
        // A zero-length hold still counts every coincident sample at its time.
        let times = [0.0, 1.0, 1.0, 2.0];
        assert_eq!(sample_index(&times, 1.0), 2);
        assert_eq!(prefix_len(&times, 1.0), 3);
    }
}
