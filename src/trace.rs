//! Position-vs-time chart state: full dataset plus a reveal cursor.
//!
//! The view owns the chart's complete dataset and the contiguous prefix of it
//! that is currently visible. Revealing goes through the same resampling
//! primitive as the playback controller ([`crate::series::prefix_len`]), so
//! the chart edge and the rendered mass can never disagree about a boundary
//! frame. The revealed points are always a prefix ordered by time, never a
//! non-contiguous subset and never a sample from the future.

use tracing::debug;

use crate::playback::TraceSink;
use crate::series::prefix_len;

/// Fraction of the value range added above and below the data when axis
/// bounds are recomputed
const AXIS_MARGIN_FRACTION: f64 = 0.15;

/// Margin substitute when the data is flat (zero value range)
const FLAT_DATA_MARGIN: f64 = 1.0;

/// Time-axis extent shown before any dataset is loaded
const DEFAULT_STOP_TIME: f64 = 10.0;

/// Axis extents of the chart viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    pub t_min: f64,
    pub t_max: f64,
    pub v_min: f64,
    pub v_max: f64,
}

impl Default for ChartBounds {
    fn default() -> Self {
        Self {
            t_min: 0.0,
            t_max: DEFAULT_STOP_TIME,
            v_min: -FLAT_DATA_MARGIN,
            v_max: FLAT_DATA_MARGIN,
        }
    }
}

/// A rectangle in normalized device coordinates, origin at bottom-left,
/// used to place the chart overlay inside the window
#[derive(Debug, Clone, Copy)]
pub struct OverlayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Chart dataset and reveal cursor.
///
/// `set_full_data` loads a dataset without showing any of it (no spoilers
/// before playback); `reveal_up_to` advances the visible prefix.
#[derive(Debug, Default)]
pub struct TraceView {
    times: Vec<f64>,
    values: Vec<f64>,
    revealed: usize,
    bounds: ChartBounds,
}

impl TraceView {
    /// Empty chart with default axis bounds
    pub fn new() -> Self {
        Self {
            times: Vec::new(),
            values: Vec::new(),
            revealed: 0,
            bounds: ChartBounds::default(),
        }
    }

    /// Replace the dataset and rescale the axes to its range.
    ///
    /// The value axis gets a proportional margin so the trace never hugs the
    /// viewport edge. Nothing is revealed until `reveal_up_to` is called.
    pub fn set_full_data(&mut self, times: &[f64], values: &[f64]) {
        debug_assert_eq!(times.len(), values.len());
        self.times = times.to_vec();
        self.values = values.to_vec();
        self.revealed = 0;

        let t_max = times.last().copied().unwrap_or(DEFAULT_STOP_TIME);
        let (v_min, v_max) = if values.is_empty() {
            (-1.0, 1.0)
        } else {
            value_range(values)
        };
        let margin = match v_max - v_min {
            range if range > 0.0 => range * AXIS_MARGIN_FRACTION,
            _ => FLAT_DATA_MARGIN,
        };
        self.bounds = ChartBounds {
            t_min: 0.0,
            t_max,
            v_min: v_min - margin,
            v_max: v_max + margin,
        };
        debug!(points = self.times.len(), t_max, "chart dataset replaced");
    }

    /// Drop the dataset entirely and restore an empty chart whose time axis
    /// spans `stop_time`
    pub fn clear(&mut self, stop_time: f64) {
        self.times.clear();
        self.values.clear();
        self.revealed = 0;
        self.bounds = ChartBounds {
            t_max: if stop_time > 0.0 {
                stop_time
            } else {
                DEFAULT_STOP_TIME
            },
            ..ChartBounds::default()
        };
    }

    /// Number of currently revealed points
    pub fn revealed_len(&self) -> usize {
        self.revealed
    }

    /// The revealed prefix as parallel slices
    pub fn revealed(&self) -> (&[f64], &[f64]) {
        (&self.times[..self.revealed], &self.values[..self.revealed])
    }

    /// Total number of points in the dataset
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Current axis extents
    pub fn bounds(&self) -> ChartBounds {
        self.bounds
    }

    /// Map the revealed prefix into `rect`.
    ///
    /// Returns one point per revealed sample, in normalized device
    /// coordinates, ready to be turned into line segments by the overlay
    /// pipeline.
    pub fn revealed_polyline(&self, rect: &OverlayRect) -> Vec<[f32; 2]> {
        let t_span = (self.bounds.t_max - self.bounds.t_min).max(f64::EPSILON);
        let v_span = (self.bounds.v_max - self.bounds.v_min).max(f64::EPSILON);
        self.times[..self.revealed]
            .iter()
            .zip(&self.values[..self.revealed])
            .map(|(&t, &v)| {
                let nx = rect.x + rect.width * (((t - self.bounds.t_min) / t_span) as f32);
                let ny = rect.y + rect.height * (((v - self.bounds.v_min) / v_span) as f32);
                [nx, ny]
            })
            .collect()
    }
}

impl TraceSink for TraceView {
    fn reveal_up_to(&mut self, t: f64) {
        self.revealed = prefix_len(&self.times, t);
    }

    fn reveal_all(&mut self) {
        self.revealed = self.times.len();
    }

    fn reveal_none(&mut self) {
        self.revealed = 0;
    }
}

fn value_range(values: &[f64]) -> (f64, f64) {
    values.iter().fold((f64::MAX, f64::MIN), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}
