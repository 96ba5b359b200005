//! Shape-only interface to the external solver collaborator.
//!
//! The solver itself (and the transport used to invoke it) is out of scope;
//! this module defines the request/response payloads it exchanges and a
//! loader that turns a result file into a [`SampleSeries`]. A failed solve is
//! surfaced as [`SolverError::UpstreamFailure`] for the UI layer and never
//! crosses into the playback/geometry core as anything but a missing series.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::series::{PlaybackError, SampleSeries};

/// Errors from the solver boundary
#[derive(Error, Debug)]
pub enum SolverError {
    /// The solver ran but reported a failure payload
    #[error("solver failure: {0}")]
    UpstreamFailure(String),

    /// The result file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The result payload is not valid JSON of the expected shape
    #[error("malformed solver payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The payload parsed but does not form a playable series
    #[error(transparent)]
    Invalid(#[from] PlaybackError),
}

/// Parameters for one solver invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    /// Variable name → numeric override applied before integration
    pub start_overrides: BTreeMap<String, f64>,
    /// Total simulated duration in seconds
    pub stop_time: f64,
    /// Integration output interval; `None` lets the solver pick adaptively
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_size: Option<f64>,
    /// Solver selection identifier (e.g. "CVode", "Euler")
    pub solver: String,
}

/// Result payload of one solver invocation.
///
/// `success` discriminates the two shapes: a successful solve carries the
/// parallel `time`/`y` sequences, a failed one carries `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    pub success: bool,
    #[serde(default)]
    pub time: Vec<f64>,
    #[serde(default)]
    pub y: Vec<f64>,
    #[serde(default)]
    pub num_steps: usize,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl SolveResponse {
    /// Convert the payload into a playable series.
    ///
    /// Failure payloads become [`SolverError::UpstreamFailure`]; successful
    /// payloads with empty or mismatched sequences are rejected by
    /// [`SampleSeries::new`].
    pub fn into_series(self) -> Result<SampleSeries, SolverError> {
        if !self.success {
            return Err(SolverError::UpstreamFailure(
                self.error
                    .unwrap_or_else(|| "solver produced no results".to_string()),
            ));
        }
        Ok(SampleSeries::new(self.time, self.y)?)
    }
}

/// One entry of the variable-picker collaborator's listing.
///
/// `start` is an opaque default override: the picker decides how to edit it,
/// this crate only forwards it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableInfo {
    pub name: String,
    pub causality: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start: Option<serde_json::Value>,
}

/// Load a solver result file (the transport stand-in) into a series
pub fn load_result(path: &Path) -> Result<SampleSeries, SolverError> {
    let payload = fs::read_to_string(path)?;
    let response: SolveResponse = serde_json::from_str(&payload)?;
    let model = response.model_name.clone();
    let series = response.into_series()?;
    info!(
        model = %model,
        samples = series.len(),
        duration = series.duration(),
        "solver result loaded"
    );
    Ok(series)
}

/// Closed-form damped-oscillation fixture used when no result file is given.
///
/// This is reference data for exercising playback, not a solver: the values
/// come from the analytic decay envelope, sampled at a fixed interval.
pub fn demo_series(stop_time: f64, step: f64) -> SampleSeries {
    let rest = -2.0;
    let amplitude = 1.6;
    let decay = 0.45;
    let omega = 3.2;

    let steps = (stop_time / step).ceil() as usize;
    let mut times = Vec::with_capacity(steps + 1);
    let mut values = Vec::with_capacity(steps + 1);
    for i in 0..=steps {
        let t = (i as f64 * step).min(stop_time);
        times.push(t);
        values.push(rest + amplitude * (-decay * t).exp() * (omega * t).cos());
    }
    SampleSeries::new(times, values).expect("demo series is never empty")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn success_payload_becomes_series() {
        let payload = r#"{
            "success": true,
            "time": [0.0, 0.5, 1.0],
            "y": [0.0, -0.8, -1.2],
            "num_steps": 3,
            "model_name": "mass_spring_damper"
        }"#;
        let response: SolveResponse = serde_json::from_str(payload).unwrap();
        let series = response.into_series().unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.duration(), 1.0);
    }

    #[test]
    fn failure_payload_surfaces_upstream_error() {
        let payload = r#"{"success": false, "error": "integration diverged"}"#;
        let response: SolveResponse = serde_json::from_str(payload).unwrap();
        match response.into_series() {
            Err(SolverError::UpstreamFailure(message)) => {
                assert_eq!(message, "integration diverged");
            }
            other => panic!("expected upstream failure, got {other:?}"),
        }
    }

    #[test]
    fn successful_but_empty_payload_is_invalid_input() {
        let payload = r#"{"success": true, "time": [], "y": []}"#;
        let response: SolveResponse = serde_json::from_str(payload).unwrap();
        assert!(matches!(
            response.into_series(),
            Err(SolverError::Invalid(PlaybackError::InvalidInput(_)))
        ));
    }

    #[test]
    fn load_result_round_trips_through_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"success": true, "time": [0.0, 1.0], "y": [0.5, -0.5], "num_steps": 2, "model_name": "demo"}}"#
        )
        .unwrap();

        let series = load_result(file.path()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first_value(), 0.5);
    }

    #[test]
    fn load_result_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            load_result(file.path()),
            Err(SolverError::Malformed(_))
        ));
    }

    #[test]
    fn request_serializes_without_null_step_size() {
        let request = SolveRequest {
            start_overrides: BTreeMap::from([("body1.m".to_string(), 2.5)]),
            stop_time: 10.0,
            step_size: None,
            solver: "CVode".to_string(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("step_size"));
        assert!(json.contains("body1.m"));
    }

    #[test]
    fn variable_info_accepts_missing_optionals() {
        let payload = r#"{"name": "damper1.d", "causality": "parameter"}"#;
        let info: VariableInfo = serde_json::from_str(payload).unwrap();
        assert_eq!(info.name, "damper1.d");
        assert!(info.start.is_none());
        assert!(info.description.is_empty());
    }

    #[test]
    fn demo_series_starts_displaced_and_settles() {
        let series = demo_series(10.0, 0.02);
        assert!(series.len() > 100);
        assert_eq!(series.times()[0], 0.0);
        // Starts above rest, ends near rest after the envelope decays.
        assert!((series.first_value() - (-0.4)).abs() < 0.1);
        assert!((series.last_value() - (-2.0)).abs() < 0.1);
        assert_eq!(series.duration(), 10.0);
    }
}
