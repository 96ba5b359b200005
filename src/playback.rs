//! Wall-clock-anchored playback over a [`SampleSeries`].
//!
//! The controller converts a series and a wall clock into a deterministic
//! stream of view updates. It owns the series for the duration of one
//! playback session and drives the two views through the [`MotionSink`] and
//! [`TraceSink`] seams; it holds no references into their internals.
//!
//! Scheduling is cooperative: the render-loop driver calls [`tick`] once per
//! display refresh and queries [`is_running`] to decide whether playback is
//! still active. Elapsed time is recomputed from the absolute anchor on every
//! tick, never accumulated from deltas, so the controller converges to the
//! correct terminal state even when the driver coalesces or drops frames.
//! Ticks that arrive after [`stop`] are ignored outright, which is what makes
//! a stale queued frame callback harmless.
//!
//! [`tick`]: PlaybackController::tick
//! [`is_running`]: PlaybackController::is_running
//! [`stop`]: PlaybackController::stop

use std::time::Instant;

use tracing::{debug, info};

use crate::series::SampleSeries;

/// Receiver for the mass position channel of a playback frame
pub trait MotionSink {
    /// Move the rendered mass to vertical position `y`
    fn set_mass_position(&mut self, y: f64);
}

/// Receiver for the chart reveal channel of a playback frame
pub trait TraceSink {
    /// Reveal every sample with time ≤ `t`
    fn reveal_up_to(&mut self, t: f64);

    /// Reveal the complete dataset (terminal state after a natural finish)
    fn reveal_all(&mut self);

    /// Hide every sample (reset state)
    fn reveal_none(&mut self);
}

/// Playback state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Not playing; the last rendered visual state stays frozen in place
    Idle,
    /// A run is active and ticks advance the views
    Running,
}

/// What one [`PlaybackController::tick`] call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The controller was idle; nothing was driven
    Ignored,
    /// Views were driven to the state for the current elapsed time
    Advanced,
    /// The run reached the end of the series; final sample driven exactly
    /// once, full trace revealed, state now [`PlaybackState::Idle`]
    Finished,
}

/// Drives a [`MotionSink`] and a [`TraceSink`] from a wall clock.
///
/// Within one tick both sinks observe the same elapsed value: the mass
/// position is held at the most recent sample (piecewise-constant) while the
/// trace edge tracks wall-clock time continuously. The asymmetry is
/// deliberate: the chart's visible edge moves smoothly even though the 3D
/// position steps from sample to sample.
pub struct PlaybackController {
    series: Option<SampleSeries>,
    anchor: Instant,
    state: PlaybackState,
}

impl PlaybackController {
    /// Create an idle controller with no series loaded
    pub fn new() -> Self {
        Self {
            series: None,
            anchor: Instant::now(),
            state: PlaybackState::Idle,
        }
    }

    /// Begin a run over `series`, anchored at `now`.
    ///
    /// Takes ownership of the series; a new solve hands in a fresh one. When
    /// a run is already active it is stopped first, so at most one run is
    /// ever live (a restart, not a second registration).
    pub fn start(&mut self, series: SampleSeries, now: Instant) {
        if self.state == PlaybackState::Running {
            debug!("start while running; restarting");
            self.stop();
        }
        info!(
            samples = series.len(),
            duration = series.duration(),
            "playback started"
        );
        self.series = Some(series);
        self.anchor = now;
        self.state = PlaybackState::Running;
    }

    /// Advance the views to the state for wall-clock `now`.
    ///
    /// No-op while idle. Past the series duration this clamps to the final
    /// sample, reveals the whole trace, and transitions to idle, after which
    /// further ticks are ignored, so the final sample is reported exactly
    /// once.
    pub fn tick(
        &mut self,
        now: Instant,
        motion: &mut impl MotionSink,
        trace: &mut impl TraceSink,
    ) -> TickOutcome {
        if self.state != PlaybackState::Running {
            return TickOutcome::Ignored;
        }
        let Some(series) = &self.series else {
            return TickOutcome::Ignored;
        };

        let elapsed = now.saturating_duration_since(self.anchor).as_secs_f64();
        if elapsed >= series.duration() {
            motion.set_mass_position(series.last_value());
            trace.reveal_all();
            self.state = PlaybackState::Idle;
            info!(elapsed, "playback finished");
            return TickOutcome::Finished;
        }

        motion.set_mass_position(series.value_at(elapsed));
        trace.reveal_up_to(elapsed);
        TickOutcome::Advanced
    }

    /// Stop playback, freezing the views in place.
    ///
    /// Legal in any state and idempotent; a second call is a no-op.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Running {
            debug!("playback stopped");
        }
        self.state = PlaybackState::Idle;
    }

    /// Return the views to the pre-playback state.
    ///
    /// With a series loaded the mass goes to the first sample; otherwise to
    /// `fallback_y`, the externally supplied slider-derived position. The
    /// trace reveals nothing either way.
    pub fn reset(
        &mut self,
        motion: &mut impl MotionSink,
        trace: &mut impl TraceSink,
        fallback_y: f64,
    ) {
        self.stop();
        match &self.series {
            Some(series) => motion.set_mass_position(series.first_value()),
            None => motion.set_mass_position(fallback_y),
        }
        trace.reveal_none();
    }

    /// Whether a run is active; the render-loop driver polls this each frame
    pub fn is_running(&self) -> bool {
        self.state == PlaybackState::Running
    }

    /// Current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Seconds since the run anchor, or `None` while idle
    pub fn elapsed(&self, now: Instant) -> Option<f64> {
        match self.state {
            PlaybackState::Running => {
                Some(now.saturating_duration_since(self.anchor).as_secs_f64())
            }
            PlaybackState::Idle => None,
        }
    }

    /// The series owned by the current session, if any
    pub fn series(&self) -> Option<&SampleSeries> {
        self.series.as_ref()
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingMotion {
        positions: Vec<f64>,
    }

    impl MotionSink for RecordingMotion {
        fn set_mass_position(&mut self, y: f64) {
            self.positions.push(y);
        }
    }

    #[derive(Default)]
    struct RecordingTrace {
        cursor: Option<f64>,
        revealed_all: bool,
        reveal_none_calls: usize,
    }

    impl TraceSink for RecordingTrace {
        fn reveal_up_to(&mut self, t: f64) {
            self.cursor = Some(t);
        }

        fn reveal_all(&mut self) {
            self.revealed_all = true;
        }

        fn reveal_none(&mut self) {
            self.reveal_none_calls += 1;
            self.cursor = None;
            self.revealed_all = false;
        }
    }

    fn series() -> SampleSeries {
        SampleSeries::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, -1.0, -2.0, -1.0]).unwrap()
    }

    fn at(anchor: Instant, secs: f64) -> Instant {
        anchor + Duration::from_secs_f64(secs)
    }

    #[test]
    fn tick_at_anchor_selects_first_sample() {
        let (mut motion, mut trace) = (RecordingMotion::default(), RecordingTrace::default());
        let mut controller = PlaybackController::new();
        let anchor = Instant::now();

        controller.start(series(), anchor);
        let outcome = controller.tick(anchor, &mut motion, &mut trace);

        assert_eq!(outcome, TickOutcome::Advanced);
        assert_eq!(motion.positions, vec![0.0]);
        assert_eq!(trace.cursor, Some(0.0));
    }

    #[test]
    fn tick_mid_interval_holds_previous_sample() {
        // elapsed = 1.5 renders the held sample (-1) while the trace edge
        // tracks wall-clock time continuously.
        let (mut motion, mut trace) = (RecordingMotion::default(), RecordingTrace::default());
        let mut controller = PlaybackController::new();
        let anchor = Instant::now();

        controller.start(series(), anchor);
        let outcome = controller.tick(at(anchor, 1.5), &mut motion, &mut trace);

        assert_eq!(outcome, TickOutcome::Advanced);
        assert_eq!(motion.positions, vec![-1.0]);
        assert_eq!(trace.cursor, Some(1.5));
        assert!(!trace.revealed_all);
        assert!(controller.is_running());
    }

    #[test]
    fn tick_at_duration_finishes_with_final_sample() {
        let (mut motion, mut trace) = (RecordingMotion::default(), RecordingTrace::default());
        let mut controller = PlaybackController::new();
        let anchor = Instant::now();

        controller.start(series(), anchor);
        let outcome = controller.tick(at(anchor, 3.0), &mut motion, &mut trace);

        assert_eq!(outcome, TickOutcome::Finished);
        assert_eq!(motion.positions, vec![-1.0]);
        assert!(trace.revealed_all);
        assert_eq!(controller.state(), PlaybackState::Idle);
    }

    #[test]
    fn finish_reports_final_sample_exactly_once() {
        let (mut motion, mut trace) = (RecordingMotion::default(), RecordingTrace::default());
        let mut controller = PlaybackController::new();
        let anchor = Instant::now();

        controller.start(series(), anchor);
        assert_eq!(
            controller.tick(at(anchor, 10.0), &mut motion, &mut trace),
            TickOutcome::Finished
        );
        assert_eq!(
            controller.tick(at(anchor, 11.0), &mut motion, &mut trace),
            TickOutcome::Ignored
        );
        assert_eq!(motion.positions.len(), 1);
    }

    #[test]
    fn tick_at_each_sample_time_selects_that_sample() {
        let s = series();
        for (i, &t) in s.times().iter().enumerate() {
            if t >= s.duration() {
                continue; // the final time takes the finish path
            }
            let (mut motion, mut trace) = (RecordingMotion::default(), RecordingTrace::default());
            let mut controller = PlaybackController::new();
            let anchor = Instant::now();
            controller.start(s.clone(), anchor);
            controller.tick(at(anchor, t), &mut motion, &mut trace);
            assert_eq!(motion.positions, vec![s.values()[i]], "at t = {t}");
        }
    }

    #[test]
    fn single_sample_series_finishes_immediately() {
        let (mut motion, mut trace) = (RecordingMotion::default(), RecordingTrace::default());
        let mut controller = PlaybackController::new();
        let anchor = Instant::now();

        controller.start(SampleSeries::new(vec![0.0], vec![4.5]).unwrap(), anchor);
        let outcome = controller.tick(anchor, &mut motion, &mut trace);

        assert_eq!(outcome, TickOutcome::Finished);
        assert_eq!(motion.positions, vec![4.5]);
        assert!(trace.revealed_all);
    }

    #[test]
    fn missed_ticks_still_converge_to_terminal_state() {
        // Elapsed is recomputed from the anchor, so skipping every
        // intermediate frame lands on the same terminal state.
        let (mut motion, mut trace) = (RecordingMotion::default(), RecordingTrace::default());
        let mut controller = PlaybackController::new();
        let anchor = Instant::now();

        controller.start(series(), anchor);
        let outcome = controller.tick(at(anchor, 2.75), &mut motion, &mut trace);
        assert_eq!(outcome, TickOutcome::Advanced);
        assert_eq!(motion.positions, vec![-2.0]);

        let outcome = controller.tick(at(anchor, 60.0), &mut motion, &mut trace);
        assert_eq!(outcome, TickOutcome::Finished);
        assert_eq!(motion.positions, vec![-2.0, -1.0]);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut controller = PlaybackController::new();
        let anchor = Instant::now();
        controller.start(series(), anchor);

        controller.stop();
        assert_eq!(controller.state(), PlaybackState::Idle);
        controller.stop();
        assert_eq!(controller.state(), PlaybackState::Idle);
    }

    #[test]
    fn tick_after_stop_is_ignored() {
        let (mut motion, mut trace) = (RecordingMotion::default(), RecordingTrace::default());
        let mut controller = PlaybackController::new();
        let anchor = Instant::now();

        controller.start(series(), anchor);
        controller.stop();
        // A frame callback already queued when stop() ran must not overwrite
        // the frozen state.
        let outcome = controller.tick(at(anchor, 1.0), &mut motion, &mut trace);

        assert_eq!(outcome, TickOutcome::Ignored);
        assert!(motion.positions.is_empty());
        assert_eq!(trace.cursor, None);
    }

    #[test]
    fn restart_re_anchors_the_clock() {
        let (mut motion, mut trace) = (RecordingMotion::default(), RecordingTrace::default());
        let mut controller = PlaybackController::new();
        let anchor = Instant::now();

        controller.start(series(), anchor);
        controller.tick(at(anchor, 2.5), &mut motion, &mut trace);

        // Restart without an intervening stop(); the old run must not bleed
        // into the new anchor.
        let restart = at(anchor, 5.0);
        controller.start(series(), restart);
        let outcome = controller.tick(restart, &mut motion, &mut trace);

        assert_eq!(outcome, TickOutcome::Advanced);
        assert_eq!(motion.positions.last(), Some(&0.0));
        assert_eq!(trace.cursor, Some(0.0));
    }

    #[test]
    fn reset_with_series_returns_to_first_sample() {
        let (mut motion, mut trace) = (RecordingMotion::default(), RecordingTrace::default());
        let mut controller = PlaybackController::new();
        let anchor = Instant::now();

        controller.start(series(), anchor);
        controller.tick(at(anchor, 2.0), &mut motion, &mut trace);
        controller.reset(&mut motion, &mut trace, -7.0);

        assert_eq!(motion.positions.last(), Some(&0.0));
        assert_eq!(trace.reveal_none_calls, 1);
        assert_eq!(controller.state(), PlaybackState::Idle);
    }

    #[test]
    fn reset_without_series_uses_fallback_position() {
        let (mut motion, mut trace) = (RecordingMotion::default(), RecordingTrace::default());
        let mut controller = PlaybackController::new();

        controller.reset(&mut motion, &mut trace, -2.0);

        assert_eq!(motion.positions, vec![-2.0]);
        assert_eq!(trace.reveal_none_calls, 1);
    }

    #[test]
    fn elapsed_is_none_while_idle() {
        let controller = PlaybackController::new();
        assert_eq!(controller.elapsed(Instant::now()), None);
    }
}
