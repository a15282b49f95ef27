//! Core simulation loop.
//!
//! Implements the one loop every demo runs on:
//! - Run lifecycle (`Idle → Running → Stopped`)
//! - Frame clock with skip or fixed-step accumulator policies
//! - Positive cancellation of stale animation frames
//! - Jidoka guard for stop-on-non-finite
//! - Trajectory recording

pub mod clock;
pub mod jidoka;
pub mod scheduler;
pub mod state;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

pub use clock::{FrameClock, StepPlan, StepPolicy};
pub use jidoka::JidokaGuard;
pub use scheduler::{FrameScheduler, TickHandle};
pub use state::{BodyPair, Coord, PhaseState, Trajectory, TrajectorySample, Vec2};

use crate::demos::{Demo, DemoKind, DemoParams, Metric};
use crate::error::{SimError, SimResult};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// `stop()` was called.
    User,
    /// Speed fell below the rest threshold; velocity snapped to zero.
    AtRest,
    /// Two bodies touched.
    Collision,
    /// A domain edge was reached (ground, wall, landing).
    Boundary,
    /// The state went NaN or infinite.
    NonFinite,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::User => "stopped by user",
            Self::AtRest => "came to rest",
            Self::Collision => "bodies collided",
            Self::Boundary => "reached boundary",
            Self::NonFinite => "non-finite state",
        };
        f.write_str(s)
    }
}

/// Verdict of a termination policy for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Keep running.
    Continue,
    /// End the run.
    Stop(StopReason),
}

/// Run lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", content = "reason", rename_all = "snake_case")]
pub enum Lifecycle {
    /// Not started (or reset); the integrator is not invoked.
    #[default]
    Idle,
    /// Ticks advance the state.
    Running,
    /// Terminal for this run; state frozen at its last value.
    Stopped(StopReason),
}

impl Lifecycle {
    /// Whether ticks currently advance the state.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Stop reason, if stopped.
    #[must_use]
    pub const fn stop_reason(&self) -> Option<StopReason> {
        match self {
            Self::Stopped(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Result of delivering one animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still running; deliver `next` on the following frame.
    Continue {
        /// Handle for the next frame.
        next: TickHandle,
        /// Integration steps applied during this frame.
        steps: u32,
    },
    /// The run ended during this frame.
    Stopped(StopReason),
    /// The handle was cancelled or superseded; nothing was mutated.
    Stale,
}

impl TickOutcome {
    /// Handle for the next frame, if the run continues.
    #[must_use]
    pub const fn next(&self) -> Option<TickHandle> {
        match self {
            Self::Continue { next, .. } => Some(*next),
            _ => None,
        }
    }
}

/// Main simulation loop for one demo instance.
///
/// Owns the run state exclusively. Parameters may be edited at any time;
/// edits reach a run only through the next `start`, except for demos that
/// declare [`Demo::LIVE_PREVIEW`], whose displayed state follows edits while
/// the loop is `Idle`. A stopped run stays frozen until `reset` or `start`.
///
/// # Example
///
/// ```rust
/// use physdemo::demos::{SpringDemo, SpringParams};
/// use physdemo::engine::{SimulationLoop, TickOutcome};
///
/// let mut sim = SimulationLoop::new(SpringDemo, SpringParams::default());
/// let mut handle = sim.start();
///
/// for frame in 0..120 {
///     match sim.tick(handle, f64::from(frame) / 60.0) {
///         TickOutcome::Continue { next, .. } => handle = next,
///         _ => break,
///     }
/// }
/// assert!(sim.state().time > 1.9);
/// ```
#[derive(Debug)]
pub struct SimulationLoop<D: Demo> {
    /// Demo strategy.
    demo: D,
    /// Editable parameters.
    params: D::Params,
    /// Clamped snapshot the current (or last) run was started with.
    active: D::Params,
    /// Current state.
    state: D::State,
    /// Lifecycle phase.
    lifecycle: Lifecycle,
    /// Frame clock.
    clock: FrameClock,
    /// Pending-frame owner.
    scheduler: FrameScheduler,
    /// Jidoka guard.
    jidoka: JidokaGuard,
    /// Path trace for this run.
    trajectory: Trajectory<D::TracePoint>,
    /// Integration steps taken this run.
    steps: u64,
}

impl<D: Demo> SimulationLoop<D> {
    /// Create an idle loop with state initialised from `params`.
    #[must_use]
    pub fn new(demo: D, params: D::Params) -> Self {
        let active = demo.clamp_params(&params);
        let state = demo.init(&active);
        let clock = FrameClock::new(demo.step_policy());

        Self {
            demo,
            params,
            active,
            state,
            lifecycle: Lifecycle::Idle,
            clock,
            scheduler: FrameScheduler::new(),
            jidoka: JidokaGuard::new(),
            trajectory: Trajectory::new(),
            steps: 0,
        }
    }

    /// Start a fresh run (idempotent restart).
    ///
    /// Cancels any outstanding frame, snapshots and clamps the parameters,
    /// rebuilds the state and clears the trajectory. Returns the handle of
    /// the first frame.
    pub fn start(&mut self) -> TickHandle {
        self.scheduler.cancel();
        self.rebuild();
        self.lifecycle = Lifecycle::Running;

        debug!(
            demo = D::KIND.as_str(),
            epoch = self.scheduler.epoch(),
            "run started"
        );
        self.scheduler.schedule()
    }

    /// Stop the current run. No effect unless running.
    pub fn stop(&mut self) {
        if self.lifecycle.is_running() {
            self.finish(StopReason::User);
            debug!(demo = D::KIND.as_str(), time = self.state.time(), "run stopped");
        }
    }

    /// Cancel any run and return to `Idle` with state rebuilt from the
    /// current parameters.
    pub fn reset(&mut self) {
        self.scheduler.cancel();
        self.rebuild();
        self.lifecycle = Lifecycle::Idle;
        debug!(demo = D::KIND.as_str(), "reset to idle");
    }

    /// Deliver an animation frame at host time `now` (seconds).
    ///
    /// Frames whose handle was cancelled or superseded are ignored.
    pub fn tick(&mut self, handle: TickHandle, now: f64) -> TickOutcome {
        if !self.scheduler.accept(handle) || !self.lifecycle.is_running() {
            trace!(demo = D::KIND.as_str(), ?handle, "stale frame ignored");
            return TickOutcome::Stale;
        }

        let plan = self.clock.advance(now);
        if plan.is_skip() {
            trace!(demo = D::KIND.as_str(), now, "frame skipped");
        }

        for _ in 0..plan.steps {
            self.demo.advance(&self.active, &mut self.state, plan.dt);
            self.steps += 1;

            if let Err(err) = self.jidoka.check(&self.state) {
                warn!(demo = D::KIND.as_str(), error = %err, "stopping the line");
                self.finish(StopReason::NonFinite);
                return TickOutcome::Stopped(StopReason::NonFinite);
            }

            let termination = self.demo.terminate(&self.active, &mut self.state);

            if let Some(point) = self.demo.trace_point(&self.state) {
                self.trajectory.push(self.state.time(), point);
            }

            if let Termination::Stop(reason) = termination {
                info!(
                    demo = D::KIND.as_str(),
                    %reason,
                    time = self.state.time(),
                    steps = self.steps,
                    "run finished"
                );
                self.finish(reason);
                return TickOutcome::Stopped(reason);
            }
        }

        TickOutcome::Continue {
            next: self.scheduler.schedule(),
            steps: plan.steps,
        }
    }

    /// Drive the loop with synthetic frames `frame_dt` apart until it stops
    /// or `max_time` seconds of host time have elapsed.
    ///
    /// Returns the stop reason if the run ended.
    pub fn drive(&mut self, frame_dt: f64, max_time: f64) -> Option<StopReason> {
        let mut now = 0.0;
        while let Some(handle) = self.scheduler.pending() {
            if now > max_time {
                break;
            }
            if let TickOutcome::Stopped(reason) = self.tick(handle, now) {
                return Some(reason);
            }
            now += frame_dt;
        }
        self.lifecycle.stop_reason()
    }

    /// Replace the editable parameters.
    ///
    /// Live-preview demos re-initialise their displayed state while `Idle`;
    /// otherwise the change waits for the next `reset` or `start`.
    pub fn set_params(&mut self, params: D::Params) {
        self.params = params;
        if D::LIVE_PREVIEW && self.lifecycle == Lifecycle::Idle {
            self.active = self.demo.clamp_params(&self.params);
            self.state = self.demo.init(&self.active);
            self.trajectory.clear();
        }
    }

    /// Edit the parameters in place, with the same semantics as `set_params`.
    pub fn update_params<F: FnOnce(&mut D::Params)>(&mut self, edit: F) {
        let mut params = self.params.clone();
        edit(&mut params);
        self.set_params(params);
    }

    /// Editable parameters.
    #[must_use]
    pub const fn params(&self) -> &D::Params {
        &self.params
    }

    /// Clamped parameters of the current or last run.
    #[must_use]
    pub const fn active_params(&self) -> &D::Params {
        &self.active
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &D::State {
        &self.state
    }

    /// Path trace of the current or last run.
    #[must_use]
    pub const fn trajectory(&self) -> &Trajectory<D::TracePoint> {
        &self.trajectory
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Frame the host should deliver next.
    #[must_use]
    pub const fn pending(&self) -> Option<TickHandle> {
        self.scheduler.pending()
    }

    /// Integration steps taken this run.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Frame clock of the current run.
    #[must_use]
    pub const fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Demo strategy.
    #[must_use]
    pub const fn demo(&self) -> &D {
        &self.demo
    }

    /// Derived display metrics for the current state.
    #[must_use]
    pub fn metrics(&self) -> Vec<Metric> {
        self.demo.metrics(&self.active, &self.state)
    }

    /// World positions of the drawn bodies (m, y up).
    #[must_use]
    pub fn bodies(&self) -> Vec<Vec2> {
        self.demo.bodies(&self.active, &self.state)
    }

    fn rebuild(&mut self) {
        self.active = self.demo.clamp_params(&self.params);
        self.state = self.demo.init(&self.active);
        self.clock = FrameClock::new(self.demo.step_policy());
        self.jidoka.reset();
        self.trajectory.clear();
        self.steps = 0;
        if let Some(point) = self.demo.trace_point(&self.state) {
            self.trajectory.push(self.state.time(), point);
        }
    }

    fn finish(&mut self, reason: StopReason) {
        self.scheduler.cancel();
        self.lifecycle = Lifecycle::Stopped(reason);
    }
}

/// Object-safe view of a simulation loop, for hosts that pick the demo at
/// runtime (CLI, WASM).
pub trait DynSimulation {
    /// Which demo is loaded.
    fn kind(&self) -> DemoKind;

    /// See [`SimulationLoop::start`].
    fn start(&mut self) -> TickHandle;

    /// See [`SimulationLoop::stop`].
    fn stop(&mut self);

    /// See [`SimulationLoop::reset`].
    fn reset(&mut self);

    /// See [`SimulationLoop::tick`].
    fn tick(&mut self, handle: TickHandle, now: f64) -> TickOutcome;

    /// See [`SimulationLoop::drive`].
    fn drive(&mut self, frame_dt: f64, max_time: f64) -> Option<StopReason>;

    /// Frame the host should deliver next.
    fn pending(&self) -> Option<TickHandle>;

    /// Lifecycle phase.
    fn lifecycle(&self) -> Lifecycle;

    /// Elapsed simulated time (s).
    fn elapsed(&self) -> f64;

    /// Derived display metrics.
    fn metrics(&self) -> Vec<Metric>;

    /// World positions of the drawn bodies (m, y up).
    fn bodies(&self) -> Vec<Vec2>;

    /// Editable parameters.
    fn params(&self) -> DemoParams;

    /// Replace the editable parameters.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` if the parameters belong to another demo.
    fn set_params(&mut self, params: DemoParams) -> SimResult<()>;

    /// Current state as JSON.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Json` if serialization fails.
    fn state_json(&self) -> SimResult<serde_json::Value>;

    /// Trajectory as JSON.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Json` if serialization fails.
    fn trajectory_json(&self) -> SimResult<serde_json::Value>;
}

/// Conversion between a demo's own parameters and the tagged [`DemoParams`].
pub trait ParamsCodec: Demo {
    /// Wrap typed parameters.
    fn into_tagged(params: Self::Params) -> DemoParams;

    /// Unwrap tagged parameters, `None` if they belong to another demo.
    fn from_tagged(params: DemoParams) -> Option<Self::Params>;
}

impl<D: ParamsCodec> DynSimulation for SimulationLoop<D> {
    fn kind(&self) -> DemoKind {
        D::KIND
    }

    fn start(&mut self) -> TickHandle {
        Self::start(self)
    }

    fn stop(&mut self) {
        Self::stop(self);
    }

    fn reset(&mut self) {
        Self::reset(self);
    }

    fn tick(&mut self, handle: TickHandle, now: f64) -> TickOutcome {
        Self::tick(self, handle, now)
    }

    fn drive(&mut self, frame_dt: f64, max_time: f64) -> Option<StopReason> {
        Self::drive(self, frame_dt, max_time)
    }

    fn pending(&self) -> Option<TickHandle> {
        Self::pending(self)
    }

    fn lifecycle(&self) -> Lifecycle {
        Self::lifecycle(self)
    }

    fn elapsed(&self) -> f64 {
        self.state.time()
    }

    fn metrics(&self) -> Vec<Metric> {
        Self::metrics(self)
    }

    fn bodies(&self) -> Vec<Vec2> {
        Self::bodies(self)
    }

    fn params(&self) -> DemoParams {
        D::into_tagged(self.params.clone())
    }

    fn set_params(&mut self, params: DemoParams) -> SimResult<()> {
        let found = params.kind();
        let typed = D::from_tagged(params).ok_or_else(|| {
            SimError::config(format!("parameters for '{found}' given to '{}'", D::KIND))
        })?;
        Self::set_params(self, typed);
        Ok(())
    }

    fn state_json(&self) -> SimResult<serde_json::Value> {
        Ok(serde_json::to_value(&self.state)?)
    }

    fn trajectory_json(&self) -> SimResult<serde_json::Value> {
        Ok(serde_json::to_value(&self.trajectory)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::demos::{
        DropDemo, DropParams, PendulumDemo, PendulumParams, SpringDemo, SpringParams,
    };

    fn next(outcome: TickOutcome) -> TickHandle {
        outcome.next().expect("run should continue")
    }

    #[test]
    fn test_new_loop_is_idle() {
        let sim = SimulationLoop::new(SpringDemo, SpringParams::default());
        assert_eq!(sim.lifecycle(), Lifecycle::Idle);
        assert!(sim.pending().is_none());
        assert_eq!(sim.steps(), 0);
    }

    #[test]
    fn test_start_transitions_to_running() {
        let mut sim = SimulationLoop::new(SpringDemo, SpringParams::default());
        let handle = sim.start();

        assert!(sim.lifecycle().is_running());
        assert_eq!(sim.pending(), Some(handle));
        // Initial point recorded for the trace
        assert_eq!(sim.trajectory().len(), 1);
    }

    #[test]
    fn test_first_tick_records_timestamp_only() {
        let mut sim = SimulationLoop::new(SpringDemo, SpringParams::default());
        let handle = sim.start();

        let outcome = sim.tick(handle, 5.0);
        assert!(matches!(outcome, TickOutcome::Continue { steps: 0, .. }));
        assert!(sim.state().time.abs() < f64::EPSILON);
    }

    #[test]
    fn test_ticks_advance_state() {
        let mut sim = SimulationLoop::new(SpringDemo, SpringParams::default());
        let mut handle = sim.start();

        for frame in 0..31 {
            handle = next(sim.tick(handle, f64::from(frame) / 60.0));
        }

        assert!((sim.state().time - 0.5).abs() < 0.02);
        assert_eq!(sim.steps(), 30);
        assert_eq!(sim.trajectory().len(), 31);
    }

    #[test]
    fn test_stop_freezes_state_and_cancels_frame() {
        let mut sim = SimulationLoop::new(SpringDemo, SpringParams::default());
        let mut handle = sim.start();
        handle = next(sim.tick(handle, 0.0));
        handle = next(sim.tick(handle, 1.0 / 60.0));

        sim.stop();
        assert_eq!(sim.lifecycle(), Lifecycle::Stopped(StopReason::User));
        assert!(sim.pending().is_none());

        let frozen = sim.state().clone();
        assert_eq!(sim.tick(handle, 2.0 / 60.0), TickOutcome::Stale);
        assert_eq!(sim.state(), &frozen);
    }

    #[test]
    fn test_stop_when_not_running_is_noop() {
        let mut sim = SimulationLoop::new(SpringDemo, SpringParams::default());
        sim.stop();
        assert_eq!(sim.lifecycle(), Lifecycle::Idle);
    }

    #[test]
    fn test_restart_rejects_previous_run_frames() {
        let mut sim = SimulationLoop::new(SpringDemo, SpringParams::default());
        let old = sim.start();
        let old = next(sim.tick(old, 0.0));

        let fresh = sim.start();
        let initial = sim.state().clone();

        assert_eq!(sim.tick(old, 1.0 / 60.0), TickOutcome::Stale);
        assert_eq!(sim.state(), &initial);
        assert!(sim.tick(fresh, 0.0).next().is_some());
    }

    #[test]
    fn test_params_deferred_until_start() {
        let mut sim = SimulationLoop::new(SpringDemo, SpringParams::default());
        let _ = sim.start();

        sim.update_params(|p| p.initial_displacement = 0.9);
        assert!((sim.state().displacement - SpringParams::default().initial_displacement).abs() < 1e-12);

        let _ = sim.start();
        assert!((sim.state().displacement - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_live_preview_applies_while_idle_only() {
        let mut sim = SimulationLoop::new(PendulumDemo, PendulumParams::default());

        sim.update_params(|p| p.initial_angle_deg = 45.0);
        assert!((sim.state().theta - std::f64::consts::FRAC_PI_4).abs() < 1e-12);

        let mut handle = sim.start();
        handle = next(sim.tick(handle, 0.0));
        let _ = sim.tick(handle, 1.0 / 60.0);

        let before = sim.state().theta;
        sim.update_params(|p| p.initial_angle_deg = 10.0);
        assert!((sim.state().theta - before).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stopped_run_stays_frozen_under_edits() {
        let mut sim = SimulationLoop::new(PendulumDemo, PendulumParams::default());
        let mut handle = sim.start();
        handle = next(sim.tick(handle, 0.0));
        let _ = sim.tick(handle, 1.0 / 60.0);
        sim.stop();

        let frozen = sim.state().clone();
        let frozen_active = sim.active_params().clone();
        sim.update_params(|p| p.initial_angle_deg = 5.0);

        assert_eq!(sim.lifecycle(), Lifecycle::Stopped(StopReason::User));
        assert_eq!(sim.state(), &frozen);
        assert_eq!(sim.active_params(), &frozen_active);
        assert!((sim.params().initial_angle_deg - 5.0).abs() < f64::EPSILON);

        sim.reset();
        assert!((sim.state().theta - 5.0_f64.to_radians()).abs() < 1e-12);
        sim.update_params(|p| p.initial_angle_deg = 12.0);
        assert!((sim.state().theta - 12.0_f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_bodies_follow_the_state() {
        let mut sim = SimulationLoop::new(PendulumDemo, PendulumParams::default());
        let mut handle = sim.start();
        handle = next(sim.tick(handle, 0.0));
        let _ = sim.tick(handle, 1.0 / 60.0);

        let bodies = sim.bodies();
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[1], sim.state().bob_position(sim.active_params()));

        let drop = SimulationLoop::new(DropDemo, DropParams::default());
        let ball = DynSimulation::bodies(&drop);
        assert!((ball[0].y - (drop.state().height + drop.active_params().radius)).abs() < 1e-12);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut sim = SimulationLoop::new(SpringDemo, SpringParams::default());
        let handle = sim.start();
        sim.reset();

        assert_eq!(sim.lifecycle(), Lifecycle::Idle);
        assert_eq!(sim.tick(handle, 0.0), TickOutcome::Stale);
    }

    #[test]
    fn test_non_finite_state_stops_the_line() {
        let params = DropParams {
            drop_height: f64::INFINITY,
            ..DropParams::default()
        };
        let mut sim = SimulationLoop::new(DropDemo, params);
        let handle = sim.start();
        let handle = next(sim.tick(handle, 0.0));

        assert_eq!(sim.tick(handle, 0.016), TickOutcome::Stopped(StopReason::NonFinite));
        assert_eq!(sim.lifecycle(), Lifecycle::Stopped(StopReason::NonFinite));
        assert!(sim.pending().is_none());
    }

    #[test]
    fn test_drive_until_stopped() {
        let mut sim = SimulationLoop::new(DropDemo, DropParams::default());
        let _ = sim.start();

        let reason = sim.drive(1.0 / 60.0, 60.0);
        assert_eq!(reason, Some(StopReason::AtRest));
    }

    #[test]
    fn test_dyn_simulation_param_kind_mismatch() {
        let mut sim: Box<dyn DynSimulation> =
            Box::new(SimulationLoop::new(SpringDemo, SpringParams::default()));

        let wrong = DemoParams::defaults(DemoKind::Drop);
        assert!(sim.set_params(wrong).is_err());

        let right = DemoParams::defaults(DemoKind::Spring);
        assert!(sim.set_params(right).is_ok());
        assert_eq!(sim.kind(), DemoKind::Spring);
        assert!(sim.state_json().unwrap().get("displacement").is_some());
    }

    #[test]
    fn test_lifecycle_serialization() {
        let json = serde_json::to_string(&Lifecycle::Stopped(StopReason::AtRest)).unwrap();
        assert!(json.contains("stopped"));
        assert!(json.contains("at_rest"));
    }
}
