//! Demo 4: Pendulum Swing
//!
//! A point-mass pendulum on a rigid massless rod, full nonlinear restoring
//! torque plus linear angular damping.
//!
//! # Governing Equations
//!
//! ```text
//! θ'' = −(g/L)·sin θ − b·θ'
//! T₀  = 2π√(L/g)
//! T   ≈ T₀·(1 + θ₀²/16 + 11θ₀⁴/3072)      (|θ₀| > 0.1 rad)
//! ```
//!
//! The displayed pendulum follows parameter edits while the loop is idle
//! (live preview). A stopped run stays frozen.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Demo, DemoKind, DemoParams, Metric};
use crate::engine::clock::StepPolicy;
use crate::engine::state::{PhaseState, Vec2};
use crate::engine::{ParamsCodec, StopReason, Termination};
use crate::units::{deg_to_rad, rad_to_deg, STANDARD_GRAVITY};

/// Amplitude above which the period series correction applies (rad).
pub const LARGE_ANGLE: f64 = 0.1;

/// Angular speed below which the pendulum may rest (°/s).
pub const REST_OMEGA_DEG: f64 = 1.0;

/// Angle below which the pendulum may rest (°).
pub const REST_THETA_DEG: f64 = 0.5;

/// Restoring acceleration below which any angle is an equilibrium (rad/s²).
pub const REST_RESTORING_ACCEL: f64 = 1e-4;

/// Pendulum demo parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PendulumParams {
    /// Rod length (m).
    #[validate(range(min = 0.5, max = 3.0))]
    pub length: f64,
    /// Gravitational acceleration (m/s²).
    #[validate(range(min = 0.0, max = 50.0))]
    pub gravity: f64,
    /// Angular damping coefficient b (1/s).
    #[validate(range(min = 0.0, max = 5.0))]
    pub damping: f64,
    /// Release angle from the vertical (°).
    #[validate(range(min = -179.0, max = 179.0))]
    pub initial_angle_deg: f64,
    /// Bob mass (kg), only used for energies.
    #[validate(range(min = 0.1, max = 100.0))]
    pub mass: f64,
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self {
            length: 1.5,
            gravity: STANDARD_GRAVITY,
            damping: 0.1,
            initial_angle_deg: 30.0,
            mass: 1.0,
        }
    }
}

impl PendulumParams {
    /// Release angle (rad).
    #[must_use]
    pub fn initial_angle(&self) -> f64 {
        deg_to_rad(self.initial_angle_deg)
    }

    /// Small-angle period `2π√(L/g)` (s).
    #[must_use]
    pub fn small_angle_period(&self) -> f64 {
        2.0 * std::f64::consts::PI * (self.length / self.gravity).sqrt()
    }

    /// Period estimate for the release amplitude (s).
    ///
    /// Small-angle period up to 0.1 rad, series-corrected beyond.
    #[must_use]
    pub fn period(&self) -> f64 {
        let t0 = self.small_angle_period();
        let theta0 = self.initial_angle();
        if theta0.abs() > LARGE_ANGLE {
            let th2 = theta0 * theta0;
            t0 * (1.0 + th2 / 16.0 + 11.0 * th2 * th2 / 3072.0)
        } else {
            t0
        }
    }
}

/// Pendulum demo state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendulumState {
    /// Angle from the downward vertical (rad), positive counter-clockwise.
    pub theta: f64,
    /// Angular velocity (rad/s).
    pub omega: f64,
    /// Elapsed simulated time (s).
    pub time: f64,
}

impl PendulumState {
    /// Bob position relative to the pivot (m), y up.
    #[must_use]
    pub fn bob_position(&self, params: &PendulumParams) -> Vec2 {
        Vec2::new(
            params.length * self.theta.sin(),
            -params.length * self.theta.cos(),
        )
    }

    /// Kinetic energy ½m(Lω)² (J).
    #[must_use]
    pub fn kinetic_energy(&self, params: &PendulumParams) -> f64 {
        let v = params.length * self.omega;
        0.5 * params.mass * v * v
    }

    /// Potential energy mgL(1 − cos θ) relative to the lowest point (J).
    #[must_use]
    pub fn potential_energy(&self, params: &PendulumParams) -> f64 {
        params.mass * params.gravity * params.length * (1.0 - self.theta.cos())
    }
}

impl PhaseState for PendulumState {
    type Coord = f64;

    fn position(&self) -> f64 {
        self.theta
    }

    fn velocity(&self) -> f64 {
        self.omega
    }

    fn set_position(&mut self, position: f64) {
        self.theta = position;
    }

    fn set_velocity(&mut self, velocity: f64) {
        self.omega = velocity;
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn advance_time(&mut self, dt: f64) {
        self.time += dt;
    }
}

/// Nonlinear damped pendulum.
#[derive(Debug, Clone, Copy, Default)]
pub struct PendulumDemo;

impl Demo for PendulumDemo {
    type Params = PendulumParams;
    type State = PendulumState;
    type TracePoint = ();

    const KIND: DemoKind = DemoKind::Pendulum;
    const LIVE_PREVIEW: bool = true;

    fn step_policy(&self) -> StepPolicy {
        StepPolicy::fixed_60hz()
    }

    fn clamp_params(&self, params: &PendulumParams) -> PendulumParams {
        PendulumParams {
            length: params.length.max(0.01),
            gravity: params.gravity.max(0.0),
            damping: params.damping.max(0.0),
            mass: params.mass.max(0.01),
            ..params.clone()
        }
    }

    fn init(&self, params: &PendulumParams) -> PendulumState {
        PendulumState {
            theta: params.initial_angle(),
            omega: 0.0,
            time: 0.0,
        }
    }

    fn acceleration(&self, params: &PendulumParams, state: &PendulumState) -> f64 {
        -(params.gravity / params.length) * state.theta.sin() - params.damping * state.omega
    }

    fn terminate(&self, params: &PendulumParams, state: &mut PendulumState) -> Termination {
        // Without gravity the bob can settle at any angle
        let restoring = (params.gravity / params.length * state.theta.sin()).abs();
        let near_bottom = rad_to_deg(state.theta).abs() < REST_THETA_DEG;

        if rad_to_deg(state.omega).abs() < REST_OMEGA_DEG
            && (near_bottom || restoring < REST_RESTORING_ACCEL)
        {
            state.omega = 0.0;
            Termination::Stop(StopReason::AtRest)
        } else {
            Termination::Continue
        }
    }

    fn bodies(&self, params: &PendulumParams, state: &PendulumState) -> Vec<Vec2> {
        vec![Vec2::new(0.0, 0.0), state.bob_position(params)]
    }

    fn metrics(&self, params: &PendulumParams, state: &PendulumState) -> Vec<Metric> {
        let ke = state.kinetic_energy(params);
        let pe = state.potential_energy(params);
        vec![
            Metric::new("angle", rad_to_deg(state.theta), "deg"),
            Metric::new("angular_velocity", rad_to_deg(state.omega), "deg/s"),
            Metric::new("small_angle_period", params.small_angle_period(), "s"),
            Metric::new("period", params.period(), "s"),
            Metric::new("kinetic_energy", ke, "J"),
            Metric::new("potential_energy", pe, "J"),
            Metric::new("total_energy", ke + pe, "J"),
        ]
    }
}

impl ParamsCodec for PendulumDemo {
    fn into_tagged(params: PendulumParams) -> DemoParams {
        DemoParams::Pendulum(params)
    }

    fn from_tagged(params: DemoParams) -> Option<PendulumParams> {
        match params {
            DemoParams::Pendulum(p) => Some(p),
            _ => None,
        }
    }
}
