//! Demo 2: Spring-Mass Oscillator
//!
//! A mass on a Hookean spring with linear viscous damping.
//!
//! # Governing Equations
//!
//! ```text
//! m·ẍ = −k·x − c·ẋ
//! ω₀ = √(k/m)
//! ζ  = c / (2√(km))
//! E  = ½mẋ² + ½kx²
//! ```
//!
//! Integration: semi-implicit Euler on a fixed 60 Hz accumulator. With
//! `c = 0` the energy error stays bounded at order `ω₀·dt`.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Demo, DemoKind, DemoParams, Metric};
use crate::engine::clock::StepPolicy;
use crate::engine::state::{PhaseState, Vec2};
use crate::engine::{ParamsCodec, StopReason, Termination};

/// Speed below which the mass may be considered at rest (m/s).
pub const REST_SPEED: f64 = 0.01;

/// Displacement below which the mass may be considered at rest (m).
pub const REST_DISPLACEMENT: f64 = 0.001;

/// Band around `ζ = 1` classified as critically damped.
pub const CRITICAL_BAND: f64 = 0.01;

/// Spring demo parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SpringParams {
    /// Mass (kg).
    #[validate(range(min = 0.1, max = 100.0))]
    pub mass: f64,
    /// Spring constant k (N/m).
    #[validate(range(min = 1.0, max = 500.0))]
    pub spring_constant: f64,
    /// Damping coefficient c (N·s/m).
    #[validate(range(min = 0.0, max = 50.0))]
    pub damping: f64,
    /// Initial displacement from equilibrium (m).
    #[validate(range(min = -2.0, max = 2.0))]
    pub initial_displacement: f64,
    /// Initial velocity (m/s).
    #[validate(range(min = -20.0, max = 20.0))]
    pub initial_velocity: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            spring_constant: 10.0,
            damping: 0.5,
            initial_displacement: 0.5,
            initial_velocity: 0.0,
        }
    }
}

/// Damping regime of the oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DampingRegime {
    /// `ζ < 1`: decaying oscillation.
    Underdamped,
    /// `|ζ − 1| < 0.01`: fastest non-oscillating return.
    CriticallyDamped,
    /// `ζ > 1`: slow non-oscillating return.
    Overdamped,
}

impl DampingRegime {
    /// Classify a damping ratio.
    #[must_use]
    pub fn classify(zeta: f64) -> Self {
        if (zeta - 1.0).abs() < CRITICAL_BAND {
            Self::CriticallyDamped
        } else if zeta < 1.0 {
            Self::Underdamped
        } else {
            Self::Overdamped
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Underdamped => "Underdamped",
            Self::CriticallyDamped => "Critically damped",
            Self::Overdamped => "Overdamped",
        }
    }
}

impl SpringParams {
    /// Natural angular frequency ω₀ = √(k/m) (rad/s).
    #[must_use]
    pub fn natural_frequency(&self) -> f64 {
        (self.spring_constant / self.mass).sqrt()
    }

    /// Damping ratio ζ = c / (2√(km)).
    #[must_use]
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.spring_constant * self.mass).sqrt())
    }

    /// Damping regime.
    #[must_use]
    pub fn regime(&self) -> DampingRegime {
        DampingRegime::classify(self.damping_ratio())
    }

    /// Undamped period 2π/ω₀ (s).
    #[must_use]
    pub fn period(&self) -> f64 {
        2.0 * std::f64::consts::PI / self.natural_frequency()
    }
}

/// Spring demo state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringState {
    /// Displacement from equilibrium (m).
    pub displacement: f64,
    /// Velocity (m/s).
    pub velocity: f64,
    /// Elapsed simulated time (s).
    pub time: f64,
}

impl SpringState {
    /// Mass at equilibrium, not moving.
    #[must_use]
    pub const fn at_rest() -> Self {
        Self {
            displacement: 0.0,
            velocity: 0.0,
            time: 0.0,
        }
    }

    /// Kinetic energy ½mv² (J).
    #[must_use]
    pub fn kinetic_energy(&self, params: &SpringParams) -> f64 {
        0.5 * params.mass * self.velocity * self.velocity
    }

    /// Elastic potential energy ½kx² (J).
    #[must_use]
    pub fn potential_energy(&self, params: &SpringParams) -> f64 {
        0.5 * params.spring_constant * self.displacement * self.displacement
    }

    /// Total mechanical energy (J).
    #[must_use]
    pub fn total_energy(&self, params: &SpringParams) -> f64 {
        self.kinetic_energy(params) + self.potential_energy(params)
    }
}

impl PhaseState for SpringState {
    type Coord = f64;

    fn position(&self) -> f64 {
        self.displacement
    }

    fn velocity(&self) -> f64 {
        self.velocity
    }

    fn set_position(&mut self, position: f64) {
        self.displacement = position;
    }

    fn set_velocity(&mut self, velocity: f64) {
        self.velocity = velocity;
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn advance_time(&mut self, dt: f64) {
        self.time += dt;
    }
}

/// Damped spring-mass oscillator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpringDemo;

impl Demo for SpringDemo {
    type Params = SpringParams;
    type State = SpringState;
    /// Displacement over time.
    type TracePoint = f64;

    const KIND: DemoKind = DemoKind::Spring;

    fn step_policy(&self) -> StepPolicy {
        StepPolicy::fixed_60hz()
    }

    fn clamp_params(&self, params: &SpringParams) -> SpringParams {
        SpringParams {
            mass: params.mass.max(0.01),
            spring_constant: params.spring_constant.max(0.01),
            damping: params.damping.max(0.0),
            ..params.clone()
        }
    }

    fn init(&self, params: &SpringParams) -> SpringState {
        SpringState {
            displacement: params.initial_displacement,
            velocity: params.initial_velocity,
            time: 0.0,
        }
    }

    fn acceleration(&self, params: &SpringParams, state: &SpringState) -> f64 {
        (-params.spring_constant * state.displacement - params.damping * state.velocity)
            / params.mass
    }

    fn terminate(&self, _params: &SpringParams, state: &mut SpringState) -> Termination {
        if state.velocity.abs() < REST_SPEED && state.displacement.abs() < REST_DISPLACEMENT {
            state.velocity = 0.0;
            Termination::Stop(StopReason::AtRest)
        } else {
            Termination::Continue
        }
    }

    fn trace_point(&self, state: &SpringState) -> Option<f64> {
        Some(state.displacement)
    }

    fn bodies(&self, _params: &SpringParams, state: &SpringState) -> Vec<Vec2> {
        vec![Vec2::new(state.displacement, 0.0)]
    }

    fn metrics(&self, params: &SpringParams, state: &SpringState) -> Vec<Metric> {
        vec![
            Metric::new("natural_frequency", params.natural_frequency(), "rad/s"),
            Metric::new("damping_ratio", params.damping_ratio(), ""),
            Metric::new("period", params.period(), "s"),
            Metric::new("spring_force", -params.spring_constant * state.displacement, "N"),
            Metric::new("kinetic_energy", state.kinetic_energy(params), "J"),
            Metric::new("potential_energy", state.potential_energy(params), "J"),
            Metric::new("total_energy", state.total_energy(params), "J"),
        ]
    }
}

impl ParamsCodec for SpringDemo {
    fn into_tagged(params: SpringParams) -> DemoParams {
        DemoParams::Spring(params)
    }

    fn from_tagged(params: DemoParams) -> Option<SpringParams> {
        match params {
            DemoParams::Spring(p) => Some(p),
            _ => None,
        }
    }
}
