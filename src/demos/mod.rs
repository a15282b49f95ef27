//! The demo suite: six single-phenomenon simulations.
//!
//! Every demo is a strategy plugged into the one generic
//! [`SimulationLoop`](crate::engine::SimulationLoop): a force/acceleration
//! model, an integration rule, a step policy and a termination policy.
//!
//! # Demos
//!
//! 1. [`drop`] - free fall with optional quadratic drag, bouncing on the ground
//! 2. [`spring`] - damped spring-mass oscillator
//! 3. [`gravity_pair`] - two point masses under Newtonian attraction
//! 4. [`pendulum`] - nonlinear damped pendulum
//! 5. [`friction`] - block sliding against kinetic friction
//! 6. [`projectile`] - closed-form projectile kinematics

pub mod drop;
pub mod friction;
pub mod gravity_pair;
pub mod pendulum;
pub mod projectile;
pub mod spring;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use drop::{DropDemo, DropParams, DropState};
pub use friction::{FrictionDemo, FrictionParams, FrictionState};
pub use gravity_pair::{GravityPairDemo, GravityPairParams, GravityPairState};
pub use pendulum::{PendulumDemo, PendulumParams, PendulumState};
pub use projectile::{ProjectileDemo, ProjectileParams, ProjectileState};
pub use spring::{SpringDemo, SpringParams, SpringState};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::Debug;
use std::str::FromStr;
use validator::Validate;

use crate::domains::physics::IntegratorType;
use crate::engine::clock::StepPolicy;
use crate::engine::state::{PhaseState, Vec2};
use crate::engine::{DynSimulation, SimulationLoop, Termination};
use crate::error::{SimError, SimResult};

/// A simulation whose demo was chosen at runtime.
pub type AnySimulation = Box<dyn DynSimulation>;

/// Build an idle simulation loop for the demo the parameters belong to.
#[must_use]
pub fn simulation_for(params: DemoParams) -> AnySimulation {
    match params {
        DemoParams::Drop(p) => Box::new(SimulationLoop::new(DropDemo, p)),
        DemoParams::Spring(p) => Box::new(SimulationLoop::new(SpringDemo, p)),
        DemoParams::GravityPair(p) => Box::new(SimulationLoop::new(GravityPairDemo, p)),
        DemoParams::Pendulum(p) => Box::new(SimulationLoop::new(PendulumDemo, p)),
        DemoParams::FrictionSlide(p) => Box::new(SimulationLoop::new(FrictionDemo, p)),
        DemoParams::Projectile(p) => Box::new(SimulationLoop::new(ProjectileDemo, p)),
    }
}

/// Common trait for all demos.
///
/// Implementors are stateless strategies; parameters and state are owned by
/// the simulation loop and passed in.
pub trait Demo {
    /// User-editable configuration (SI units).
    type Params: Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned;

    /// Mutable run state.
    type State: PhaseState + Clone + Debug + PartialEq + Serialize;

    /// Point recorded in the path trace (`()` for demos without one).
    type TracePoint: Clone + Debug + Serialize;

    /// Which demo this is.
    const KIND: DemoKind;

    /// Re-apply edited parameters to the displayed state while not running.
    const LIVE_PREVIEW: bool = false;

    /// Integration rule used for every step of a run.
    fn integrator(&self) -> IntegratorType {
        IntegratorType::SemiImplicitEuler
    }

    /// Frame-to-step policy.
    fn step_policy(&self) -> StepPolicy;

    /// Clamp parameters into a numerically safe domain (input boundary).
    fn clamp_params(&self, params: &Self::Params) -> Self::Params;

    /// Initial state for a fresh run.
    fn init(&self, params: &Self::Params) -> Self::State;

    /// Generalized acceleration (SI) for the current state.
    fn acceleration(
        &self,
        params: &Self::Params,
        state: &Self::State,
    ) -> <Self::State as PhaseState>::Coord;

    /// Advance the state by one step of `dt` seconds.
    fn advance(&self, params: &Self::Params, state: &mut Self::State, dt: f64) {
        self.integrator()
            .advance(state, |s| self.acceleration(params, s), dt);
    }

    /// Termination policy, evaluated once per step after the position update.
    ///
    /// May mutate the state (snap to rest, reflect on a bounce).
    fn terminate(&self, params: &Self::Params, state: &mut Self::State) -> Termination;

    /// Point to append to the path trace after a step.
    fn trace_point(&self, _state: &Self::State) -> Option<Self::TracePoint> {
        None
    }

    /// World positions of the drawn bodies (m, y up), in draw order.
    fn bodies(&self, params: &Self::Params, state: &Self::State) -> Vec<Vec2>;

    /// Derived display metrics, recomputed on demand.
    fn metrics(&self, params: &Self::Params, state: &Self::State) -> Vec<Metric>;
}

/// Identifier of a demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoKind {
    /// Free fall with bounce.
    Drop,
    /// Spring-mass oscillator.
    Spring,
    /// Two-body gravitation.
    GravityPair,
    /// Nonlinear pendulum.
    Pendulum,
    /// Friction slider.
    FrictionSlide,
    /// Projectile motion.
    Projectile,
}

impl DemoKind {
    /// All demos in menu order.
    pub const ALL: [Self; 6] = [
        Self::Drop,
        Self::Spring,
        Self::GravityPair,
        Self::Pendulum,
        Self::FrictionSlide,
        Self::Projectile,
    ];

    /// Machine name, as used in configuration files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Spring => "spring",
            Self::GravityPair => "gravity_pair",
            Self::Pendulum => "pendulum",
            Self::FrictionSlide => "friction_slide",
            Self::Projectile => "projectile",
        }
    }

    /// Human-readable title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Drop => "Free Fall & Bounce",
            Self::Spring => "Spring-Mass Oscillator",
            Self::GravityPair => "Two-Body Gravitation",
            Self::Pendulum => "Pendulum Swing",
            Self::FrictionSlide => "Friction Slide",
            Self::Projectile => "Projectile Motion",
        }
    }
}

impl std::fmt::Display for DemoKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemoKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| SimError::UnknownDemo(s.to_string()))
    }
}

/// Parameters for any demo, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DemoParams {
    /// Free fall.
    Drop(DropParams),
    /// Spring-mass.
    Spring(SpringParams),
    /// Two-body gravitation.
    GravityPair(GravityPairParams),
    /// Pendulum.
    Pendulum(PendulumParams),
    /// Friction slider.
    FrictionSlide(FrictionParams),
    /// Projectile.
    Projectile(ProjectileParams),
}

impl DemoParams {
    /// Default parameters for a demo.
    #[must_use]
    pub fn defaults(kind: DemoKind) -> Self {
        match kind {
            DemoKind::Drop => Self::Drop(DropParams::default()),
            DemoKind::Spring => Self::Spring(SpringParams::default()),
            DemoKind::GravityPair => Self::GravityPair(GravityPairParams::default()),
            DemoKind::Pendulum => Self::Pendulum(PendulumParams::default()),
            DemoKind::FrictionSlide => Self::FrictionSlide(FrictionParams::default()),
            DemoKind::Projectile => Self::Projectile(ProjectileParams::default()),
        }
    }

    /// Which demo these parameters configure.
    #[must_use]
    pub const fn kind(&self) -> DemoKind {
        match self {
            Self::Drop(_) => DemoKind::Drop,
            Self::Spring(_) => DemoKind::Spring,
            Self::GravityPair(_) => DemoKind::GravityPair,
            Self::Pendulum(_) => DemoKind::Pendulum,
            Self::FrictionSlide(_) => DemoKind::FrictionSlide,
            Self::Projectile(_) => DemoKind::Projectile,
        }
    }

    /// Validate against the documented input ranges.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Validation` listing every out-of-range field.
    pub fn validate_ranges(&self) -> SimResult<()> {
        match self {
            Self::Drop(p) => p.validate()?,
            Self::Spring(p) => p.validate()?,
            Self::GravityPair(p) => p.validate()?,
            Self::Pendulum(p) => p.validate()?,
            Self::FrictionSlide(p) => p.validate()?,
            Self::Projectile(p) => p.validate()?,
        }
        Ok(())
    }
}

/// A derived display value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Metric identifier (e.g., "natural_frequency").
    pub name: String,
    /// Value in SI units.
    pub value: f64,
    /// Unit label.
    pub unit: String,
}

impl Metric {
    /// Create a new metric.
    #[must_use]
    pub fn new(name: &str, value: f64, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            value,
            unit: unit.to_string(),
        }
    }
}

/// Find a metric by name.
#[must_use]
pub fn find_metric<'a>(metrics: &'a [Metric], name: &str) -> Option<&'a Metric> {
    metrics.iter().find(|m| m.name == name)
}
