//! Demo 5: Friction Slide
//!
//! A block shoved along a level track, slowed by kinetic friction, rolling
//! resistance and optional air drag, between two end walls.
//!
//! # Governing Equations
//!
//! ```text
//! a = −sign(v)·(μ_k·g + C_rr·g + ½ρv²C_dA / m)
//! d_stop = v₀² / (2(μ_k + C_rr)g)          (no drag)
//! ```
//!
//! Integration: trapezoidal position update on the wall clock. The
//! deceleration is constant between events, so the position is exact.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Demo, DemoKind, DemoParams, Metric};
use crate::domains::physics::{drag_force, sign, IntegratorType};
use crate::engine::clock::StepPolicy;
use crate::engine::state::{PhaseState, Vec2};
use crate::engine::{ParamsCodec, StopReason, Termination};
use crate::units::STANDARD_GRAVITY;

/// Speed below which the block is considered stopped (m/s).
pub const REST_SPEED: f64 = 0.01;

/// Friction slide parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FrictionParams {
    /// Block mass (kg).
    #[validate(range(min = 0.1, max = 100.0))]
    pub mass: f64,
    /// Gravitational acceleration (m/s²).
    #[validate(range(min = 0.0, max = 50.0))]
    pub gravity: f64,
    /// Kinetic friction coefficient μ_k.
    #[validate(range(min = 0.0, max = 1.5))]
    pub mu_kinetic: f64,
    /// Rolling resistance coefficient C_rr.
    #[validate(range(min = 0.0, max = 0.1))]
    pub rolling_resistance: f64,
    /// Initial velocity along the track (m/s), negative slides toward the
    /// near wall.
    #[validate(range(min = -30.0, max = 30.0))]
    pub initial_velocity: f64,
    /// Starting position measured from the near wall (m), at most
    /// `track_length`.
    #[validate(range(min = 0.0, max = 100.0))]
    pub initial_position: f64,
    /// Enable quadratic air drag.
    pub drag_enabled: bool,
    /// Drag coefficient (1.05 for a cube).
    #[validate(range(min = 0.0, max = 2.0))]
    pub drag_coefficient: f64,
    /// Frontal area (m²).
    #[validate(range(min = 0.0, max = 2.0))]
    pub frontal_area: f64,
    /// Air density (kg/m³).
    #[validate(range(min = 0.0, max = 10.0))]
    pub air_density: f64,
    /// Track length between the two walls (m).
    #[validate(range(min = 1.0, max = 100.0))]
    pub track_length: f64,
    /// Restitution at the walls, `0` stops the run on contact.
    #[validate(range(min = 0.0, max = 0.99))]
    pub wall_restitution: f64,
}

impl Default for FrictionParams {
    fn default() -> Self {
        Self {
            mass: 2.0,
            gravity: STANDARD_GRAVITY,
            mu_kinetic: 0.3,
            rolling_resistance: 0.0,
            initial_velocity: 5.0,
            initial_position: 0.0,
            drag_enabled: false,
            drag_coefficient: 1.05,
            frontal_area: 0.04,
            air_density: 1.225,
            track_length: 10.0,
            wall_restitution: 0.0,
        }
    }
}

impl FrictionParams {
    /// Speed-independent deceleration `(μ_k + C_rr)·g` (m/s²).
    #[must_use]
    pub fn contact_deceleration(&self) -> f64 {
        (self.mu_kinetic + self.rolling_resistance) * self.gravity
    }

    /// Friction plus rolling resistance force (N).
    #[must_use]
    pub fn friction_force(&self) -> f64 {
        self.mass * self.contact_deceleration()
    }

    /// Stopping distance without drag or walls (m); infinite when
    /// frictionless.
    #[must_use]
    pub fn stopping_distance(&self) -> f64 {
        let decel = self.contact_deceleration();
        if decel <= 0.0 {
            return f64::INFINITY;
        }
        self.initial_velocity * self.initial_velocity / (2.0 * decel)
    }

    /// Stopping time without drag or walls (s).
    #[must_use]
    pub fn stopping_time(&self) -> f64 {
        let decel = self.contact_deceleration();
        if decel <= 0.0 {
            return f64::INFINITY;
        }
        self.initial_velocity.abs() / decel
    }
}

/// Friction slide state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrictionState {
    /// Position along the track from the near wall (m).
    pub position: f64,
    /// Velocity (m/s).
    pub velocity: f64,
    /// Elapsed simulated time (s).
    pub time: f64,
    /// Sign of the motion since the last wall contact.
    pub direction: f64,
    /// Wall contacts so far.
    pub wall_hits: u32,
}

impl FrictionState {
    /// Kinetic energy (J).
    #[must_use]
    pub fn kinetic_energy(&self, params: &FrictionParams) -> f64 {
        0.5 * params.mass * self.velocity * self.velocity
    }
}

impl PhaseState for FrictionState {
    type Coord = f64;

    fn position(&self) -> f64 {
        self.position
    }

    fn velocity(&self) -> f64 {
        self.velocity
    }

    fn set_position(&mut self, position: f64) {
        self.position = position;
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

/// Block sliding against friction.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrictionDemo;

impl FrictionDemo {
    fn hit_wall(params: &FrictionParams, state: &mut FrictionState, wall: f64) -> Termination {
        state.position = wall;
        state.wall_hits += 1;
        if params.wall_restitution <= 0.0 {
            state.velocity = 0.0;
            return Termination::Stop(StopReason::Boundary);
        }
        state.velocity = -params.wall_restitution * state.velocity;
        state.direction = sign(state.velocity);
        Termination::Continue
    }
}

impl Demo for FrictionDemo {
    type Params = FrictionParams;
    type State = FrictionState;
    type TracePoint = ();

    const KIND: DemoKind = DemoKind::FrictionSlide;

    fn integrator(&self) -> IntegratorType {
        IntegratorType::Trapezoidal
    }

    fn step_policy(&self) -> StepPolicy {
        StepPolicy::wall_clock()
    }

    fn clamp_params(&self, params: &FrictionParams) -> FrictionParams {
        FrictionParams {
            mass: params.mass.max(0.01),
            gravity: params.gravity.max(0.0),
            mu_kinetic: params.mu_kinetic.max(0.0),
            rolling_resistance: params.rolling_resistance.max(0.0),
            drag_coefficient: params.drag_coefficient.max(0.0),
            frontal_area: params.frontal_area.max(0.0),
            air_density: params.air_density.max(0.0),
            track_length: params.track_length.max(0.01),
            initial_position: params
                .initial_position
                .clamp(0.0, params.track_length.max(0.01)),
            wall_restitution: params.wall_restitution.clamp(0.0, 0.99),
            ..params.clone()
        }
    }

    fn init(&self, params: &FrictionParams) -> FrictionState {
        FrictionState {
            position: params.initial_position,
            velocity: params.initial_velocity,
            time: 0.0,
            direction: sign(params.initial_velocity),
            wall_hits: 0,
        }
    }

    fn acceleration(&self, params: &FrictionParams, state: &FrictionState) -> f64 {
        let mut resist = params.contact_deceleration();
        if params.drag_enabled {
            resist += drag_force(
                state.velocity.abs(),
                params.air_density,
                params.drag_coefficient,
                params.frontal_area,
            ) / params.mass;
        }
        -sign(state.velocity) * resist
    }

    fn bodies(&self, _params: &FrictionParams, state: &FrictionState) -> Vec<Vec2> {
        vec![Vec2::new(state.position, 0.0)]
    }

    fn terminate(&self, params: &FrictionParams, state: &mut FrictionState) -> Termination {
        if state.position >= params.track_length && state.velocity > 0.0 {
            if let stop @ Termination::Stop(_) =
                Self::hit_wall(params, state, params.track_length)
            {
                return stop;
            }
        } else if state.position <= 0.0 && state.velocity < 0.0 {
            if let stop @ Termination::Stop(_) = Self::hit_wall(params, state, 0.0) {
                return stop;
            }
        }

        // Friction never reverses motion: a sign flip means the block stopped
        // somewhere inside the last step.
        if state.velocity * state.direction <= 0.0 || state.velocity.abs() < REST_SPEED {
            state.velocity = 0.0;
            return Termination::Stop(StopReason::AtRest);
        }
        Termination::Continue
    }

    fn metrics(&self, params: &FrictionParams, state: &FrictionState) -> Vec<Metric> {
        let ke0 = 0.5 * params.mass * params.initial_velocity * params.initial_velocity;
        let ke = state.kinetic_energy(params);
        vec![
            Metric::new("position", state.position, "m"),
            Metric::new("speed", state.velocity.abs(), "m/s"),
            Metric::new("friction_force", params.friction_force(), "N"),
            Metric::new("stopping_distance", params.stopping_distance(), "m"),
            Metric::new("stopping_time", params.stopping_time(), "s"),
            Metric::new("kinetic_energy", ke, "J"),
            Metric::new("energy_dissipated", ke0 - ke, "J"),
        ]
    }
}

impl ParamsCodec for FrictionDemo {
    fn into_tagged(params: FrictionParams) -> DemoParams {
        DemoParams::FrictionSlide(params)
    }

    fn from_tagged(params: DemoParams) -> Option<FrictionParams> {
        match params {
            DemoParams::FrictionSlide(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sliding(position: f64, velocity: f64) -> FrictionState {
        FrictionState {
            position,
            velocity,
            time: 0.0,
            direction: sign(velocity),
            wall_hits: 0,
        }
    }

    #[test]
    fn test_friction_opposes_motion() {
        let params = FrictionParams::default();
        let forward = FrictionDemo.acceleration(&params, &sliding(1.0, 3.0));
        let backward = FrictionDemo.acceleration(&params, &sliding(1.0, -3.0));

        assert!((forward + 0.3 * 9.81).abs() < 1e-12);
        assert!((backward - 0.3 * 9.81).abs() < 1e-12);
        assert!(FrictionDemo.acceleration(&params, &sliding(1.0, 0.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drag_adds_to_resistance() {
        let params = FrictionParams {
            drag_enabled: true,
            ..FrictionParams::default()
        };
        let a = FrictionDemo.acceleration(&params, &sliding(1.0, 10.0));
        assert!(a < -params.contact_deceleration());
    }

    #[test]
    fn test_stopping_distance_formula() {
        let params = FrictionParams {
            initial_velocity: 6.0,
            mu_kinetic: 0.2,
            rolling_resistance: 0.05,
            gravity: 10.0,
            ..FrictionParams::default()
        };
        // 36 / (2·0.25·10) = 7.2
        assert!((params.stopping_distance() - 7.2).abs() < 1e-12);
        assert!((params.stopping_time() - 2.4).abs() < 1e-12);

        let frictionless = FrictionParams {
            mu_kinetic: 0.0,
            ..FrictionParams::default()
        };
        assert!(frictionless.stopping_distance().is_infinite());
    }

    #[test]
    fn test_velocity_crossing_zero_is_rest() {
        let params = FrictionParams::default();
        let mut s = sliding(3.0, 1.0);
        s.velocity = -0.02;

        assert_eq!(
            FrictionDemo.terminate(&params, &mut s),
            Termination::Stop(StopReason::AtRest)
        );
        assert!(s.velocity.abs() < f64::EPSILON);
    }

    #[test]
    fn test_inelastic_wall_is_boundary() {
        let params = FrictionParams::default();
        let mut s = sliding(10.2, 2.0);

        assert_eq!(
            FrictionDemo.terminate(&params, &mut s),
            Termination::Stop(StopReason::Boundary)
        );
        assert!((s.position - 10.0).abs() < f64::EPSILON);
        assert_eq!(s.wall_hits, 1);
    }

    #[test]
    fn test_elastic_wall_reflects() {
        let params = FrictionParams {
            wall_restitution: 0.5,
            ..FrictionParams::default()
        };
        let mut s = sliding(10.1, 4.0);

        assert_eq!(FrictionDemo.terminate(&params, &mut s), Termination::Continue);
        assert!((s.velocity + 2.0).abs() < 1e-12);
        assert!((s.direction + 1.0).abs() < f64::EPSILON);

        // Friction now opposes the reversed motion
        assert!(FrictionDemo.acceleration(&params, &s) > 0.0);
    }

    #[test]
    fn test_zero_push_rests_immediately() {
        let params = FrictionParams {
            initial_velocity: 0.0,
            ..FrictionParams::default()
        };
        let mut s = FrictionDemo.init(&params);
        assert_eq!(
            FrictionDemo.terminate(&params, &mut s),
            Termination::Stop(StopReason::AtRest)
        );
    }

    #[test]
    fn test_start_position_clamped_onto_track() {
        let params = FrictionParams {
            initial_position: 40.0,
            track_length: 10.0,
            ..FrictionParams::default()
        };
        let clamped = FrictionDemo.clamp_params(&params);
        assert!((clamped.initial_position - 10.0).abs() < f64::EPSILON);

        let state = FrictionDemo.init(&clamped);
        assert!((state.position - 10.0).abs() < f64::EPSILON);
        assert!((FrictionDemo.bodies(&clamped, &state)[0].x - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_leftward_push_from_mid_track_slides() {
        let params = FrictionParams {
            initial_position: 5.0,
            initial_velocity: -3.0,
            ..FrictionParams::default()
        };
        let mut s = FrictionDemo.init(&params);
        FrictionDemo.advance(&params, &mut s, 0.05);

        assert_eq!(FrictionDemo.terminate(&params, &mut s), Termination::Continue);
        assert!(s.position < 5.0);
        assert!(s.velocity < 0.0 && s.velocity > -3.0);
    }

    #[test]
    fn test_leftward_push_from_near_wall_is_boundary() {
        let params = FrictionParams {
            initial_velocity: -3.0,
            ..FrictionParams::default()
        };
        let mut s = FrictionDemo.init(&params);
        FrictionDemo.advance(&params, &mut s, 0.05);

        assert_eq!(
            FrictionDemo.terminate(&params, &mut s),
            Termination::Stop(StopReason::Boundary)
        );
        assert!(s.position.abs() < f64::EPSILON);
    }

    #[test]
    fn test_uses_trapezoidal_rule() {
        assert_eq!(FrictionDemo.integrator(), IntegratorType::Trapezoidal);
    }
}
