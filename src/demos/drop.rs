//! Demo 1: Free Fall & Bounce
//!
//! A ball dropped from rest, optionally slowed by quadratic air drag,
//! bouncing on the ground with a coefficient of restitution.
//!
//! # Governing Equations
//!
//! ```text
//! a = −g − sign(v)·½ρv²C_dA / m
//! bounce: v' = −e·v
//! ```
//!
//! Integration: semi-implicit Euler, wall-clock step with skip (the motion
//! between bounces is monotonic, so the simple policy is enough).

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Demo, DemoKind, DemoParams, Metric};
use crate::domains::physics::{drag_force, sign};
use crate::engine::clock::StepPolicy;
use crate::engine::state::{PhaseState, Vec2};
use crate::engine::{ParamsCodec, StopReason, Termination};

/// Impact speed below which the ball is considered at rest (m/s).
pub const REST_SPEED: f64 = 0.5;

/// Net acceleration below which a motionless airborne ball is at rest (m/s²).
pub const REST_ACCELERATION: f64 = 1e-4;

/// Drop demo parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DropParams {
    /// Ball mass (kg).
    #[validate(range(min = 0.1, max = 1000.0))]
    pub mass: f64,
    /// Gravitational acceleration (m/s²).
    #[validate(range(min = 0.0, max = 50.0))]
    pub gravity: f64,
    /// Initial height of the ball's lowest point above ground (m).
    #[validate(range(min = 0.0, max = 100.0))]
    pub drop_height: f64,
    /// Ball radius (m).
    #[validate(range(min = 0.01, max = 1.0))]
    pub radius: f64,
    /// Coefficient of restitution at the ground, `0` sticks.
    #[validate(range(min = 0.0, max = 0.99))]
    pub restitution: f64,
    /// Enable quadratic air drag.
    pub drag_enabled: bool,
    /// Drag coefficient (dimensionless, 0.47 for a sphere).
    #[validate(range(min = 0.0, max = 2.0))]
    pub drag_coefficient: f64,
    /// Air density (kg/m³).
    #[validate(range(min = 0.0, max = 10.0))]
    pub air_density: f64,
}

impl Default for DropParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            gravity: 9.8,
            drop_height: 4.0,
            radius: 0.1,
            restitution: 0.7,
            drag_enabled: false,
            drag_coefficient: 0.47,
            air_density: 1.225,
        }
    }
}

impl DropParams {
    /// Frontal area of the ball (m²).
    #[must_use]
    pub fn cross_section(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }

    /// Terminal velocity `√(2mg / ρC_dA)`; infinite when drag is off.
    #[must_use]
    pub fn terminal_velocity(&self) -> f64 {
        let k = self.air_density * self.drag_coefficient * self.cross_section();
        if !self.drag_enabled || k <= 0.0 {
            return f64::INFINITY;
        }
        (2.0 * self.mass * self.gravity / k).sqrt()
    }
}

/// Drop demo state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropState {
    /// Height of the ball's lowest point above ground (m).
    pub height: f64,
    /// Vertical velocity, up positive (m/s).
    pub velocity: f64,
    /// Elapsed simulated time (s).
    pub time: f64,
    /// Ground contacts so far.
    pub bounces: u32,
}

impl DropState {
    /// Kinetic energy (J).
    #[must_use]
    pub fn kinetic_energy(&self, params: &DropParams) -> f64 {
        0.5 * params.mass * self.velocity * self.velocity
    }

    /// Gravitational potential energy relative to the ground (J).
    #[must_use]
    pub fn potential_energy(&self, params: &DropParams) -> f64 {
        params.mass * params.gravity * self.height
    }
}

impl PhaseState for DropState {
    type Coord = f64;

    fn position(&self) -> f64 {
        self.height
    }

    fn velocity(&self) -> f64 {
        self.velocity
    }

    fn set_position(&mut self, position: f64) {
        self.height = position;
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

/// Free fall with bounce.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropDemo;

impl Demo for DropDemo {
    type Params = DropParams;
    type State = DropState;
    type TracePoint = ();

    const KIND: DemoKind = DemoKind::Drop;

    fn step_policy(&self) -> StepPolicy {
        StepPolicy::wall_clock()
    }

    fn clamp_params(&self, params: &DropParams) -> DropParams {
        DropParams {
            mass: params.mass.max(0.01),
            gravity: params.gravity.max(0.0),
            drop_height: params.drop_height.max(0.0),
            radius: params.radius.max(0.001),
            restitution: params.restitution.clamp(0.0, 0.99),
            drag_coefficient: params.drag_coefficient.max(0.0),
            air_density: params.air_density.max(0.0),
            ..params.clone()
        }
    }

    fn init(&self, params: &DropParams) -> DropState {
        DropState {
            height: params.drop_height,
            velocity: 0.0,
            time: 0.0,
            bounces: 0,
        }
    }

    fn acceleration(&self, params: &DropParams, state: &DropState) -> f64 {
        let mut a = -params.gravity;
        if params.drag_enabled {
            let drag = drag_force(
                state.velocity.abs(),
                params.air_density,
                params.drag_coefficient,
                params.cross_section(),
            );
            a -= sign(state.velocity) * drag / params.mass;
        }
        a
    }

    fn terminate(&self, params: &DropParams, state: &mut DropState) -> Termination {
        if state.height > 0.0 || state.velocity > 0.0 {
            // Weightless: nothing will ever move a ball that has stopped
            if state.velocity.abs() < REST_SPEED
                && self.acceleration(params, state).abs() < REST_ACCELERATION
            {
                state.velocity = 0.0;
                return Termination::Stop(StopReason::AtRest);
            }
            return Termination::Continue;
        }

        state.height = 0.0;
        if params.restitution <= 0.0 {
            state.velocity = 0.0;
            return Termination::Stop(StopReason::Boundary);
        }

        state.velocity = -params.restitution * state.velocity;
        state.bounces += 1;

        if state.velocity.abs() < REST_SPEED {
            state.velocity = 0.0;
            return Termination::Stop(StopReason::AtRest);
        }
        Termination::Continue
    }

    fn bodies(&self, params: &DropParams, state: &DropState) -> Vec<Vec2> {
        vec![Vec2::new(0.0, state.height + params.radius)]
    }

    fn metrics(&self, params: &DropParams, state: &DropState) -> Vec<Metric> {
        let ke = state.kinetic_energy(params);
        let pe = state.potential_energy(params);
        vec![
            Metric::new("height", state.height, "m"),
            Metric::new("speed", state.velocity.abs(), "m/s"),
            Metric::new("kinetic_energy", ke, "J"),
            Metric::new("potential_energy", pe, "J"),
            Metric::new("total_energy", ke + pe, "J"),
            Metric::new("terminal_velocity", params.terminal_velocity(), "m/s"),
            Metric::new("bounces", f64::from(state.bounces), ""),
        ]
    }
}

impl ParamsCodec for DropDemo {
    fn into_tagged(params: DropParams) -> DemoParams {
        DemoParams::Drop(params)
    }

    fn from_tagged(params: DemoParams) -> Option<DropParams> {
        match params {
            DemoParams::Drop(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(height: f64, velocity: f64) -> DropState {
        DropState {
            height,
            velocity,
            time: 0.0,
            bounces: 0,
        }
    }

    #[test]
    fn test_free_fall_acceleration_is_gravity() {
        let params = DropParams::default();
        let a = DropDemo.acceleration(&params, &state(2.0, -3.0));
        assert!((a + 9.8).abs() < 1e-12);
    }

    #[test]
    fn test_drag_opposes_velocity() {
        let params = DropParams {
            drag_enabled: true,
            ..DropParams::default()
        };

        let falling = DropDemo.acceleration(&params, &state(2.0, -10.0));
        let rising = DropDemo.acceleration(&params, &state(2.0, 10.0));

        // Falling: drag pushes up, so |a| < g
        assert!(falling > -params.gravity);
        // Rising: drag pushes down, so |a| > g
        assert!(rising < -params.gravity);
    }

    #[test]
    fn test_bounce_reflects_with_restitution() {
        let params = DropParams::default();
        let mut s = state(-0.01, -5.0);

        let verdict = DropDemo.terminate(&params, &mut s);
        assert_eq!(verdict, Termination::Continue);
        assert!(s.height.abs() < f64::EPSILON);
        assert!((s.velocity - 3.5).abs() < 1e-12);
        assert_eq!(s.bounces, 1);
    }

    #[test]
    fn test_slow_impact_comes_to_rest() {
        let params = DropParams::default();
        let mut s = state(-0.001, -0.6);

        let verdict = DropDemo.terminate(&params, &mut s);
        assert_eq!(verdict, Termination::Stop(StopReason::AtRest));
        assert!(s.velocity.abs() < f64::EPSILON);
    }

    #[test]
    fn test_inelastic_ground_is_boundary_stop() {
        let params = DropParams {
            restitution: 0.0,
            ..DropParams::default()
        };
        let mut s = state(-0.1, -8.0);

        assert_eq!(
            DropDemo.terminate(&params, &mut s),
            Termination::Stop(StopReason::Boundary)
        );
        assert!(s.height.abs() < f64::EPSILON);
        assert!(s.velocity.abs() < f64::EPSILON);
    }

    #[test]
    fn test_airborne_continues() {
        let params = DropParams::default();
        let mut s = state(1.0, -2.0);
        assert_eq!(DropDemo.terminate(&params, &mut s), Termination::Continue);

        // Just bounced: at ground level but moving up
        let mut s = state(0.0, 2.0);
        assert_eq!(DropDemo.terminate(&params, &mut s), Termination::Continue);
    }

    #[test]
    fn test_terminal_velocity() {
        let params = DropParams {
            drag_enabled: true,
            ..DropParams::default()
        };
        let vt = params.terminal_velocity();
        let k = params.air_density * params.drag_coefficient * params.cross_section();
        assert!((vt - (2.0 * params.mass * params.gravity / k).sqrt()).abs() < 1e-9);

        assert!(DropParams::default().terminal_velocity().is_infinite());
    }

    #[test]
    fn test_clamp_params_prevents_zero_mass() {
        let params = DropParams {
            mass: 0.0,
            restitution: 1.5,
            ..DropParams::default()
        };
        let clamped = DropDemo.clamp_params(&params);
        assert!((clamped.mass - 0.01).abs() < f64::EPSILON);
        assert!((clamped.restitution - 0.99).abs() < f64::EPSILON);
    }

    #[test]
    fn test_metrics_energy_sum() {
        let params = DropParams::default();
        let s = state(2.0, -3.0);
        let metrics = DropDemo.metrics(&params, &s);

        let total = super::super::find_metric(&metrics, "total_energy").map(|m| m.value);
        let expected = 0.5 * 9.0 + 9.8 * 2.0;
        assert!((total.unwrap_or_default() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_weightless_ball_rests_in_the_air() {
        let params = DropParams {
            gravity: 0.0,
            ..DropParams::default()
        };
        let mut s = DropDemo.init(&params);
        DropDemo.advance(&params, &mut s, 0.016);

        assert_eq!(
            DropDemo.terminate(&params, &mut s),
            Termination::Stop(StopReason::AtRest)
        );
        assert!((s.height - params.drop_height).abs() < f64::EPSILON);
        assert_eq!(s.bounces, 0);
    }

    #[test]
    fn test_apex_is_not_rest() {
        let params = DropParams::default();
        let mut apex = state(1.0, 0.0);
        assert_eq!(DropDemo.terminate(&params, &mut apex), Termination::Continue);
    }
}
