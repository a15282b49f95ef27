//! Demo 6: Projectile Motion
//!
//! Drag-free ballistic flight from a launch point above flat ground,
//! evaluated in closed form at each step time instead of integrated.
//!
//! # Governing Equations
//!
//! ```text
//! x(t) = v₀cos α · t
//! y(t) = h + v₀sin α · t − ½gt²
//! T    = (v_y + √(v_y² + 2gh)) / g
//! ```

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Demo, DemoKind, DemoParams, Metric};
use crate::engine::clock::StepPolicy;
use crate::engine::state::{PhaseState, Vec2};
use crate::engine::{ParamsCodec, StopReason, Termination};
use crate::units::{deg_to_rad, STANDARD_GRAVITY};

/// Smallest gravity accepted, keeps the time of flight finite (m/s²).
pub const MIN_GRAVITY: f64 = 0.01;

/// Projectile parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProjectileParams {
    /// Launch speed (m/s).
    #[validate(range(min = 1.0, max = 100.0))]
    pub launch_speed: f64,
    /// Launch angle above the horizontal (°).
    #[validate(range(min = 0.0, max = 90.0))]
    pub launch_angle_deg: f64,
    /// Launch height above the ground (m).
    #[validate(range(min = 0.0, max = 100.0))]
    pub launch_height: f64,
    /// Gravitational acceleration (m/s²).
    #[validate(range(min = 0.01, max = 50.0))]
    pub gravity: f64,
}

impl Default for ProjectileParams {
    fn default() -> Self {
        Self {
            launch_speed: 20.0,
            launch_angle_deg: 45.0,
            launch_height: 0.0,
            gravity: STANDARD_GRAVITY,
        }
    }
}

impl ProjectileParams {
    /// Launch velocity vector (m/s).
    #[must_use]
    pub fn launch_velocity(&self) -> Vec2 {
        Vec2::from_polar(self.launch_speed, deg_to_rad(self.launch_angle_deg))
    }

    /// Time until the projectile returns to the ground (s).
    #[must_use]
    pub fn time_of_flight(&self) -> f64 {
        let vy = self.launch_velocity().y;
        (vy + (vy * vy + 2.0 * self.gravity * self.launch_height).sqrt()) / self.gravity
    }

    /// Horizontal distance at landing (m).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.launch_velocity().x * self.time_of_flight()
    }

    /// Time to the top of the arc (s), zero when launched level or downward.
    #[must_use]
    pub fn time_to_apex(&self) -> f64 {
        (self.launch_velocity().y / self.gravity).max(0.0)
    }

    /// Peak height above the ground (m).
    #[must_use]
    pub fn max_height(&self) -> f64 {
        let vy = self.launch_velocity().y.max(0.0);
        self.launch_height + vy * vy / (2.0 * self.gravity)
    }

    /// Position at time `t` (m).
    #[must_use]
    pub fn position_at(&self, t: f64) -> Vec2 {
        let v0 = self.launch_velocity();
        Vec2::new(
            v0.x * t,
            self.launch_height + v0.y * t - 0.5 * self.gravity * t * t,
        )
    }

    /// Velocity at time `t` (m/s).
    #[must_use]
    pub fn velocity_at(&self, t: f64) -> Vec2 {
        let v0 = self.launch_velocity();
        Vec2::new(v0.x, v0.y - self.gravity * t)
    }
}

/// Projectile state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileState {
    /// Position, x downrange and y up (m).
    pub position: Vec2,
    /// Velocity (m/s).
    pub velocity: Vec2,
    /// Elapsed simulated time (s).
    pub time: f64,
}

impl PhaseState for ProjectileState {
    type Coord = Vec2;

    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn advance_time(&mut self, dt: f64) {
        self.time += dt;
    }
}

/// Closed-form projectile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectileDemo;

impl Demo for ProjectileDemo {
    type Params = ProjectileParams;
    type State = ProjectileState;
    /// Position along the arc.
    type TracePoint = Vec2;

    const KIND: DemoKind = DemoKind::Projectile;

    fn step_policy(&self) -> StepPolicy {
        StepPolicy::wall_clock()
    }

    fn clamp_params(&self, params: &ProjectileParams) -> ProjectileParams {
        ProjectileParams {
            launch_speed: params.launch_speed.max(0.0),
            launch_height: params.launch_height.max(0.0),
            gravity: params.gravity.max(MIN_GRAVITY),
            ..params.clone()
        }
    }

    fn init(&self, params: &ProjectileParams) -> ProjectileState {
        ProjectileState {
            position: params.position_at(0.0),
            velocity: params.launch_velocity(),
            time: 0.0,
        }
    }

    fn acceleration(&self, params: &ProjectileParams, _state: &ProjectileState) -> Vec2 {
        Vec2::new(0.0, -params.gravity)
    }

    /// Evaluates the exact trajectory; no integration error accumulates.
    fn advance(&self, params: &ProjectileParams, state: &mut ProjectileState, dt: f64) {
        state.advance_time(dt);
        state.position = params.position_at(state.time);
        state.velocity = params.velocity_at(state.time);
    }

    fn terminate(&self, params: &ProjectileParams, state: &mut ProjectileState) -> Termination {
        let landing = params.time_of_flight();
        if state.time < landing {
            return Termination::Continue;
        }
        state.time = landing;
        state.position = Vec2::new(params.range(), 0.0);
        state.velocity = params.velocity_at(landing);
        Termination::Stop(StopReason::Boundary)
    }

    fn trace_point(&self, state: &ProjectileState) -> Option<Vec2> {
        Some(state.position)
    }

    fn bodies(&self, _params: &ProjectileParams, state: &ProjectileState) -> Vec<Vec2> {
        vec![state.position]
    }

    fn metrics(&self, params: &ProjectileParams, state: &ProjectileState) -> Vec<Metric> {
        vec![
            Metric::new("time_of_flight", params.time_of_flight(), "s"),
            Metric::new("range", params.range(), "m"),
            Metric::new("max_height", params.max_height(), "m"),
            Metric::new("time_to_apex", params.time_to_apex(), "s"),
            Metric::new("height", state.position.y, "m"),
            Metric::new("distance", state.position.x, "m"),
            Metric::new("speed", state.velocity.magnitude(), "m/s"),
        ]
    }
}

impl ParamsCodec for ProjectileDemo {
    fn into_tagged(params: ProjectileParams) -> DemoParams {
        DemoParams::Projectile(params)
    }

    fn from_tagged(params: DemoParams) -> Option<ProjectileParams> {
        match params {
            DemoParams::Projectile(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ground_range() {
        let params = ProjectileParams {
            launch_speed: 20.0,
            launch_angle_deg: 45.0,
            launch_height: 0.0,
            gravity: 10.0,
        };
        // v²·sin(2α)/g = 400/10
        assert!((params.range() - 40.0).abs() < 1e-9);
        assert!((params.time_of_flight() - 2.0 * 2.0_f64.sqrt()).abs() < 1e-9);
        assert!((params.max_height() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_launch_from_height_lengthens_flight() {
        let ground = ProjectileParams::default();
        let cliff = ProjectileParams {
            launch_height: 20.0,
            ..ProjectileParams::default()
        };
        assert!(cliff.time_of_flight() > ground.time_of_flight());
        assert!(cliff.range() > ground.range());

        // Lands exactly at y = 0
        let landing = cliff.position_at(cliff.time_of_flight());
        assert!(landing.y.abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_launch_has_no_rise() {
        let params = ProjectileParams {
            launch_angle_deg: 0.0,
            launch_height: 5.0,
            ..ProjectileParams::default()
        };
        assert!(params.time_to_apex().abs() < f64::EPSILON);
        assert!((params.max_height() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_closed_form_advance_matches_formula() {
        let params = ProjectileParams::default();
        let mut s = ProjectileDemo.init(&params);
        for _ in 0..10 {
            ProjectileDemo.advance(&params, &mut s, 0.05);
        }
        let expected = params.position_at(0.5);
        assert!((s.position - expected).magnitude() < 1e-9);
    }

    #[test]
    fn test_landing_clamps_and_stops() {
        let params = ProjectileParams::default();
        let mut s = ProjectileDemo.init(&params);
        ProjectileDemo.advance(&params, &mut s, params.time_of_flight() + 0.05);

        assert_eq!(
            ProjectileDemo.terminate(&params, &mut s),
            Termination::Stop(StopReason::Boundary)
        );
        assert!(s.position.y.abs() < f64::EPSILON);
        assert!((s.position.x - params.range()).abs() < 1e-9);
        assert!((s.time - params.time_of_flight()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_gravity_clamped_away_from_zero() {
        let params = ProjectileParams {
            gravity: 0.0,
            ..ProjectileParams::default()
        };
        let clamped = ProjectileDemo.clamp_params(&params);
        assert!((clamped.gravity - MIN_GRAVITY).abs() < f64::EPSILON);
        assert!(clamped.time_of_flight().is_finite());
    }
}
