//! Demo 3: Two-Body Gravitation
//!
//! Two point masses attract each other along the line joining them. The
//! run ends when their surfaces touch; there is no collision response.
//!
//! # Governing Equations
//!
//! ```text
//! F  = s·G·m₁m₂ / r²          (s = display speed, non-physical)
//! a₁ = +F/m₁ · r̂,  a₂ = −F/m₂ · r̂
//! ```
//!
//! Both accelerations come from the same positions, so the step is
//! momentum-conserving up to rounding.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Demo, DemoKind, DemoParams, Metric};
use crate::engine::clock::StepPolicy;
use crate::engine::state::{BodyPair, PhaseState, Vec2};
use crate::engine::{ParamsCodec, StopReason, Termination};
use crate::units::G;

/// Two-body demo parameters.
///
/// The bodies start on the x axis with the centre of mass at the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GravityPairParams {
    /// Mass of the first body (kg).
    #[validate(range(min = 1.0e6, max = 1.0e15))]
    pub mass_a: f64,
    /// Mass of the second body (kg).
    #[validate(range(min = 1.0e6, max = 1.0e15))]
    pub mass_b: f64,
    /// Radius of the first body (m).
    #[validate(range(min = 0.1, max = 50.0))]
    pub radius_a: f64,
    /// Radius of the second body (m).
    #[validate(range(min = 0.1, max = 50.0))]
    pub radius_b: f64,
    /// Initial centre-to-centre distance (m).
    #[validate(range(min = 1.0, max = 1000.0))]
    pub separation: f64,
    /// Initial relative speed perpendicular to the axis (m/s), split so the
    /// total momentum is zero.
    #[validate(range(min = -50.0, max = 50.0))]
    pub tangential_speed: f64,
    /// Multiplier on G so the motion is watchable at human time scales.
    #[validate(range(min = 1.0, max = 10000.0))]
    pub display_speed: f64,
}

impl Default for GravityPairParams {
    fn default() -> Self {
        Self {
            mass_a: 1.0e12,
            mass_b: 5.0e11,
            radius_a: 5.0,
            radius_b: 4.0,
            separation: 100.0,
            tangential_speed: 0.0,
            display_speed: 100.0,
        }
    }
}

impl GravityPairParams {
    /// Total mass (kg).
    #[must_use]
    pub fn total_mass(&self) -> f64 {
        self.mass_a + self.mass_b
    }

    /// Effective gravitational parameter `s·G·(m₁ + m₂)` (m³/s²).
    #[must_use]
    pub fn mu(&self) -> f64 {
        self.display_speed * G * self.total_mass()
    }

    /// Separation at which the surfaces touch (m).
    #[must_use]
    pub fn contact_distance(&self) -> f64 {
        self.radius_a + self.radius_b
    }

    /// Attraction magnitude at distance `r` (N).
    #[must_use]
    pub fn force_at(&self, r: f64) -> f64 {
        self.display_speed * G * self.mass_a * self.mass_b / (r * r)
    }

    /// Time for two bodies released at rest `r0` apart to reach contact (s).
    #[must_use]
    pub fn time_to_contact(&self, r0: f64) -> f64 {
        let contact = self.contact_distance();
        if r0 <= contact {
            return 0.0;
        }
        self.fall_time(r0, contact)
    }

    /// Time to fall radially from rest at `r_max` down to `r` (s).
    ///
    /// Closed-form radial Kepler fall:
    /// `t = √(r_max³/2μ)·(√(x(1−x)) + acos √x)` with `x = r / r_max`.
    #[must_use]
    pub fn fall_time(&self, r_max: f64, r: f64) -> f64 {
        let x = (r / r_max).clamp(0.0, 1.0);
        (r_max.powi(3) / (2.0 * self.mu())).sqrt() * ((x * (1.0 - x)).sqrt() + x.sqrt().acos())
    }

    /// Time for a radial trajectory with energy `ε > 0` to close from `r`
    /// to contact, `r = a(cosh η − 1)`, `t = √(a³/μ)(sinh η − η)`, `a = μ/2ε`.
    fn hyperbolic_fall_time(&self, energy: f64, r: f64) -> f64 {
        let mu = self.mu();
        let a = mu / (2.0 * energy);
        let elapsed = |radius: f64| {
            let eta = (1.0 + radius / a).acosh();
            (a.powi(3) / mu).sqrt() * (eta.sinh() - eta)
        };
        elapsed(r) - elapsed(self.contact_distance())
    }
}

/// Two-body state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GravityPairState {
    /// Body positions (m).
    pub positions: BodyPair,
    /// Body velocities (m/s).
    pub velocities: BodyPair,
    /// Elapsed simulated time (s).
    pub time: f64,
}

impl GravityPairState {
    /// Vector from the first body to the second (m).
    #[must_use]
    pub fn relative(&self) -> Vec2 {
        self.positions.second - self.positions.first
    }

    /// Centre-to-centre distance (m).
    #[must_use]
    pub fn separation(&self) -> f64 {
        self.relative().magnitude()
    }

    /// Total linear momentum (kg·m/s).
    #[must_use]
    pub fn momentum(&self, params: &GravityPairParams) -> Vec2 {
        self.velocities.first * params.mass_a + self.velocities.second * params.mass_b
    }

    /// Total kinetic energy (J).
    #[must_use]
    pub fn kinetic_energy(&self, params: &GravityPairParams) -> f64 {
        0.5 * params.mass_a * self.velocities.first.magnitude_squared()
            + 0.5 * params.mass_b * self.velocities.second.magnitude_squared()
    }

    /// Velocity of the second body relative to the first (m/s).
    #[must_use]
    pub fn relative_velocity(&self) -> Vec2 {
        self.velocities.second - self.velocities.first
    }

    /// Time until the surfaces touch from the current positions and
    /// velocities (s), infinite when the bodies escape or swing past each
    /// other.
    ///
    /// Uses the radial Kepler solution for the current separation and
    /// radial speed; an orbit whose periapsis clears contact never touches.
    #[must_use]
    pub fn time_to_contact(&self, params: &GravityPairParams) -> f64 {
        let contact = params.contact_distance();
        let r = self.separation();
        if r <= contact {
            return 0.0;
        }

        let mu = params.mu();
        let rel = self.relative();
        let vel = self.relative_velocity();
        let radial_speed = rel.dot(&vel) / r;
        let energy = 0.5 * vel.magnitude_squared() - mu / r;

        let h = rel.x * vel.y - rel.y * vel.x;
        let eccentricity = (1.0 + 2.0 * energy * h * h / (mu * mu)).max(0.0).sqrt();
        let periapsis = h * h / mu / (1.0 + eccentricity);
        if periapsis > contact {
            return f64::INFINITY;
        }

        let radial_energy = 0.5 * radial_speed * radial_speed - mu / r;
        if radial_energy >= 0.0 {
            if radial_speed >= 0.0 {
                return f64::INFINITY;
            }
            if radial_energy <= f64::EPSILON * mu / r {
                // Parabolic: t(r) = √(2r³/9μ)
                let t = |radius: f64| (2.0 * radius.powi(3) / (9.0 * mu)).sqrt();
                return t(r) - t(contact);
            }
            return params.hyperbolic_fall_time(radial_energy, r);
        }

        let r_max = -mu / radial_energy;
        if radial_speed > 0.0 {
            // Climb to r_max first, then fall all the way
            params.fall_time(r_max, r) + params.fall_time(r_max, contact)
        } else {
            params.fall_time(r_max, contact) - params.fall_time(r_max, r)
        }
    }

    /// Gravitational potential energy `−s·G·m₁m₂/r` (J).
    #[must_use]
    pub fn potential_energy(&self, params: &GravityPairParams) -> f64 {
        -params.display_speed * G * params.mass_a * params.mass_b / self.separation()
    }
}

impl PhaseState for GravityPairState {
    type Coord = BodyPair;

    fn position(&self) -> BodyPair {
        self.positions
    }

    fn velocity(&self) -> BodyPair {
        self.velocities
    }

    fn set_position(&mut self, position: BodyPair) {
        self.positions = position;
    }

    fn set_velocity(&mut self, velocity: BodyPair) {
        self.velocities = velocity;
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn advance_time(&mut self, dt: f64) {
        self.time += dt;
    }
}

/// Mutual gravitation of two bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct GravityPairDemo;

impl Demo for GravityPairDemo {
    type Params = GravityPairParams;
    type State = GravityPairState;
    /// Both body positions.
    type TracePoint = BodyPair;

    const KIND: DemoKind = DemoKind::GravityPair;

    fn step_policy(&self) -> StepPolicy {
        StepPolicy::fixed_60hz()
    }

    fn clamp_params(&self, params: &GravityPairParams) -> GravityPairParams {
        GravityPairParams {
            mass_a: params.mass_a.max(0.01),
            mass_b: params.mass_b.max(0.01),
            radius_a: params.radius_a.max(0.0),
            radius_b: params.radius_b.max(0.0),
            separation: params.separation.max(0.01),
            display_speed: params.display_speed.max(0.0),
            ..params.clone()
        }
    }

    fn init(&self, params: &GravityPairParams) -> GravityPairState {
        let total = params.total_mass();
        let share_a = params.mass_b / total;
        let share_b = params.mass_a / total;

        GravityPairState {
            positions: BodyPair::new(
                Vec2::new(-params.separation * share_a, 0.0),
                Vec2::new(params.separation * share_b, 0.0),
            ),
            velocities: BodyPair::new(
                Vec2::new(0.0, params.tangential_speed * share_a),
                Vec2::new(0.0, -params.tangential_speed * share_b),
            ),
            time: 0.0,
        }
    }

    fn acceleration(&self, params: &GravityPairParams, state: &GravityPairState) -> BodyPair {
        let r = state.relative();
        let distance = r.magnitude();
        if distance <= f64::EPSILON {
            return BodyPair::default();
        }
        let direction = r * (1.0 / distance);
        let force = params.force_at(distance);

        BodyPair::new(
            direction * (force / params.mass_a),
            -direction * (force / params.mass_b),
        )
    }

    fn terminate(&self, params: &GravityPairParams, state: &mut GravityPairState) -> Termination {
        if state.separation() <= params.contact_distance() {
            Termination::Stop(StopReason::Collision)
        } else {
            Termination::Continue
        }
    }

    fn trace_point(&self, state: &GravityPairState) -> Option<BodyPair> {
        Some(state.positions)
    }

    fn bodies(&self, _params: &GravityPairParams, state: &GravityPairState) -> Vec<Vec2> {
        vec![state.positions.first, state.positions.second]
    }

    fn metrics(&self, params: &GravityPairParams, state: &GravityPairState) -> Vec<Metric> {
        let separation = state.separation();
        let ke = state.kinetic_energy(params);
        let pe = state.potential_energy(params);
        vec![
            Metric::new("separation", separation, "m"),
            Metric::new("force", params.force_at(separation), "N"),
            Metric::new("time_to_contact", state.time_to_contact(params), "s"),
            Metric::new("momentum", state.momentum(params).magnitude(), "kg·m/s"),
            Metric::new("kinetic_energy", ke, "J"),
            Metric::new("potential_energy", pe, "J"),
            Metric::new("total_energy", ke + pe, "J"),
        ]
    }
}

impl ParamsCodec for GravityPairDemo {
    fn into_tagged(params: GravityPairParams) -> DemoParams {
        DemoParams::GravityPair(params)
    }

    fn from_tagged(params: DemoParams) -> Option<GravityPairParams> {
        match params {
            DemoParams::GravityPair(p) => Some(p),
            _ => None,
        }
    }
}
