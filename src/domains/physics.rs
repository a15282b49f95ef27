//! Numerical integration for the demo suite.
//!
//! Implements the two step rules the demos choose from:
//! - Semi-implicit (symplectic) Euler, the default
//! - Trapezoidal position update (average of old and new velocity)
//!
//! # Energy Behaviour
//!
//! Semi-implicit Euler is symplectic: for an undamped oscillator the energy
//! error stays bounded (it oscillates at order `ω·dt`) instead of drifting.
//!
//! Each demo picks exactly one rule; the loop never mixes rules in a run.

use serde::{Deserialize, Serialize};

use crate::engine::state::PhaseState;

/// Integration rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorType {
    /// Semi-implicit Euler: velocity first, then position from new velocity.
    ///
    /// ```text
    /// v_{n+1} = v_n + h * a(x_n, v_n)
    /// x_{n+1} = x_n + h * v_{n+1}
    /// ```
    #[default]
    SemiImplicitEuler,
    /// Heun-like position update using the mean velocity over the step.
    ///
    /// ```text
    /// v_{n+1} = v_n + h * a(x_n, v_n)
    /// x_{n+1} = x_n + h * (v_n + v_{n+1}) / 2
    /// ```
    Trapezoidal,
}

impl IntegratorType {
    /// Advance `state` by `dt` seconds under `acceleration`.
    ///
    /// `dt` must be strictly positive; the clock guarantees it. Non-finite
    /// results are not special-cased here, the Jidoka guard catches them.
    pub fn advance<S, F>(self, state: &mut S, acceleration: F, dt: f64)
    where
        S: PhaseState,
        F: Fn(&S) -> S::Coord,
    {
        debug_assert!(dt > 0.0, "integration step must be positive");

        let a = acceleration(state);
        let v_old = state.velocity();
        let v_new = v_old + a * dt;
        state.set_velocity(v_new);

        let x = state.position();
        match self {
            Self::SemiImplicitEuler => state.set_position(x + v_new * dt),
            Self::Trapezoidal => state.set_position(x + (v_old + v_new) * (0.5 * dt)),
        }

        state.advance_time(dt);
    }

    /// Global error order of the position update.
    #[must_use]
    pub const fn error_order(&self) -> u32 {
        match self {
            Self::SemiImplicitEuler => 1,
            Self::Trapezoidal => 2,
        }
    }

    /// Check if the rule is symplectic (bounded energy error).
    #[must_use]
    pub const fn is_symplectic(&self) -> bool {
        matches!(self, Self::SemiImplicitEuler)
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SemiImplicitEuler => "semi-implicit Euler",
            Self::Trapezoidal => "trapezoidal",
        }
    }
}

/// Sign of `x` with zero mapping to zero (unlike `f64::signum`).
#[must_use]
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Quadratic air drag force magnitude `½ρv²C_dA` (N).
#[must_use]
pub fn drag_force(speed: f64, air_density: f64, drag_coefficient: f64, area: f64) -> f64 {
    0.5 * air_density * speed * speed * drag_coefficient * area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::Vec2;

    #[derive(Debug, Clone, Copy)]
    struct Particle {
        x: f64,
        v: f64,
        t: f64,
    }

    impl PhaseState for Particle {
        type Coord = f64;

        fn position(&self) -> f64 {
            self.x
        }
        fn velocity(&self) -> f64 {
            self.v
        }
        fn set_position(&mut self, position: f64) {
            self.x = position;
        }
        fn set_velocity(&mut self, velocity: f64) {
            self.v = velocity;
        }
        fn time(&self) -> f64 {
            self.t
        }
        fn advance_time(&mut self, dt: f64) {
            self.t += dt;
        }
    }

    #[derive(Debug, Clone, Copy)]
    struct Planar {
        x: Vec2,
        v: Vec2,
        t: f64,
    }

    impl PhaseState for Planar {
        type Coord = Vec2;

        fn position(&self) -> Vec2 {
            self.x
        }
        fn velocity(&self) -> Vec2 {
            self.v
        }
        fn set_position(&mut self, position: Vec2) {
            self.x = position;
        }
        fn set_velocity(&mut self, velocity: Vec2) {
            self.v = velocity;
        }
        fn time(&self) -> f64 {
            self.t
        }
        fn advance_time(&mut self, dt: f64) {
            self.t += dt;
        }
    }

    #[test]
    fn test_semi_implicit_uses_new_velocity() {
        let mut p = Particle { x: 0.0, v: 0.0, t: 0.0 };
        IntegratorType::SemiImplicitEuler.advance(&mut p, |_| -10.0, 0.1);

        assert!((p.v - (-1.0)).abs() < 1e-12);
        assert!((p.x - (-0.1)).abs() < 1e-12);
        assert!((p.t - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_trapezoidal_uses_mean_velocity() {
        let mut p = Particle { x: 0.0, v: 0.0, t: 0.0 };
        IntegratorType::Trapezoidal.advance(&mut p, |_| -10.0, 0.1);

        assert!((p.v - (-1.0)).abs() < 1e-12);
        assert!((p.x - (-0.05)).abs() < 1e-12);
    }

    #[test]
    fn test_trapezoidal_exact_for_constant_acceleration() {
        // x(t) = ½at² exactly under constant a
        let mut p = Particle { x: 0.0, v: 0.0, t: 0.0 };
        for _ in 0..100 {
            IntegratorType::Trapezoidal.advance(&mut p, |_| 2.0, 0.01);
        }
        assert!((p.x - 1.0).abs() < 1e-9, "x = {}", p.x);
    }

    #[test]
    fn test_vector_coordinates() {
        let mut p = Planar {
            x: Vec2::zero(),
            v: Vec2::new(1.0, 0.0),
            t: 0.0,
        };
        IntegratorType::SemiImplicitEuler.advance(&mut p, |_| Vec2::new(0.0, -9.81), 0.5);

        assert!((p.x.x - 0.5).abs() < 1e-12);
        assert!((p.v.y - (-4.905)).abs() < 1e-12);
    }

    #[test]
    fn test_semi_implicit_bounded_energy_on_oscillator() {
        let omega_sq = 4.0;
        let energy = |p: &Particle| 0.5 * p.v * p.v + 0.5 * omega_sq * p.x * p.x;

        let mut p = Particle { x: 1.0, v: 0.0, t: 0.0 };
        let e0 = energy(&p);
        let mut worst: f64 = 0.0;

        for _ in 0..100_000 {
            IntegratorType::SemiImplicitEuler.advance(&mut p, |s| -omega_sq * s.x, 0.01);
            worst = worst.max((energy(&p) - e0).abs() / e0);
        }

        // Error of order ω·dt, no secular growth
        assert!(worst < 0.02, "worst relative energy error {worst}");
    }

    #[test]
    fn test_integrator_properties() {
        assert!(IntegratorType::SemiImplicitEuler.is_symplectic());
        assert!(!IntegratorType::Trapezoidal.is_symplectic());
        assert_eq!(IntegratorType::SemiImplicitEuler.error_order(), 1);
        assert_eq!(IntegratorType::Trapezoidal.error_order(), 2);
        assert_eq!(IntegratorType::default(), IntegratorType::SemiImplicitEuler);
        assert_eq!(IntegratorType::Trapezoidal.name(), "trapezoidal");
    }

    #[test]
    fn test_sign_and_drag() {
        assert!((sign(3.0) - 1.0).abs() < f64::EPSILON);
        assert!((sign(-0.1) + 1.0).abs() < f64::EPSILON);
        assert!(sign(0.0).abs() < f64::EPSILON);

        // ½ · 1.2 · 10² · 0.5 · 0.1 = 3.0
        assert!((drag_force(10.0, 1.2, 0.5, 0.1) - 3.0).abs() < 1e-12);
    }
}
