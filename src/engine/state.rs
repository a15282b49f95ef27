//! Simulation state primitives.
//!
//! Implements the per-demo state vocabulary:
//! - `Vec2` planar vectors (SI units, y up)
//! - `Coord`, the vector-space contract the integrators work over
//! - `PhaseState`, the (position, velocity) view a demo state exposes
//! - `Trajectory`, the append-only path trace drawn by some presenters

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// 2D vector for positions and velocities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
}

impl Vec2 {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    #[must_use]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Vector of the given magnitude pointing at `angle` radians from +x.
    #[must_use]
    pub fn from_polar(magnitude: f64, angle: f64) -> Self {
        Self {
            x: magnitude * angle.cos(),
            y: magnitude * angle.sin(),
        }
    }

    /// Magnitude squared.
    #[must_use]
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Magnitude (length).
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Dot product.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Normalize to unit vector (zero stays zero).
    #[must_use]
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag < f64::EPSILON {
            Self::zero()
        } else {
            self.scale(1.0 / mag)
        }
    }

    /// Scale by scalar.
    #[must_use]
    pub fn scale(&self, s: f64) -> Self {
        Self {
            x: self.x * s,
            y: self.y * s,
        }
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

/// Positions (or velocities) of two bodies, integrated as one coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BodyPair {
    /// First body.
    pub first: Vec2,
    /// Second body.
    pub second: Vec2,
}

impl BodyPair {
    /// Create a new pair.
    #[must_use]
    pub const fn new(first: Vec2, second: Vec2) -> Self {
        Self { first, second }
    }
}

impl Add for BodyPair {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            first: self.first + rhs.first,
            second: self.second + rhs.second,
        }
    }
}

impl Mul<f64> for BodyPair {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            first: self.first * rhs,
            second: self.second * rhs,
        }
    }
}

/// Generalized coordinate the integrators operate on.
///
/// Anything that can be added and scaled by a step size qualifies, plus a
/// finiteness check for the Jidoka guard.
pub trait Coord: Copy + Add<Output = Self> + Mul<f64, Output = Self> {
    /// Check if every component is finite.
    fn is_finite(&self) -> bool;
}

impl Coord for f64 {
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

impl Coord for Vec2 {
    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Coord for BodyPair {
    fn is_finite(&self) -> bool {
        Coord::is_finite(&self.first) && Coord::is_finite(&self.second)
    }
}

/// Phase-space view of a demo state.
///
/// The state keeps its own field names (height, theta, ...); this trait maps
/// them onto the generic (position, velocity, time) triple.
pub trait PhaseState {
    /// Coordinate type for position and velocity.
    type Coord: Coord;

    /// Current generalized position.
    fn position(&self) -> Self::Coord;

    /// Current generalized velocity.
    fn velocity(&self) -> Self::Coord;

    /// Overwrite the generalized position.
    fn set_position(&mut self, position: Self::Coord);

    /// Overwrite the generalized velocity.
    fn set_velocity(&mut self, velocity: Self::Coord);

    /// Elapsed simulated time in seconds.
    fn time(&self) -> f64;

    /// Advance elapsed simulated time.
    fn advance_time(&mut self, dt: f64);
}

/// One time-stamped point of a path trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample<P> {
    /// Simulated time of the sample (s).
    pub time: f64,
    /// Sampled point.
    pub point: P,
}

/// Append-only path trace for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory<P> {
    samples: Vec<TrajectorySample<P>>,
}

impl<P> Default for Trajectory<P> {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
        }
    }
}

impl<P> Trajectory<P> {
    /// Create an empty trajectory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample.
    pub fn push(&mut self, time: f64, point: P) {
        self.samples.push(TrajectorySample { time, point });
    }

    /// Drop all samples (on restart).
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// All samples in time order.
    #[must_use]
    pub fn samples(&self) -> &[TrajectorySample<P>] {
        &self.samples
    }

    /// Most recent sample.
    #[must_use]
    pub fn last(&self) -> Option<&TrajectorySample<P>> {
        self.samples.last()
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_arithmetic() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, -1.0);

        assert_eq!(a + b, Vec2::new(4.0, 1.0));
        assert_eq!(a - b, Vec2::new(-2.0, 3.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert_eq!(-a, Vec2::new(-1.0, -2.0));
        assert!((a.dot(&b) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_vec2_magnitude_and_normalize() {
        let v = Vec2::new(3.0, 4.0);
        assert!((v.magnitude() - 5.0).abs() < 1e-12);

        let n = v.normalize();
        assert!((n.magnitude() - 1.0).abs() < 1e-12);

        assert_eq!(Vec2::zero().normalize(), Vec2::zero());
    }

    #[test]
    fn test_vec2_from_polar() {
        let v = Vec2::from_polar(2.0, std::f64::consts::FRAC_PI_2);
        assert!(v.x.abs() < 1e-12);
        assert!((v.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_coord_finite() {
        assert!(Coord::is_finite(&1.0_f64));
        assert!(!Coord::is_finite(&f64::NAN));
        assert!(!Coord::is_finite(&Vec2::new(f64::INFINITY, 0.0)));

        let pair = BodyPair::new(Vec2::zero(), Vec2::new(0.0, f64::NAN));
        assert!(!Coord::is_finite(&pair));
    }

    #[test]
    fn test_body_pair_arithmetic() {
        let p = BodyPair::new(Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0));
        let q = p + p * 2.0;
        assert_eq!(q.first, Vec2::new(3.0, 0.0));
        assert_eq!(q.second, Vec2::new(0.0, 3.0));
    }

    #[test]
    fn test_trajectory_append_and_clear() {
        let mut trace = Trajectory::new();
        assert!(trace.is_empty());

        trace.push(0.0, 1.0_f64);
        trace.push(0.1, 0.9);
        assert_eq!(trace.len(), 2);
        assert!((trace.last().map_or(0.0, |s| s.time) - 0.1).abs() < f64::EPSILON);
        assert!(trace.samples()[0].time < trace.samples()[1].time);

        trace.clear();
        assert!(trace.is_empty());
    }
}
