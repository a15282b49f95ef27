//! Unit conversions at the presentation boundary (Poka-Yoke).
//!
//! Physics runs in SI throughout. Pixels and degrees only appear where a
//! host draws or reads user input, and the conversions go through `uom`
//! quantities so a length can not be mistaken for an angle.

use serde::{Deserialize, Serialize};
use uom::si::angle::{degree, radian};
use uom::si::f64::{Angle, Length};
use uom::si::length::meter;

use crate::engine::state::Vec2;
use crate::error::{SimError, SimResult};

/// Gravitational constant (m³ kg⁻¹ s⁻²).
pub const G: f64 = 6.674_30e-11;

/// Standard gravity (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Default display scale: 100 px = 1 m.
pub const DEFAULT_PIXELS_PER_METER: f64 = 100.0;

/// Convert degrees to radians.
#[must_use]
pub fn deg_to_rad(degrees: f64) -> f64 {
    Angle::new::<degree>(degrees).get::<radian>()
}

/// Convert radians to degrees.
#[must_use]
pub fn rad_to_deg(radians: f64) -> f64 {
    Angle::new::<radian>(radians).get::<degree>()
}

/// Mapping between SI lengths and screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelScale {
    pixels_per_meter: f64,
}

impl PixelScale {
    /// Create a scale.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidParameter` unless the ratio is finite and
    /// strictly positive.
    pub fn new(pixels_per_meter: f64) -> SimResult<Self> {
        if !(pixels_per_meter.is_finite() && pixels_per_meter > 0.0) {
            return Err(SimError::invalid_parameter(
                "pixels_per_meter",
                pixels_per_meter,
                "must be finite and positive",
            ));
        }
        Ok(Self { pixels_per_meter })
    }

    /// Pixels per meter.
    #[must_use]
    pub const fn pixels_per_meter(&self) -> f64 {
        self.pixels_per_meter
    }

    /// Length to pixels.
    #[must_use]
    pub fn to_pixels(&self, length: Length) -> f64 {
        length.get::<meter>() * self.pixels_per_meter
    }

    /// Pixels to length.
    #[must_use]
    pub fn from_pixels(&self, pixels: f64) -> Length {
        Length::new::<meter>(pixels / self.pixels_per_meter)
    }

    /// Meters to pixels.
    #[must_use]
    pub fn meters_to_pixels(&self, meters: f64) -> f64 {
        self.to_pixels(Length::new::<meter>(meters))
    }

    /// Pixels to meters.
    #[must_use]
    pub fn pixels_to_meters(&self, pixels: f64) -> f64 {
        self.from_pixels(pixels).get::<meter>()
    }

    /// Scale a world point to pixels, keeping the world axes.
    #[must_use]
    pub fn scale_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            self.meters_to_pixels(point.x),
            self.meters_to_pixels(point.y),
        )
    }

    /// Project a world point (y up, origin at `ground`) to screen space
    /// (y down).
    #[must_use]
    pub fn project(&self, point: Vec2, origin_x: f64, ground_y: f64) -> (f64, f64) {
        (
            origin_x + self.meters_to_pixels(point.x),
            ground_y - self.meters_to_pixels(point.y),
        )
    }
}

impl Default for PixelScale {
    fn default() -> Self {
        Self {
            pixels_per_meter: DEFAULT_PIXELS_PER_METER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_conversion() {
        assert!((deg_to_rad(180.0) - std::f64::consts::PI).abs() < 1e-12);
        assert!((rad_to_deg(std::f64::consts::FRAC_PI_2) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_scale() {
        let scale = PixelScale::default();
        assert!((scale.meters_to_pixels(1.5) - 150.0).abs() < 1e-9);
        assert!((scale.pixels_to_meters(250.0) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_pendulum_length_bounds_in_pixels() {
        // 50-300 px corresponds to 0.5-3 m
        let scale = PixelScale::default();
        assert!((scale.pixels_to_meters(50.0) - 0.5).abs() < 1e-12);
        assert!((scale.pixels_to_meters(300.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_scale_rejected() {
        assert!(PixelScale::new(0.0).is_err());
        assert!(PixelScale::new(-5.0).is_err());
        assert!(PixelScale::new(f64::NAN).is_err());
        assert!(PixelScale::new(50.0).is_ok());
    }

    #[test]
    fn test_scale_point_keeps_axes() {
        let scale = PixelScale::new(120.0).unwrap_or_default();
        let p = scale.scale_point(Vec2::new(0.5, -2.0));
        assert!((p.x - 60.0).abs() < 1e-9);
        assert!((p.y + 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_project_flips_y() {
        let scale = PixelScale::default();
        let (sx, sy) = scale.project(Vec2::new(1.0, 2.0), 10.0, 400.0);
        assert!((sx - 110.0).abs() < 1e-9);
        assert!((sy - 200.0).abs() < 1e-9);
    }
}
