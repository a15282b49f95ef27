//! Configuration system with YAML schema and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe configuration structs, parameters tagged by demo kind
//! - Range validation via `validator`
//! - Runtime semantic validation

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::demos::{simulation_for, AnySimulation, DemoKind, DemoParams};
use crate::engine::clock::DEFAULT_MAX_FRAME_DT;
use crate::error::{SimError, SimResult};
use crate::units::{PixelScale, DEFAULT_PIXELS_PER_METER};

/// Schema major version this build understands.
const SCHEMA_MAJOR: &str = "1";

/// Top-level configuration: one demo plus how to run and draw it.
///
/// ```yaml
/// schema_version: "1.0"
/// pixels_per_meter: 100.0
/// demo:
///   kind: spring
///   spring_constant: 20.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SuiteConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Display scale at the presentation boundary.
    #[validate(range(min = 1.0, max = 10000.0))]
    #[serde(default = "default_pixels_per_meter")]
    pub pixels_per_meter: f64,

    /// Headless run settings.
    #[validate(nested)]
    #[serde(default)]
    pub run: RunConfig,

    /// Demo parameters, tagged by `kind`.
    pub demo: DemoParams,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

const fn default_pixels_per_meter() -> f64 {
    DEFAULT_PIXELS_PER_METER
}

impl SuiteConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> SimResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns `SimError::YamlParse` if serialization fails.
    pub fn to_yaml(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> SuiteConfigBuilder {
        SuiteConfigBuilder::default()
    }

    /// Run every validation layer: schema ranges, demo parameter ranges,
    /// then semantic constraints.
    ///
    /// # Errors
    ///
    /// Returns the first failing layer's error.
    pub fn check(&self) -> SimResult<()> {
        self.validate()?;
        self.demo.validate_ranges()?;
        self.validate_semantic()
    }

    /// Validate semantic constraints beyond schema.
    fn validate_semantic(&self) -> SimResult<()> {
        let major = self.schema_version.split('.').next().unwrap_or_default();
        if major != SCHEMA_MAJOR {
            return Err(SimError::config(format!(
                "Unsupported schema version '{}', expected {SCHEMA_MAJOR}.x",
                self.schema_version
            )));
        }

        if self.run.frame_interval() > DEFAULT_MAX_FRAME_DT {
            return Err(SimError::config(format!(
                "Frame rate {} fps is below the {:.0} fps the frame clock accepts",
                self.run.frame_rate,
                1.0 / DEFAULT_MAX_FRAME_DT
            )));
        }

        if let DemoParams::FrictionSlide(p) = &self.demo {
            if p.initial_position > p.track_length {
                return Err(SimError::config(format!(
                    "Block starts off the track: position {} m > track length {} m",
                    p.initial_position, p.track_length
                )));
            }
        }

        if let DemoParams::GravityPair(p) = &self.demo {
            if p.separation <= p.contact_distance() {
                return Err(SimError::config(format!(
                    "Bodies overlap at start: separation {} m <= radii sum {} m",
                    p.separation,
                    p.contact_distance()
                )));
            }
        }

        Ok(())
    }

    /// Which demo is configured.
    #[must_use]
    pub const fn kind(&self) -> DemoKind {
        self.demo.kind()
    }

    /// Display scale.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidParameter` for a non-positive ratio.
    pub fn pixel_scale(&self) -> SimResult<PixelScale> {
        PixelScale::new(self.pixels_per_meter)
    }

    /// Build an idle simulation for the configured demo.
    #[must_use]
    pub fn simulation(&self) -> AnySimulation {
        simulation_for(self.demo.clone())
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            pixels_per_meter: default_pixels_per_meter(),
            run: RunConfig::default(),
            demo: DemoParams::defaults(DemoKind::Drop),
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct SuiteConfigBuilder {
    demo: Option<DemoParams>,
    pixels_per_meter: Option<f64>,
    frame_rate: Option<u32>,
    duration: Option<f64>,
}

impl SuiteConfigBuilder {
    /// Set the demo parameters.
    #[must_use]
    pub fn demo(mut self, params: DemoParams) -> Self {
        self.demo = Some(params);
        self
    }

    /// Use a demo's default parameters.
    #[must_use]
    pub fn demo_kind(self, kind: DemoKind) -> Self {
        self.demo(DemoParams::defaults(kind))
    }

    /// Set the display scale.
    #[must_use]
    pub const fn pixels_per_meter(mut self, ratio: f64) -> Self {
        self.pixels_per_meter = Some(ratio);
        self
    }

    /// Set the synthetic frame rate for headless runs.
    #[must_use]
    pub const fn frame_rate(mut self, fps: u32) -> Self {
        self.frame_rate = Some(fps);
        self
    }

    /// Set the host-time budget for headless runs (s).
    #[must_use]
    pub const fn duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> SuiteConfig {
        let mut config = SuiteConfig::default();

        if let Some(demo) = self.demo {
            config.demo = demo;
        }
        if let Some(ratio) = self.pixels_per_meter {
            config.pixels_per_meter = ratio;
        }
        if let Some(fps) = self.frame_rate {
            config.run.frame_rate = fps;
        }
        if let Some(seconds) = self.duration {
            config.run.duration = seconds;
        }

        config
    }
}

/// Headless run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Synthetic animation frames per second.
    ///
    /// Slower than 11 fps every frame gap exceeds the clock's skip bound.
    #[validate(range(min = 11, max = 1000))]
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    /// Host-time budget before the run is abandoned (s).
    #[validate(range(min = 0.001, max = 86400.0))]
    #[serde(default = "default_duration")]
    pub duration: f64,
}

const fn default_frame_rate() -> u32 {
    60
}

const fn default_duration() -> f64 {
    120.0
}

impl RunConfig {
    /// Seconds between synthetic frames.
    #[must_use]
    pub fn frame_interval(&self) -> f64 {
        1.0 / f64::from(self.frame_rate.max(1))
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            duration: default_duration(),
        }
    }
}
