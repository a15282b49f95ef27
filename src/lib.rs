//! # physdemo
//!
//! Educational physics demo suite: six single-phenomenon simulations on one
//! generic simulation loop and one integrator abstraction.
//!
//! Each demo plugs a force model, an integration rule, a step policy and a
//! termination policy into [`engine::SimulationLoop`]:
//! - Free fall & bounce, spring-mass oscillator, two-body gravitation
//! - Nonlinear pendulum, friction slide, closed-form projectile
//!
//! Following the Toyota Production System the loop stops the line (Jidoka)
//! when a state goes non-finite, and inputs are clamped or validated at the
//! boundary (Poka-Yoke).
//!
//! ## Example
//!
//! ```rust
//! use physdemo::prelude::*;
//!
//! let mut sim = SimulationLoop::new(DropDemo, DropParams::default());
//! let _ = sim.start();
//!
//! let reason = sim.drive(1.0 / 60.0, 30.0);
//! assert_eq!(reason, Some(StopReason::AtRest));
//! assert!(sim.state().velocity.abs() < f64::EPSILON);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,  // Formulas are written as in the textbook
    clippy::imprecise_flops,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
)]

pub mod cli;
pub mod config;
pub mod demos;
pub mod domains;
pub mod engine;
pub mod error;
pub mod units;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{SuiteConfig, SuiteConfigBuilder};
    pub use crate::demos::{
        simulation_for, AnySimulation, Demo, DemoKind, DemoParams, DropDemo, DropParams,
        FrictionDemo, FrictionParams, GravityPairDemo, GravityPairParams, Metric, PendulumDemo,
        PendulumParams, ProjectileDemo, ProjectileParams, SpringDemo, SpringParams,
    };
    pub use crate::domains::physics::IntegratorType;
    pub use crate::engine::jidoka::JidokaGuard;
    pub use crate::engine::{
        DynSimulation, Lifecycle, SimulationLoop, StepPolicy, StopReason, TickHandle, TickOutcome,
    };
    pub use crate::error::{SimError, SimResult};
    pub use crate::units::PixelScale;
}

/// Re-export for public API
pub use error::{SimError, SimResult};
