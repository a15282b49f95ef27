//! Physics domain: integration rules and shared force helpers.

pub mod physics;

pub use physics::{drag_force, sign, IntegratorType};
