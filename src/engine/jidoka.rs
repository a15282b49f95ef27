//! Jidoka (自働化) - Autonomous anomaly detection.
//!
//! The guard runs after every integration step. A state that has gone
//! non-finite (only reachable through a pathological parameter choice) is
//! reported as `SimError::NonFiniteValue`; the simulation loop reacts by
//! stopping the line instead of handing garbage to the presenter.
//!
//! The check has no off switch.

use crate::engine::state::{Coord, PhaseState};
use crate::error::{SimError, SimResult};

/// Jidoka guard for autonomous anomaly detection.
///
/// # Example
///
/// ```rust
/// use physdemo::engine::jidoka::JidokaGuard;
/// use physdemo::demos::spring::SpringState;
///
/// let mut guard = JidokaGuard::new();
/// let state = SpringState::at_rest();
///
/// assert!(guard.check(&state).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct JidokaGuard {
    /// Number of inspections performed since the last reset.
    inspections: u64,
}

impl JidokaGuard {
    /// Create a new Jidoka guard.
    #[must_use]
    pub const fn new() -> Self {
        Self { inspections: 0 }
    }

    /// Inspect a state for anomalies.
    ///
    /// # Errors
    ///
    /// Returns `SimError::NonFiniteValue` naming the first non-finite
    /// component (`position`, `velocity` or `time`).
    pub fn check<S: PhaseState>(&mut self, state: &S) -> SimResult<()> {
        self.inspections += 1;

        if !state.position().is_finite() {
            return Err(SimError::non_finite("state.position"));
        }
        if !state.velocity().is_finite() {
            return Err(SimError::non_finite("state.velocity"));
        }
        if !state.time().is_finite() {
            return Err(SimError::non_finite("state.time"));
        }

        Ok(())
    }

    /// Reset inspection statistics for a new run.
    pub fn reset(&mut self) {
        self.inspections = 0;
    }

    /// Inspections performed since the last reset.
    #[must_use]
    pub const fn inspections(&self) -> u64 {
        self.inspections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::drop::DropState;

    fn state(height: f64, velocity: f64) -> DropState {
        DropState {
            height,
            velocity,
            time: 0.0,
            bounces: 0,
        }
    }

    #[test]
    fn test_finite_state_passes() {
        let mut guard = JidokaGuard::default();
        assert!(guard.check(&state(1.0, -2.0)).is_ok());
        assert_eq!(guard.inspections(), 1);
    }

    #[test]
    fn test_nan_position_detected() {
        let mut guard = JidokaGuard::default();
        let err = guard.check(&state(f64::NAN, 0.0)).unwrap_err();
        assert!(err.is_jidoka_violation());
        assert!(err.to_string().contains("state.position"));
    }

    #[test]
    fn test_infinite_velocity_detected() {
        let mut guard = JidokaGuard::default();
        let err = guard.check(&state(0.0, f64::NEG_INFINITY)).unwrap_err();
        assert!(err.to_string().contains("state.velocity"));
    }

    #[test]
    fn test_every_inspection_checks_finiteness() {
        let mut guard = JidokaGuard::new();
        for _ in 0..100 {
            assert!(guard.check(&state(1.0, 0.0)).is_ok());
        }
        assert!(guard.check(&state(f64::INFINITY, 0.0)).is_err());
        assert_eq!(guard.inspections(), 101);
    }

    #[test]
    fn test_reset_clears_inspections() {
        let mut guard = JidokaGuard::default();
        let _ = guard.check(&state(1.0, 0.0));
        guard.reset();
        assert_eq!(guard.inspections(), 0);
    }
}
