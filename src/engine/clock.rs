//! Frame clock: converts host frame timestamps into integration steps.
//!
//! Supports two step policies:
//! - Wall-clock delta with skip (simple monotonic demos)
//! - Fixed timestep with accumulator (oscillatory demos)
//!
//! Both policies discard a frame whose measured delta is not positive or is
//! larger than the configured bound (a backgrounded tab, a debugger pause).
//! A discarded frame is skipped entirely, never clamped and applied, so a
//! huge step can not inject energy.

use serde::{Deserialize, Serialize};

/// Default bound on a single frame delta (s).
pub const DEFAULT_MAX_FRAME_DT: f64 = 0.1;

/// Default fixed physics step (s).
pub const DEFAULT_FIXED_STEP: f64 = 1.0 / 60.0;

/// Default cap on fixed steps drained per frame.
pub const DEFAULT_MAX_SUBSTEPS: u32 = 8;

/// Tolerance when draining the accumulator, absorbs timestamp rounding.
const DRAIN_EPSILON: f64 = 1e-9;

/// How frame deltas turn into integration steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum StepPolicy {
    /// One step per frame using the measured delta.
    SkipLargeDelta {
        /// Largest delta applied (s); larger frames are discarded.
        max_dt: f64,
    },
    /// Accumulate real time, drain in fixed increments.
    FixedAccumulator {
        /// Fixed physics step (s).
        step: f64,
        /// Largest frame delta accepted into the accumulator (s).
        max_frame: f64,
        /// Maximum steps drained per frame; leftover time is dropped.
        max_substeps: u32,
    },
}

impl StepPolicy {
    /// Wall-clock policy with the default 0.1 s skip bound.
    #[must_use]
    pub const fn wall_clock() -> Self {
        Self::SkipLargeDelta {
            max_dt: DEFAULT_MAX_FRAME_DT,
        }
    }

    /// Fixed 60 Hz accumulator with the default bounds.
    #[must_use]
    pub const fn fixed_60hz() -> Self {
        Self::FixedAccumulator {
            step: DEFAULT_FIXED_STEP,
            max_frame: DEFAULT_MAX_FRAME_DT,
            max_substeps: DEFAULT_MAX_SUBSTEPS,
        }
    }

    /// Upper bound on any `dt` handed to an integrator under this policy.
    #[must_use]
    pub const fn max_step(&self) -> f64 {
        match *self {
            Self::SkipLargeDelta { max_dt } => max_dt,
            Self::FixedAccumulator { step, .. } => step,
        }
    }
}

impl Default for StepPolicy {
    fn default() -> Self {
        Self::fixed_60hz()
    }
}

/// Integration work for one frame: `steps` steps of `dt` seconds each.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepPlan {
    /// Number of integration steps to run.
    pub steps: u32,
    /// Step size (s), strictly positive whenever `steps > 0`.
    pub dt: f64,
}

impl StepPlan {
    /// A frame that runs no integration.
    pub const SKIP: Self = Self { steps: 0, dt: 0.0 };

    /// Whether this frame runs no integration.
    #[must_use]
    pub const fn is_skip(&self) -> bool {
        self.steps == 0
    }

    /// Total simulated time covered by this plan.
    #[must_use]
    pub fn simulated(&self) -> f64 {
        f64::from(self.steps) * self.dt
    }
}

/// Frame clock for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameClock {
    /// Active step policy.
    policy: StepPolicy,
    /// Timestamp of the previous frame (s).
    last_timestamp: Option<f64>,
    /// Unsimulated real time (fixed policy only).
    accumulator: f64,
    /// Frames that produced at least one step.
    stepped_frames: u64,
    /// Frames discarded by the delta bound.
    skipped_frames: u64,
}

impl FrameClock {
    /// Create a clock with the given policy.
    #[must_use]
    pub const fn new(policy: StepPolicy) -> Self {
        Self {
            policy,
            last_timestamp: None,
            accumulator: 0.0,
            stepped_frames: 0,
            skipped_frames: 0,
        }
    }

    /// Active step policy.
    #[must_use]
    pub const fn policy(&self) -> StepPolicy {
        self.policy
    }

    /// Unsimulated real time carried to the next frame.
    #[must_use]
    pub const fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Frames that produced at least one step.
    #[must_use]
    pub const fn stepped_frames(&self) -> u64 {
        self.stepped_frames
    }

    /// Frames discarded because their delta was out of range.
    #[must_use]
    pub const fn skipped_frames(&self) -> u64 {
        self.skipped_frames
    }

    /// Forget the previous timestamp and any accumulated time.
    pub fn reset(&mut self) {
        self.last_timestamp = None;
        self.accumulator = 0.0;
        self.stepped_frames = 0;
        self.skipped_frames = 0;
    }

    /// Consume a frame timestamp (s, any monotonic origin) and plan steps.
    ///
    /// The first frame after a reset only records its timestamp. A
    /// non-finite timestamp is skipped and never becomes the reference.
    pub fn advance(&mut self, now: f64) -> StepPlan {
        if !now.is_finite() {
            self.skipped_frames += 1;
            return StepPlan::SKIP;
        }
        let Some(last) = self.last_timestamp.replace(now) else {
            return StepPlan::SKIP;
        };
        let delta = now - last;

        let plan = match self.policy {
            StepPolicy::SkipLargeDelta { max_dt } => {
                if delta > 0.0 && delta <= max_dt {
                    StepPlan {
                        steps: 1,
                        dt: delta,
                    }
                } else {
                    self.skipped_frames += 1;
                    return StepPlan::SKIP;
                }
            }
            StepPolicy::FixedAccumulator {
                step,
                max_frame,
                max_substeps,
            } => {
                if !(delta > 0.0 && delta <= max_frame) {
                    self.skipped_frames += 1;
                    return StepPlan::SKIP;
                }
                self.accumulator += delta;

                let mut steps = 0;
                while self.accumulator + DRAIN_EPSILON >= step && steps < max_substeps {
                    self.accumulator = (self.accumulator - step).max(0.0);
                    steps += 1;
                }
                if steps == max_substeps {
                    self.accumulator = 0.0;
                }
                StepPlan { steps, dt: step }
            }
        };

        if !plan.is_skip() {
            self.stepped_frames += 1;
        }
        plan
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(StepPolicy::default())
    }
}
