//! Animation-frame scheduling with positive cancellation.
//!
//! The host event loop (a browser `requestAnimationFrame`, a terminal
//! redraw timer, a headless driver) calls back once per display refresh.
//! Each callback carries the `TickHandle` it was scheduled with. The
//! scheduler owns:
//! - an epoch, bumped whenever a run is cancelled or replaced
//! - a monotonic sequence number per scheduled frame
//! - the single pending handle
//!
//! A handle is accepted exactly once, and only while it is the pending one
//! of the current epoch. Frames left over from a stopped or restarted run
//! are rejected, so they can never mutate the state of a newer run.

use serde::{Deserialize, Serialize};

/// Token identifying one scheduled animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickHandle {
    /// Run generation the frame belongs to.
    epoch: u64,
    /// Frame sequence number within the scheduler.
    sequence: u64,
}

impl TickHandle {
    /// Run generation this handle belongs to.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Frame sequence number.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Owner of the pending frame for one simulation loop instance.
///
/// # Example
///
/// ```rust
/// use physdemo::engine::scheduler::FrameScheduler;
///
/// let mut scheduler = FrameScheduler::new();
/// let stale = scheduler.schedule();
/// scheduler.cancel();
///
/// let fresh = scheduler.schedule();
/// assert!(!scheduler.accept(stale));
/// assert!(scheduler.accept(fresh));
/// ```
#[derive(Debug, Default)]
pub struct FrameScheduler {
    /// Current run generation.
    epoch: u64,
    /// Monotonic frame counter.
    sequence: u64,
    /// The single frame the host is expected to deliver next.
    pending: Option<TickHandle>,
}

impl FrameScheduler {
    /// Create a new scheduler with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the next frame, replacing any pending one.
    pub fn schedule(&mut self) -> TickHandle {
        self.sequence += 1;
        let handle = TickHandle {
            epoch: self.epoch,
            sequence: self.sequence,
        };
        self.pending = Some(handle);
        handle
    }

    /// Cancel the pending frame and invalidate every handle issued so far.
    pub fn cancel(&mut self) {
        self.epoch += 1;
        self.pending = None;
    }

    /// Consume a delivered frame.
    ///
    /// Returns `true` only for the pending handle of the current epoch; the
    /// pending slot is cleared so the same handle cannot be replayed.
    pub fn accept(&mut self, handle: TickHandle) -> bool {
        if self.pending == Some(handle) && handle.epoch == self.epoch {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Frame currently awaiting delivery.
    #[must_use]
    pub const fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    /// Current run generation.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }
}
