//! Platform abstraction layer
//!
//! Handles the host-facing pieces the simulation must not touch directly:
//! - Time (monotonic session clock, virtual clock for tests)
//! - Tracking source status and start-up failures

use std::cell::Cell;
use std::time::Instant;

use thiserror::Error;

use crate::sim::Millis;

/// Source of session time in milliseconds
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Wall clock measured from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        self.start.elapsed().as_millis() as Millis
    }
}

/// Manually advanced clock
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Cell<Millis>,
}

impl VirtualClock {
    pub fn new(start: Millis) -> Self {
        Self { now: Cell::new(start) }
    }

    pub fn advance(&self, ms: Millis) -> Millis {
        let t = self.now.get() + ms;
        self.now.set(t);
        t
    }

    pub fn set(&self, ms: Millis) {
        self.now.set(ms);
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

/// Why the tracking pipeline could not start
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    #[error("camera access was denied")]
    PermissionDenied,
    #[error("no camera device found")]
    NoDevice,
    #[error("hand tracker failed to start: {0}")]
    Tracker(String),
}

/// Lifecycle of the tracking source as seen by the session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrackingStatus {
    /// Waiting for the first result
    #[default]
    Starting,
    /// At least one result has arrived
    Running,
    /// Terminal for this session
    Failed(TrackingError),
}
