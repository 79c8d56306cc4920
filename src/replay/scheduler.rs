//! Tick scheduling seam between the playback clock and its host.
//!
//! The clock never runs a timer of its own. It asks the host for "one more tick"
//! through [`TickScheduler::schedule`] and withdraws that request with
//! [`TickScheduler::cancel`]. The host later delivers the tick back to the clock
//! together with the wall-clock instant it fired at.

use std::time::Instant;

use crate::graph::EpochMillis;

/// Identifies one scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

pub trait TickScheduler {
    /// Request a single future tick
    fn schedule(&mut self) -> TickHandle;

    /// Withdraw a previously scheduled tick; unknown or already fired handles are ignored
    fn cancel(&mut self, handle: TickHandle);
}

/// Frame-driven scheduler: at most one tick pending, fired by the host's render loop.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    pending: Option<TickHandle>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    /// Take the pending tick, if any, for the host to deliver this frame
    pub fn take_due(&mut self) -> Option<TickHandle> {
        self.pending.take()
    }
}

impl TickScheduler for FrameScheduler {
    fn schedule(&mut self) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

/// Monotonic wall clock in milliseconds, measured from its own creation
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> EpochMillis {
        self.origin.elapsed().as_secs_f64() * 1_000.0
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}
