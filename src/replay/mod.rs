//! Temporal replay engine.
//!
//! - [`reconstruct`] filters a session graph down to what existed at an instant.
//! - [`PlaybackClock`] advances that instant on host-delivered ticks.
//! - [`ModeController`] picks between the live view and the clock's instant.

pub mod clock;
pub mod event_log;
pub mod index;
pub mod mode;
pub mod reconstruct;
pub mod scheduler;
pub mod summary;

pub use clock::{
    ClockState, PlaybackClock, PlaybackStatus, SpeedRange, SubscriptionId, TickOutcome,
};
pub use event_log::EventLog;
pub use index::TimelineIndex;
pub use mode::{ModeController, ModeError, ViewMode};
pub use reconstruct::{reconstruct, reconstruct_at, KindStats, Snapshot};
pub use scheduler::{FrameScheduler, MonotonicClock, TickHandle, TickScheduler};
pub use summary::SnapshotSummary;
