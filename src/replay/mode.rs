//! Live vs replay mode: which instant the graph is reconstructed at.

use thiserror::Error;

use crate::graph::{EpochMillis, SessionGraph, SessionStatus};

use super::clock::{PlaybackClock, SpeedRange};
use super::reconstruct::{reconstruct, Snapshot};
use super::scheduler::TickScheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Everything currently in the store is visible
    #[default]
    Live,
    /// Visible instant follows the playback clock
    Replay,
}

impl ViewMode {
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Live => "LIVE",
            ViewMode::Replay => "REPLAY",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModeError {
    /// Bounds are not stable until the session closes
    #[error("Replay is unavailable while the session is still open")]
    SessionOpen,
}

/// Composes the latest graph snapshot with the playback clock.
pub struct ModeController<S: TickScheduler> {
    graph: SessionGraph,
    status: SessionStatus,
    mode: ViewMode,
    clock: PlaybackClock<S>,
    warn_missing_timestamps: bool,
    warned_untimestamped: usize,
}

impl<S: TickScheduler> ModeController<S> {
    pub fn new(
        graph: SessionGraph,
        status: SessionStatus,
        speed_range: SpeedRange,
        scheduler: S,
        now: EpochMillis,
    ) -> Self {
        let clock = PlaybackClock::new(graph.bounds(now), speed_range, scheduler);
        Self {
            graph,
            status,
            mode: ViewMode::Live,
            clock,
            warn_missing_timestamps: true,
            warned_untimestamped: 0,
        }
    }

    /// Enable or disable the missing-timestamp warning, checking the initial graph.
    pub fn with_missing_timestamp_warnings(mut self, enabled: bool) -> Self {
        self.warn_missing_timestamps = enabled;
        self.check_timestamps();
        self
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn is_replay(&self) -> bool {
        self.mode == ViewMode::Replay
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn graph(&self) -> &SessionGraph {
        &self.graph
    }

    /// Replay is only offered once the entity set has stopped growing
    pub fn can_replay(&self) -> bool {
        self.status.is_closed()
    }

    pub fn clock(&self) -> &PlaybackClock<S> {
        &self.clock
    }

    /// Clock controls; `None` in live mode, where the clock is inert
    pub fn replay_clock_mut(&mut self) -> Option<&mut PlaybackClock<S>> {
        match self.mode {
            ViewMode::Replay => Some(&mut self.clock),
            ViewMode::Live => None,
        }
    }

    /// Direct clock access for the host (tick delivery, subscriptions)
    pub fn clock_mut(&mut self) -> &mut PlaybackClock<S> {
        &mut self.clock
    }

    /// Replace the snapshot with a fresh fetch from the store.
    ///
    /// A session that reports open again drops replay back to live mode.
    pub fn refresh(&mut self, graph: SessionGraph, status: SessionStatus, now: EpochMillis) {
        self.graph = graph;
        self.status = status;
        self.check_timestamps();

        if self.mode == ViewMode::Replay {
            if self.status.is_closed() {
                let bounds = self.graph.bounds(now);
                if bounds != self.clock.state().bounds {
                    self.clock.set_bounds(bounds);
                }
            } else {
                tracing::warn!("Session reopened during replay; returning to live view");
                self.exit_replay();
            }
        }
    }

    /// Switch to replay, starting from the first creation instant.
    pub fn enter_replay(&mut self, now: EpochMillis) -> Result<(), ModeError> {
        if !self.can_replay() {
            return Err(ModeError::SessionOpen);
        }
        self.clock.set_bounds(self.graph.bounds(now));
        self.clock.reset();
        self.mode = ViewMode::Replay;
        tracing::info!(
            start = self.clock.start_time(),
            end = self.clock.end_time(),
            entities = self.graph.entities.len(),
            "Entered replay mode"
        );
        Ok(())
    }

    pub fn exit_replay(&mut self) {
        self.clock.reset();
        if self.mode != ViewMode::Live {
            self.mode = ViewMode::Live;
            tracing::info!("Returned to live mode");
        }
    }

    pub fn toggle_mode(&mut self, now: EpochMillis) -> Result<ViewMode, ModeError> {
        match self.mode {
            ViewMode::Live => self.enter_replay(now)?,
            ViewMode::Replay => self.exit_replay(),
        }
        Ok(self.mode)
    }

    /// The instant the graph is shown at; `None` means unbounded (live)
    pub fn visible_instant(&self) -> Option<EpochMillis> {
        match self.mode {
            ViewMode::Live => None,
            ViewMode::Replay => Some(self.clock.current_time()),
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        reconstruct(&self.graph, self.visible_instant())
    }

    fn check_timestamps(&mut self) {
        let missing = self.graph.untimestamped_count();
        if missing == 0 || missing == self.warned_untimestamped {
            return;
        }
        self.warned_untimestamped = missing;
        if self.warn_missing_timestamps {
            tracing::warn!(
                missing,
                total = self.graph.entities.len(),
                "Entities without createdAt are visible at every replay instant"
            );
        }
    }
}
