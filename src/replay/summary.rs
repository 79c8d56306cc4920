//! Headless snapshot report, for scripting and the `--snapshot-at` flag.

use serde::Serialize;

use crate::graph::{
    format_instant, EntityId, EpochMillis, Relationship, SessionGraph, SessionStatus,
};

use super::clock::{ClockState, SpeedRange};
use super::index::TimelineIndex;
use super::reconstruct::KindStats;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub session_status: SessionStatus,
    pub progress: f64,
    pub at: EpochMillis,
    pub at_utc: String,
    pub start: EpochMillis,
    pub end: EpochMillis,
    pub stats: KindStats,
    pub edge_count: usize,
    pub untimestamped: usize,
    pub newest: Option<EntityId>,
    pub nodes: Vec<EntityId>,
    pub edges: Vec<Relationship>,
}

impl SnapshotSummary {
    /// Reconstruct the graph at a fraction of its timeline.
    ///
    /// The instant is chosen exactly as a replay seek to `progress` would choose it.
    pub fn at_progress(
        graph: &SessionGraph,
        status: SessionStatus,
        progress: f64,
        now: EpochMillis,
    ) -> Self {
        let clock = ClockState::new(graph.bounds(now), SpeedRange::default())
            .seek_to_progress(progress);
        let at = clock.current_time;
        let index = TimelineIndex::new(graph);
        let snapshot = index.reconstruct(Some(at));

        Self {
            session_status: status,
            progress: clock.progress(),
            at,
            at_utc: format_instant(at),
            start: clock.start_time(),
            end: clock.end_time(),
            stats: snapshot.stats,
            edge_count: snapshot.edge_count(),
            untimestamped: graph.untimestamped_count(),
            newest: index.latest_visible(at).map(|e| e.id.clone()),
            nodes: snapshot.nodes.iter().map(|e| e.id.clone()).collect(),
            edges: snapshot.edges.iter().map(|r| (*r).clone()).collect(),
        }
    }
}
