//! Creation-time index for reconstructing snapshots at high call rates.
//!
//! The linear scan in [`reconstruct`](super::reconstruct) is fine for a single
//! session. This index sorts entities by `created_at` once, then finds the cutoff
//! for each instant with a binary search. Output is the same visible set.

use std::cmp::Ordering;

use crate::graph::{Entity, EpochMillis, SessionGraph};

use super::reconstruct::{finish, Snapshot};

#[derive(Debug, Clone)]
pub struct TimelineIndex<'a> {
    graph: &'a SessionGraph,
    /// Timestamped entities, ascending by creation time (stable for ties)
    ordered: Vec<&'a Entity>,
    /// Entities without a timestamp; visible at every instant
    untimestamped: Vec<&'a Entity>,
}

impl<'a> TimelineIndex<'a> {
    pub fn new(graph: &'a SessionGraph) -> Self {
        let (mut ordered, untimestamped): (Vec<&Entity>, Vec<&Entity>) = graph
            .entities
            .iter()
            .partition(|e| e.created_at.is_some());
        ordered.sort_by(|a, b| compare_created(a, b));

        Self {
            graph,
            ordered,
            untimestamped,
        }
    }

    /// Number of timestamped entities created at or before `at`
    pub fn cutoff(&self, at: EpochMillis) -> usize {
        self.ordered
            .partition_point(|e| e.created_at.is_some_and(|created| created <= at))
    }

    /// Same visible set as the linear scan; nodes are ordered untimestamped first,
    /// then by creation time.
    pub fn reconstruct(&self, at: Option<EpochMillis>) -> Snapshot<'a> {
        let visible = match at {
            Some(t) => &self.ordered[..self.cutoff(t)],
            None => &self.ordered[..],
        };
        let nodes: Vec<&'a Entity> = self
            .untimestamped
            .iter()
            .chain(visible.iter())
            .copied()
            .collect();
        finish(at, nodes, &self.graph.relationships)
    }

    /// The most recently created entity visible at `at`
    pub fn latest_visible(&self, at: EpochMillis) -> Option<&'a Entity> {
        let cut = self.cutoff(at);
        cut.checked_sub(1).map(|i| self.ordered[i])
    }
}

fn compare_created(a: &Entity, b: &Entity) -> Ordering {
    let a = a.created_at.unwrap_or(f64::NEG_INFINITY);
    let b = b.created_at.unwrap_or(f64::NEG_INFINITY);
    a.total_cmp(&b)
}
