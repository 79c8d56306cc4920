//! Snapshot reconstruction: which entities and relationships existed at an instant.

use std::collections::HashSet;

use serde::Serialize;

use crate::graph::{Entity, EntityId, EntityKind, EpochMillis, Relationship, SessionGraph};

/// Node counts per entity kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindStats {
    pub branches: usize,
    pub papers: usize,
    pub hypotheses: usize,
}

impl KindStats {
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Branch => self.branches,
            EntityKind::Paper => self.papers,
            EntityKind::Hypothesis => self.hypotheses,
        }
    }

    pub fn total(&self) -> usize {
        self.branches + self.papers + self.hypotheses
    }

    fn record(mut self, kind: EntityKind) -> Self {
        match kind {
            EntityKind::Branch => self.branches += 1,
            EntityKind::Paper => self.papers += 1,
            EntityKind::Hypothesis => self.hypotheses += 1,
        }
        self
    }

    pub(crate) fn from_nodes<'a>(nodes: impl IntoIterator<Item = &'a Entity>) -> Self {
        nodes
            .into_iter()
            .fold(KindStats::default(), |stats, e| stats.record(e.kind()))
    }
}

/// The graph as visible at one virtual instant.
///
/// Borrows from the graph it was reconstructed from; nodes and edges keep input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot<'a> {
    /// The instant reconstructed, `None` for the unbounded live view
    pub at: Option<EpochMillis>,
    pub nodes: Vec<&'a Entity>,
    pub edges: Vec<&'a Relationship>,
    pub stats: KindStats,
}

impl<'a> Snapshot<'a> {
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Most recently created visible node; ties go to the later entry in input order
    pub fn newest(&self) -> Option<&'a Entity> {
        self.nodes
            .iter()
            .copied()
            .filter(|e| e.created_at.is_some())
            .fold(None, |best: Option<&'a Entity>, e| match best {
                Some(b) if b.created_at > e.created_at => Some(b),
                _ => Some(e),
            })
    }
}

/// Reconstruct the visible graph at `at` (`None` = show everything).
pub fn reconstruct(graph: &SessionGraph, at: Option<EpochMillis>) -> Snapshot<'_> {
    reconstruct_at(&graph.entities, &graph.relationships, at)
}

/// Filter `entities` to those created at or before `at` (or untimestamped), and
/// `relationships` to those whose endpoints are both visible.
///
/// Relationships naming an id that is not in `entities` at all are dropped.
pub fn reconstruct_at<'a>(
    entities: &'a [Entity],
    relationships: &'a [Relationship],
    at: Option<EpochMillis>,
) -> Snapshot<'a> {
    let nodes: Vec<&Entity> = match at {
        Some(t) => entities.iter().filter(|e| e.is_visible_at(t)).collect(),
        None => entities.iter().collect(),
    };
    finish(at, nodes, relationships)
}

pub(crate) fn finish<'a>(
    at: Option<EpochMillis>,
    nodes: Vec<&'a Entity>,
    relationships: &'a [Relationship],
) -> Snapshot<'a> {
    let visible: HashSet<&EntityId> = nodes.iter().map(|e| &e.id).collect();
    let edges = relationships
        .iter()
        .filter(|r| visible.contains(&r.source_id) && visible.contains(&r.target_id))
        .collect();
    let stats = KindStats::from_nodes(nodes.iter().copied());

    Snapshot {
        at,
        nodes,
        edges,
        stats,
    }
}
