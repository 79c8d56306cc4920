//! Graph builders, session exports and a recording tick scheduler

use std::path::{Path, PathBuf};

use research_replay::graph::{
    BranchAttributes, BranchMode, Entity, EntityAttributes, EntityId, HypothesisAttributes,
    PaperAttributes, Relationship, RelationshipKind, SessionGraph,
};
use research_replay::replay::{PlaybackClock, TickHandle, TickOutcome, TickScheduler};

pub fn branch(id: &str, at: Option<f64>, parent: Option<&str>) -> Entity {
    Entity::new(
        id,
        at,
        EntityAttributes::Branch(BranchAttributes {
            query: format!("query {id}"),
            mode: BranchMode::SearchSummarize,
            parent_branch_id: parent.map(EntityId::from),
            status: None,
            paper_count: None,
            summary_count: None,
            context_window_used: None,
        }),
    )
}

pub fn paper(id: &str, at: Option<f64>) -> Entity {
    Entity::new(
        id,
        at,
        EntityAttributes::Paper(PaperAttributes {
            title: Some(format!("Paper {id}")),
            year: Some(2024),
            venue: None,
            citation_count: None,
            authors: Vec::new(),
            iteration_number: None,
        }),
    )
}

pub fn hypothesis(id: &str, at: Option<f64>) -> Entity {
    Entity::new(
        id,
        at,
        EntityAttributes::Hypothesis(HypothesisAttributes {
            text: format!("Hypothesis {id}"),
            confidence: None,
            supporting_paper_ids: Vec::new(),
            iteration_number: None,
        }),
    )
}

pub fn edge(source: &str, target: &str) -> Relationship {
    Relationship::new(source, target, RelationshipKind::Membership)
}

/// A@0, B@10, C@20 with edges A→B and B→C
pub fn scenario_a() -> SessionGraph {
    SessionGraph::new(
        vec![
            paper("A", Some(0.0)),
            paper("B", Some(10.0)),
            paper("C", Some(20.0)),
        ],
        vec![edge("A", "B"), edge("B", "C")],
    )
}

pub fn ids(nodes: &[&Entity]) -> Vec<String> {
    let mut ids: Vec<String> = nodes.iter().map(|e| e.id.to_string()).collect();
    ids.sort();
    ids
}

pub fn edge_pairs(edges: &[&Relationship]) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = edges
        .iter()
        .map(|r| (r.source_id.to_string(), r.target_id.to_string()))
        .collect();
    pairs.sort();
    pairs
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCall {
    Schedule(TickHandle),
    Cancel(TickHandle),
}

/// Scheduler fake that records every call and fires ticks only when asked.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    next_id: u64,
    pending: Option<TickHandle>,
    pub calls: Vec<SchedulerCall>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    pub fn scheduled_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SchedulerCall::Schedule(_)))
            .count()
    }

    pub fn cancelled(&self) -> Vec<TickHandle> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SchedulerCall::Cancel(h) => Some(*h),
                SchedulerCall::Schedule(_) => None,
            })
            .collect()
    }

    pub fn fire(&mut self) -> Option<TickHandle> {
        self.pending.take()
    }
}

impl TickScheduler for RecordingScheduler {
    fn schedule(&mut self) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle::new(self.next_id);
        self.calls.push(SchedulerCall::Schedule(handle));
        self.pending = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.calls.push(SchedulerCall::Cancel(handle));
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

/// Fire the pending tick, if any, at wall instant `wall`
pub fn pump(clock: &mut PlaybackClock<RecordingScheduler>, wall: f64) -> Option<TickOutcome> {
    let handle = clock.scheduler_mut().fire()?;
    Some(clock.on_tick(handle, wall))
}

pub const CLOSED_SESSION: &str = r#"{
    "session": { "id": "s-42", "query": "sleep and memory", "status": "completed" },
    "branches": [
        { "branchId": "root", "query": "sleep memory consolidation", "mode": "search_summarize",
          "status": "completed", "createdAt": 1700000000000 },
        { "branchId": "deep", "query": "REM and procedural memory", "mode": "hypothesis",
          "parentBranchId": "root", "createdAt": 1700000060000 }
    ],
    "papers": [
        { "paperId": "p1", "branchId": "root", "title": "Sleep spindles", "year": 2019,
          "citationCount": 120, "createdAt": 1700000030000 },
        { "paperId": "p2", "branchId": "deep", "title": "REM replay", "year": 2021,
          "createdAt": 1700000090000 },
        { "paperId": "p3", "branchId": "deep", "title": "Undated preprint" }
    ],
    "hypotheses": [
        { "hypothesisId": "h1", "branchId": "deep", "text": "REM density predicts skill gains",
          "confidence": 0.6, "supportingPaperIds": ["p2", "ghost"], "createdAt": 1700000120000 }
    ],
    "events": [
        { "eventType": "branch_created", "branchId": "root",
          "payload": { "query": "sleep memory consolidation" }, "createdAt": 1700000000000 },
        { "eventType": "papers_found", "branchId": "root", "payload": { "count": 1 },
          "createdAt": 1700000030000 },
        { "eventType": "hypotheses_generated", "branchId": "deep", "payload": { "count": 1 },
          "createdAt": 1700000120000 }
    ]
}"#;

/// The closed session with its status flipped back to running
pub fn open_session() -> String {
    CLOSED_SESSION.replace(r#""status": "completed" },"#, r#""status": "running" },"#)
}

pub fn write_session(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, json).expect("write session fixture");
    path
}
