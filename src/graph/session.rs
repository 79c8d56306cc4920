//! Session exports from the hosted store
//!
//! The store keeps one table per entity kind plus an event stream. A session export
//! is the JSON dump of those tables for one session; relationships are not stored
//! and are derived here from the foreign keys each record carries.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::{
    BranchAttributes, BranchMode, Entity, EntityAttributes, EntityId, EpochMillis,
    HypothesisAttributes, PaperAttributes, Relationship, RelationshipKind, SessionGraph,
    SessionStatus,
};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read session export {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse session export {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRecord {
    pub branch_id: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub mode: BranchMode,
    #[serde(default)]
    pub parent_branch_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub paper_count: Option<u32>,
    #[serde(default)]
    pub summary_count: Option<u32>,
    #[serde(default)]
    pub context_window_used: Option<u64>,
    #[serde(default, alias = "_creationTime")]
    pub created_at: Option<EpochMillis>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRecord {
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRecord {
    pub paper_id: String,
    pub branch_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub citation_count: Option<u32>,
    #[serde(default)]
    pub authors: Vec<AuthorRecord>,
    #[serde(default)]
    pub iteration_number: Option<u32>,
    #[serde(default, alias = "_creationTime")]
    pub created_at: Option<EpochMillis>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HypothesisRecord {
    pub hypothesis_id: String,
    pub branch_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub supporting_paper_ids: Vec<String>,
    #[serde(default)]
    pub iteration_number: Option<u32>,
    #[serde(default, alias = "_creationTime")]
    pub created_at: Option<EpochMillis>,
}

/// One entry of the session's realtime event stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    pub event_type: String,
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default, alias = "_creationTime")]
    pub created_at: Option<EpochMillis>,
}

impl SessionEvent {
    /// One-line description of the event for the log view
    pub fn summary(&self) -> String {
        let payload = &self.payload;
        let text = |key: &str| payload.get(key).and_then(|v| v.as_str());
        let count = |key: &str| payload.get(key).and_then(|v| v.as_u64());

        match self.event_type.as_str() {
            "branch_created" => match text("query") {
                Some(query) => format!("branch created: {query}"),
                None => "branch created".to_string(),
            },
            "branch_status_changed" => match text("status") {
                Some(status) => format!("branch → {status}"),
                None => "branch status changed".to_string(),
            },
            "papers_found" => format!("{} papers found", count("count").unwrap_or(0)),
            "summaries_validated" => {
                format!("{} summaries validated", count("count").unwrap_or(0))
            }
            "summary_validated" => match text("paperTitle") {
                Some(title) => format!("summary validated: {title}"),
                None => "summary validated".to_string(),
            },
            "hypotheses_generated" => {
                format!("{} hypotheses generated", count("count").unwrap_or(0))
            }
            "hypothesis_generated" => "hypothesis generated".to_string(),
            "iteration_completed" => match count("iterationNumber") {
                Some(n) => format!("iteration {n} completed"),
                None => "iteration completed".to_string(),
            },
            other => other.replace('_', " "),
        }
    }
}

/// JSON dump of one session from the store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    #[serde(default)]
    pub session: SessionRecord,
    #[serde(default)]
    pub branches: Vec<BranchRecord>,
    #[serde(default)]
    pub papers: Vec<PaperRecord>,
    #[serde(default)]
    pub hypotheses: Vec<HypothesisRecord>,
    #[serde(default)]
    pub events: Vec<SessionEvent>,
}

impl SessionExport {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn status(&self) -> SessionStatus {
        self.session
            .status
            .as_deref()
            .map(SessionStatus::from_store_status)
            .unwrap_or_default()
    }

    /// Build the entity graph and derive its relationships.
    ///
    /// A paper found by several branches becomes one entity carrying the earliest
    /// creation time, with a membership edge from every branch that found it.
    pub fn into_graph(self) -> SessionGraph {
        let mut entities = Vec::with_capacity(
            self.branches.len() + self.papers.len() + self.hypotheses.len(),
        );
        let mut relationships = Vec::new();

        for branch in self.branches {
            let id = EntityId::new(branch.branch_id);
            let parent = branch.parent_branch_id.map(EntityId::new);
            if let Some(parent) = &parent {
                relationships.push(Relationship::new(
                    parent.clone(),
                    id.clone(),
                    RelationshipKind::BranchSplit,
                ));
            }
            entities.push(Entity::new(
                id,
                branch.created_at,
                EntityAttributes::Branch(BranchAttributes {
                    query: branch.query,
                    mode: branch.mode,
                    parent_branch_id: parent,
                    status: branch.status,
                    paper_count: branch.paper_count,
                    summary_count: branch.summary_count,
                    context_window_used: branch.context_window_used,
                }),
            ));
        }

        let mut paper_slots: HashMap<String, usize> = HashMap::new();
        for paper in self.papers {
            relationships.push(Relationship::new(
                paper.branch_id.as_str(),
                paper.paper_id.as_str(),
                RelationshipKind::Membership,
            ));

            if let Some(&slot) = paper_slots.get(&paper.paper_id) {
                let existing: &mut Entity = &mut entities[slot];
                existing.created_at = earliest(existing.created_at, paper.created_at);
                continue;
            }

            paper_slots.insert(paper.paper_id.clone(), entities.len());
            entities.push(Entity::new(
                paper.paper_id,
                paper.created_at,
                EntityAttributes::Paper(PaperAttributes {
                    title: paper.title,
                    year: paper.year,
                    venue: paper.venue,
                    citation_count: paper.citation_count,
                    authors: paper.authors.into_iter().filter_map(|a| a.name).collect(),
                    iteration_number: paper.iteration_number,
                }),
            ));
        }

        for hypothesis in self.hypotheses {
            let id = EntityId::new(hypothesis.hypothesis_id);
            relationships.push(Relationship::new(
                hypothesis.branch_id.as_str(),
                id.clone(),
                RelationshipKind::HypothesisLink,
            ));
            let supporting: Vec<EntityId> = hypothesis
                .supporting_paper_ids
                .into_iter()
                .map(EntityId::new)
                .collect();
            for paper_id in &supporting {
                relationships.push(Relationship::new(
                    id.clone(),
                    paper_id.clone(),
                    RelationshipKind::Support,
                ));
            }
            entities.push(Entity::new(
                id,
                hypothesis.created_at,
                EntityAttributes::Hypothesis(HypothesisAttributes {
                    text: hypothesis.text,
                    confidence: hypothesis.confidence,
                    supporting_paper_ids: supporting,
                    iteration_number: hypothesis.iteration_number,
                }),
            ));
        }

        relationships.sort_by(|a, b| {
            let lhs = (&a.source_id, &a.target_id, a.kind as u8);
            let rhs = (&b.source_id, &b.target_id, b.kind as u8);
            lhs.cmp(&rhs)
        });
        relationships.dedup();

        SessionGraph::new(entities, relationships)
    }
}

fn earliest(a: Option<EpochMillis>, b: Option<EpochMillis>) -> Option<EpochMillis> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}

/// Query returning the full current entity/relationship set of a session
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Human-readable location, for logs and the header
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<SessionExport, SourceError>;
}

/// Reads a session export from a JSON file on every fetch
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<SessionExport, SourceError> {
        let contents =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| SourceError::Io {
                    path: self.path.clone(),
                    source,
                })?;
        let export = SessionExport::from_json(&contents).map_err(|source| SourceError::Parse {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(
            path = %self.path.display(),
            branches = export.branches.len(),
            papers = export.papers.len(),
            hypotheses = export.hypotheses.len(),
            events = export.events.len(),
            "Fetched session export"
        );
        Ok(export)
    }
}
