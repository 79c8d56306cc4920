//! Data models for the research graph: entities, relationships, bounds

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
///
/// Fractional so that virtual time advanced at low speeds does not truncate.
pub type EpochMillis = f64;

/// Format an epoch-millisecond instant as RFC 3339 (UTC), or `"-"` if out of range.
pub fn format_instant(ms: EpochMillis) -> String {
    if !ms.is_finite() {
        return "-".to_string();
    }
    Utc.timestamp_millis_opt(ms.round() as i64)
        .single()
        .map(|dt: DateTime<Utc>| dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Time of day (`HH:MM:SS`, UTC) of an epoch-millisecond instant, or `"-"`.
pub fn format_time_of_day(ms: EpochMillis) -> String {
    if !ms.is_finite() {
        return "-".to_string();
    }
    Utc.timestamp_millis_opt(ms.round() as i64)
        .single()
        .map(|dt: DateTime<Utc>| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Current wall-clock instant in epoch milliseconds
pub fn now_epoch_ms() -> EpochMillis {
    Utc::now().timestamp_millis() as EpochMillis
}

/// Identifier of an entity in the graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Branch,
    Paper,
    Hypothesis,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Branch,
        EntityKind::Paper,
        EntityKind::Hypothesis,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Branch => "branch",
            EntityKind::Paper => "paper",
            EntityKind::Hypothesis => "hypothesis",
        }
    }
}

/// How a branch explores its query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchMode {
    #[default]
    SearchSummarize,
    Hypothesis,
}

impl BranchMode {
    pub fn label(&self) -> &'static str {
        match self {
            BranchMode::SearchSummarize => "search",
            BranchMode::Hypothesis => "hypothesis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchAttributes {
    pub query: String,
    pub mode: BranchMode,
    pub parent_branch_id: Option<EntityId>,
    pub status: Option<String>,
    pub paper_count: Option<u32>,
    pub summary_count: Option<u32>,
    pub context_window_used: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperAttributes {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub venue: Option<String>,
    pub citation_count: Option<u32>,
    pub authors: Vec<String>,
    pub iteration_number: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisAttributes {
    pub text: String,
    pub confidence: Option<f64>,
    pub supporting_paper_ids: Vec<EntityId>,
    pub iteration_number: Option<u32>,
}

/// Kind-specific payload of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityAttributes {
    Branch(BranchAttributes),
    Paper(PaperAttributes),
    Hypothesis(HypothesisAttributes),
}

impl EntityAttributes {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityAttributes::Branch(_) => EntityKind::Branch,
            EntityAttributes::Paper(_) => EntityKind::Paper,
            EntityAttributes::Hypothesis(_) => EntityKind::Hypothesis,
        }
    }
}

/// A node in the research graph.
///
/// Immutable once created: only `created_at` matters for replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub created_at: Option<EpochMillis>,
    pub attributes: EntityAttributes,
}

impl Entity {
    pub fn new(
        id: impl Into<EntityId>,
        created_at: Option<EpochMillis>,
        attributes: EntityAttributes,
    ) -> Self {
        Self {
            id: id.into(),
            created_at,
            attributes,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.attributes.kind()
    }

    /// Whether this entity exists at `at`. Untimestamped entities exist at every instant.
    pub fn is_visible_at(&self, at: EpochMillis) -> bool {
        match self.created_at {
            Some(created) => created <= at,
            None => true,
        }
    }

    /// Short human-readable label used by the renderer
    pub fn display_label(&self) -> String {
        match &self.attributes {
            EntityAttributes::Branch(branch) => branch.query.clone(),
            EntityAttributes::Paper(paper) => match (&paper.title, paper.year) {
                (Some(title), Some(year)) => format!("{title} ({year})"),
                (Some(title), None) => title.clone(),
                (None, _) => self.id.to_string(),
            },
            EntityAttributes::Hypothesis(hypothesis) => hypothesis.text.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// Parent branch spawned a child branch
    BranchSplit,
    /// Paper was found by a branch
    Membership,
    /// Hypothesis was generated by a branch
    HypothesisLink,
    /// Paper supports a hypothesis
    Support,
}

/// A directed edge between two entities. Has no timestamp of its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub source_id: EntityId,
    pub target_id: EntityId,
    pub kind: RelationshipKind,
}

impl Relationship {
    pub fn new(
        source_id: impl Into<EntityId>,
        target_id: impl Into<EntityId>,
        kind: RelationshipKind,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            kind,
        }
    }

    /// The later of the two endpoints' creation times.
    ///
    /// `None` when either endpoint is unknown. An untimestamped endpoint does not
    /// delay the edge, so two untimestamped endpoints yield `NEG_INFINITY`.
    pub fn effective_created_at(
        &self,
        entities: &HashMap<&EntityId, &Entity>,
    ) -> Option<EpochMillis> {
        let source = entities.get(&self.source_id)?;
        let target = entities.get(&self.target_id)?;
        let source_at = source.created_at.unwrap_or(f64::NEG_INFINITY);
        let target_at = target.created_at.unwrap_or(f64::NEG_INFINITY);
        Some(source_at.max(target_at))
    }
}

/// The `[start, end]` interval spanned by entity creation times
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub start: EpochMillis,
    pub end: EpochMillis,
}

impl Bounds {
    pub fn new(start: EpochMillis, end: EpochMillis) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Zero-length bounds at `now`
    pub fn empty_at(now: EpochMillis) -> Self {
        Self {
            start: now,
            end: now,
        }
    }

    /// Min/max `created_at` over the entities that carry one; collapses to `now` if none do.
    pub fn from_entities<'a>(
        entities: impl IntoIterator<Item = &'a Entity>,
        now: EpochMillis,
    ) -> Self {
        let mut range: Option<(EpochMillis, EpochMillis)> = None;
        for created in entities.into_iter().filter_map(|e| e.created_at) {
            if !created.is_finite() {
                continue;
            }
            range = Some(match range {
                Some((lo, hi)) => (lo.min(created), hi.max(created)),
                None => (created, created),
            });
        }
        match range {
            Some((start, end)) => Self { start, end },
            None => Self::empty_at(now),
        }
    }

    pub fn duration(&self) -> EpochMillis {
        self.end - self.start
    }

    pub fn clamp(&self, at: EpochMillis) -> EpochMillis {
        if at.is_nan() {
            return self.start;
        }
        at.clamp(self.start, self.end)
    }
}

/// Whether the session behind a graph can still grow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Open,
    Closed,
}

impl SessionStatus {
    /// Map a store status string (`pending`, `running`, `completed`, `failed`).
    ///
    /// Unknown values are treated as open so replay stays disabled.
    pub fn from_store_status(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "completed" | "failed" | "closed" => SessionStatus::Closed,
            _ => SessionStatus::Open,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, SessionStatus::Closed)
    }
}

/// Immutable snapshot of a session's entities and relationships
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionGraph {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

impl SessionGraph {
    pub fn new(entities: Vec<Entity>, relationships: Vec<Relationship>) -> Self {
        Self {
            entities,
            relationships,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn bounds(&self, now: EpochMillis) -> Bounds {
        Bounds::from_entities(&self.entities, now)
    }

    pub fn untimestamped_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.created_at.is_none())
            .count()
    }

    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| &e.id == id)
    }

    pub(crate) fn by_id(&self) -> HashMap<&EntityId, &Entity> {
        self.entities.iter().map(|e| (&e.id, e)).collect()
    }
}
