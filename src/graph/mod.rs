//! The research graph: entities, relationships, and where they come from

pub mod models;
pub mod session;

pub use models::{
    format_instant, format_time_of_day, now_epoch_ms, BranchAttributes, BranchMode, Bounds,
    Entity, EntityAttributes, EntityId, EntityKind, EpochMillis, HypothesisAttributes,
    PaperAttributes, Relationship, RelationshipKind, SessionGraph, SessionStatus,
};
pub use session::{JsonFileSource, SessionEvent, SessionExport, SessionSource, SourceError};
