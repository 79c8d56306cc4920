pub mod config;
pub mod graph;
pub mod replay;
pub mod ui;
pub mod util;

pub use config::Config;
pub use graph::{
    Entity, EntityId, EntityKind, EpochMillis, JsonFileSource, Relationship, RelationshipKind,
    SessionExport, SessionGraph, SessionSource, SessionStatus,
};
pub use replay::{
    reconstruct, ModeController, ModeError, PlaybackClock, PlaybackStatus, Snapshot,
    SnapshotSummary, ViewMode,
};
pub use ui::App;
