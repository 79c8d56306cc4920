use crate::graph::{EpochMillis, SessionExport};

/// Application-level events
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Terminal input event
    Input(crossterm::event::Event),

    /// The playback clock's virtual instant changed
    TimeUpdated(EpochMillis),

    /// A session fetch completed
    SessionFetched { result: Result<SessionExport, String> },

    /// Request to quit the application
    Quit,
}
