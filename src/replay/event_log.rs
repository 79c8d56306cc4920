//! Session event stream filtered to a virtual instant.

use crate::graph::{EpochMillis, SessionEvent};

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    /// Untimestamped events first, then ascending by time (stable for ties)
    events: Vec<SessionEvent>,
    untimestamped: usize,
}

impl EventLog {
    pub fn new(mut events: Vec<SessionEvent>) -> Self {
        events.sort_by(|a, b| {
            let a = a.created_at.unwrap_or(f64::NEG_INFINITY);
            let b = b.created_at.unwrap_or(f64::NEG_INFINITY);
            a.total_cmp(&b)
        });
        let untimestamped = events.iter().filter(|e| e.created_at.is_none()).count();
        Self {
            events,
            untimestamped,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events, in display order
    pub fn all(&self) -> &[SessionEvent] {
        &self.events
    }

    /// Number of events visible at `at` (`None` = everything)
    pub fn visible_count(&self, at: Option<EpochMillis>) -> usize {
        match at {
            None => self.events.len(),
            Some(t) => {
                self.untimestamped
                    + self.events[self.untimestamped..]
                        .partition_point(|e| e.created_at.is_some_and(|c| c <= t))
            }
        }
    }

    pub fn visible(&self, at: Option<EpochMillis>) -> &[SessionEvent] {
        &self.events[..self.visible_count(at)]
    }

    /// The event to highlight: the last one visible at `at`
    pub fn latest_visible(&self, at: Option<EpochMillis>) -> Option<&SessionEvent> {
        self.visible(at).last()
    }
}
