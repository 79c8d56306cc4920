//! Actions that can be triggered by keys
//!
//! Each action is a single, atomic operation on the replay view.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// All mappable UI actions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Quit the application
    Quit,
    /// Switch between live and replay mode
    ToggleMode,
    /// Re-read the session from its source now
    Refresh,

    // ========== Playback ==========
    /// Play if paused/stopped/ended, pause if playing
    TogglePlay,
    /// Back to the start, stopped, default speed
    Reset,
    /// Double the playback speed
    SpeedUp,
    /// Halve the playback speed
    SlowDown,
    /// Move by a signed number of seek steps
    SeekStep(i32),
    /// Jump to a fraction of the timeline
    SeekProgress(f64),
    /// Jump to the first creation instant
    SeekStart,
    /// Jump to the last creation instant
    SeekEnd,
}

impl Action {
    /// Map a key press to an action
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => Some(Action::Quit),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('m') | KeyCode::Tab => Some(Action::ToggleMode),
            KeyCode::Char('R') => Some(Action::Refresh),
            KeyCode::Char(' ') | KeyCode::Char('p') => Some(Action::TogglePlay),
            KeyCode::Char('r') => Some(Action::Reset),
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char(']') => Some(Action::SpeedUp),
            KeyCode::Char('-') | KeyCode::Char('_') | KeyCode::Char('[') => Some(Action::SlowDown),
            KeyCode::Left | KeyCode::Char('h') => Some(Action::SeekStep(-1)),
            KeyCode::Right | KeyCode::Char('l') => Some(Action::SeekStep(1)),
            KeyCode::Home | KeyCode::Char('g') => Some(Action::SeekStart),
            KeyCode::End | KeyCode::Char('G') => Some(Action::SeekEnd),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let digit = c.to_digit(10).unwrap_or(0);
                Some(Action::SeekProgress(f64::from(digit) / 10.0))
            }
            _ => None,
        }
    }

    /// Whether the action drives the playback clock (ignored in live mode)
    pub fn is_playback(&self) -> bool {
        !matches!(self, Action::Quit | Action::ToggleMode | Action::Refresh)
    }
}
