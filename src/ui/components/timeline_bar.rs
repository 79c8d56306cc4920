use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::graph::{format_instant, SessionStatus};
use crate::replay::{ClockState, PlaybackStatus, ViewMode};

use super::{
    ACCENT_PRIMARY, ACCENT_SUCCESS, ACCENT_WARNING, STATUS_BAR_BG, TEXT_BRIGHT, TEXT_FAINT,
    TEXT_MUTED, TEXT_SECONDARY,
};

const FILLED: &str = "━";
const EMPTY: &str = "─";
const HEAD: &str = "●";

/// Two-line playback bar: mode and clock readout, then a progress track.
pub struct TimelineBar {
    mode: ViewMode,
    session_status: SessionStatus,
    clock: ClockState,
}

impl TimelineBar {
    pub fn new(mode: ViewMode, session_status: SessionStatus, clock: ClockState) -> Self {
        Self {
            mode,
            session_status,
            clock,
        }
    }

    fn mode_badge(&self) -> Span<'static> {
        let color = match self.mode {
            ViewMode::Live => ACCENT_SUCCESS,
            ViewMode::Replay => ACCENT_PRIMARY,
        };
        Span::styled(
            format!(" {} ", self.mode.label()),
            Style::default()
                .fg(STATUS_BAR_BG)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        )
    }

    fn readout(&self) -> Line<'static> {
        let bg = Style::default().bg(STATUS_BAR_BG);
        let mut spans = vec![self.mode_badge(), Span::styled(" ", bg)];

        match self.mode {
            ViewMode::Live if !self.session_status.is_closed() => {
                spans.push(Span::styled(
                    "session open · replay available when session closes",
                    bg.fg(ACCENT_WARNING),
                ));
            }
            ViewMode::Live => {
                spans.push(Span::styled(
                    "session closed · press m to replay",
                    bg.fg(TEXT_SECONDARY),
                ));
            }
            ViewMode::Replay => {
                let status_color = match self.clock.status {
                    PlaybackStatus::Playing => ACCENT_SUCCESS,
                    PlaybackStatus::Ended => ACCENT_WARNING,
                    _ => TEXT_SECONDARY,
                };
                spans.push(Span::styled(
                    format!("{} {:<8}", self.clock.status.glyph(), self.clock.status.label()),
                    bg.fg(status_color),
                ));
                spans.push(Span::styled(
                    format_instant(self.clock.current_time),
                    bg.fg(TEXT_BRIGHT).add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::styled(
                    format!(" / {}", format_instant(self.clock.end_time())),
                    bg.fg(TEXT_MUTED),
                ));
                spans.push(Span::styled(
                    format!("   {}x", format_speed(self.clock.speed)),
                    bg.fg(ACCENT_PRIMARY),
                ));
            }
        }
        Line::from(spans)
    }

    fn track(&self, width: u16) -> Line<'static> {
        let bg = Style::default().bg(STATUS_BAR_BG);
        let percent = format!(" {:>3.0}% ", self.clock.progress() * 100.0);
        let track_width = (width as usize).saturating_sub(percent.len() + 2);
        if track_width == 0 {
            return Line::from(Span::styled(percent, bg.fg(TEXT_MUTED)));
        }

        if self.mode == ViewMode::Live {
            return Line::from(vec![
                Span::styled(" ", bg),
                Span::styled(EMPTY.repeat(track_width), bg.fg(TEXT_FAINT)),
            ]);
        }

        let head = ((self.clock.progress() * (track_width - 1) as f64).round() as usize)
            .min(track_width - 1);
        Line::from(vec![
            Span::styled(" ", bg),
            Span::styled(FILLED.repeat(head), bg.fg(ACCENT_PRIMARY)),
            Span::styled(HEAD, bg.fg(TEXT_BRIGHT)),
            Span::styled(EMPTY.repeat(track_width - 1 - head), bg.fg(TEXT_FAINT)),
            Span::styled(percent, bg.fg(TEXT_MUTED)),
        ])
    }
}

/// `1`, `0.25`, `16`: shortest form without trailing zeros
pub fn format_speed(speed: f64) -> String {
    let text = format!("{speed:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

impl Widget for TimelineBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        buf.set_style(area, Style::default().bg(STATUS_BAR_BG));
        buf.set_line(area.x, area.y, &self.readout(), area.width);
        if area.height > 1 {
            buf.set_line(area.x, area.y + 1, &self.track(area.width), area.width);
        }
    }
}
