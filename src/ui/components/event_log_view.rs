use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::graph::{format_time_of_day, EpochMillis};
use crate::replay::EventLog;

use super::graph_view::truncate_to_width;
use super::scrollbar::render_vertical_scrollbar;
use super::{BORDER_DEFAULT, SELECTED_BG, TEXT_BRIGHT, TEXT_FAINT, TEXT_MUTED, TEXT_PRIMARY};

/// Session event stream; events after the visible instant are dimmed and the
/// latest visible one is highlighted.
pub struct EventLogView<'a> {
    log: &'a EventLog,
    at: Option<EpochMillis>,
}

impl<'a> EventLogView<'a> {
    pub fn new(log: &'a EventLog, at: Option<EpochMillis>) -> Self {
        Self { log, at }
    }

    /// First row to draw so that `highlight` stays on screen
    fn scroll_offset(total: usize, visible: usize, highlight: Option<usize>) -> usize {
        match highlight {
            // Keep a little context below the highlight when possible
            Some(idx) => (idx + 3)
                .min(total)
                .saturating_sub(visible)
                .min(total.saturating_sub(visible)),
            None => 0,
        }
    }
}

impl Widget for EventLogView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible_count = self.log.visible_count(self.at);
        let title = format!(" Events {}/{} ", visible_count, self.log.len());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER_DEFAULT))
            .title(Span::styled(title, Style::default().fg(TEXT_MUTED)));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 || inner.width < 4 {
            return;
        }

        let events = self.log.all();
        if events.is_empty() {
            let empty = Line::from(Span::styled("No events", Style::default().fg(TEXT_FAINT)));
            buf.set_line(inner.x + 1, inner.y, &empty, inner.width.saturating_sub(1));
            return;
        }

        let highlight = visible_count.checked_sub(1);
        let rows = inner.height as usize;
        let offset = Self::scroll_offset(events.len(), rows, highlight);
        // Leave a column for the scrollbar
        let text_width = inner.width.saturating_sub(1) as usize;

        for (i, event) in events.iter().enumerate().skip(offset).take(rows) {
            let y = inner.y + (i - offset) as u16;
            let time = event
                .created_at
                .map(format_time_of_day)
                .unwrap_or_else(|| "--:--:--".to_string());
            let summary = truncate_to_width(&event.summary(), text_width.saturating_sub(10));

            let (style, time_color, text_color) = if Some(i) == highlight {
                (
                    Style::default().bg(SELECTED_BG).add_modifier(Modifier::BOLD),
                    TEXT_MUTED,
                    TEXT_BRIGHT,
                )
            } else if i < visible_count {
                (Style::default(), TEXT_FAINT, TEXT_PRIMARY)
            } else {
                (Style::default(), TEXT_FAINT, TEXT_FAINT)
            };

            let line = Line::from(vec![
                Span::styled(format!(" {time} "), style.fg(time_color)),
                Span::styled(summary, style.fg(text_color)),
            ]);
            buf.set_line(inner.x, y, &line, text_width as u16);
        }

        render_vertical_scrollbar(inner, buf, events.len(), rows, offset);
    }
}
