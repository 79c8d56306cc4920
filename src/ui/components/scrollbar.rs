//! Shared scrollbar rendering.

use ratatui::prelude::StatefulWidget;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use super::{TEXT_FAINT, TEXT_MUTED};

/// Render a minimal vertical scrollbar on the right edge if content overflows.
pub fn render_vertical_scrollbar(
    area: Rect,
    buf: &mut Buffer,
    total: usize,
    visible: usize,
    offset: usize,
) {
    if total <= visible {
        return;
    }

    let max_scroll = total.saturating_sub(visible);
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(None)
        .end_symbol(None)
        .track_symbol(Some("│"))
        .track_style(Style::default().fg(TEXT_FAINT))
        .thumb_symbol("┃")
        .thumb_style(Style::default().fg(TEXT_MUTED));

    let mut state = ScrollbarState::new(max_scroll).position(offset.min(max_scroll));
    scrollbar.render(area, buf, &mut state);
}
