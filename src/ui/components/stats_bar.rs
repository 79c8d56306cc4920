use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

use crate::graph::EntityKind;
use crate::replay::KindStats;

use super::{
    kind_style, ACCENT_ERROR, ACCENT_WARNING, BG_ELEVATED, TEXT_MUTED, TEXT_PRIMARY,
    TEXT_SECONDARY,
};

/// Per-kind counts of the visible graph, plus session-level notices
pub struct StatsBar<'a> {
    stats: KindStats,
    edges: usize,
    untimestamped: usize,
    source: &'a str,
    notice: Option<&'a str>,
    error: Option<&'a str>,
}

impl<'a> StatsBar<'a> {
    pub fn new(stats: KindStats, edges: usize) -> Self {
        Self {
            stats,
            edges,
            untimestamped: 0,
            source: "",
            notice: None,
            error: None,
        }
    }

    pub fn untimestamped(mut self, count: usize) -> Self {
        self.untimestamped = count;
        self
    }

    pub fn source(mut self, source: &'a str) -> Self {
        self.source = source;
        self
    }

    pub fn notice(mut self, notice: Option<&'a str>) -> Self {
        self.notice = notice;
        self
    }

    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    fn left_spans(&self) -> Vec<Span<'static>> {
        let bg = Style::default().bg(BG_ELEVATED);
        let mut spans = vec![Span::styled(" ", bg)];
        for kind in EntityKind::ALL {
            let (glyph, color) = kind_style(kind);
            spans.push(Span::styled(format!("{glyph} "), bg.fg(color)));
            spans.push(Span::styled(
                format!("{} {}  ", self.stats.count(kind), plural(kind)),
                bg.fg(TEXT_PRIMARY),
            ));
        }
        spans.push(Span::styled(
            format!("→ {} edges", self.edges),
            bg.fg(TEXT_SECONDARY),
        ));
        if self.untimestamped > 0 {
            spans.push(Span::styled(
                format!("  ⚠ {} without timestamp", self.untimestamped),
                bg.fg(ACCENT_WARNING),
            ));
        }
        spans
    }

    fn right_span(&self) -> Span<'a> {
        let bg = Style::default().bg(BG_ELEVATED);
        if let Some(error) = self.error {
            Span::styled(format!("{error} "), bg.fg(ACCENT_ERROR))
        } else if let Some(notice) = self.notice {
            Span::styled(format!("{notice} "), bg.fg(ACCENT_WARNING))
        } else {
            Span::styled(format!("{} ", self.source), bg.fg(TEXT_MUTED))
        }
    }
}

fn plural(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Branch => "branches",
        EntityKind::Paper => "papers",
        EntityKind::Hypothesis => "hypotheses",
    }
}

impl Widget for StatsBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        buf.set_style(area, Style::default().bg(BG_ELEVATED));

        let left = Line::from(self.left_spans());
        let left_width = left.width() as u16;
        buf.set_line(area.x, area.y, &left, area.width);

        let right = Line::from(self.right_span());
        let right_width = right.width() as u16;
        // Only draw the right side when it does not overlap the counts
        if left_width + right_width < area.width {
            let x = area.x + area.width - right_width;
            buf.set_line(x, area.y, &right, right_width);
        }
    }
}
