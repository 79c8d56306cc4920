//! Footer key hint rendering.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use super::{FOOTER_BG, KEY_HINT_BG, TEXT_FAINT, TEXT_MUTED, TEXT_SECONDARY};

#[derive(Debug, Clone, Copy)]
pub struct KeyHintBarStyle {
    pub key_style: Style,
    pub action_style: Style,
    pub disabled_style: Style,
    pub item_gap: &'static str,
    pub background: Color,
}

impl KeyHintBarStyle {
    pub fn footer() -> Self {
        Self {
            key_style: Style::default().fg(TEXT_SECONDARY).bg(KEY_HINT_BG),
            action_style: Style::default().fg(TEXT_MUTED),
            disabled_style: Style::default().fg(TEXT_FAINT),
            item_gap: "   ",
            background: FOOTER_BG,
        }
    }
}

/// One `key action` pair; disabled hints are drawn faint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
    pub enabled: bool,
}

impl KeyHint {
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self {
            key,
            action,
            enabled: true,
        }
    }

    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    fn width(&self) -> usize {
        // " key " + " action"
        self.key.width() + 2 + self.action.width() + 1
    }
}

/// Render as many hints as fit in `area`, left to right.
pub fn render_key_hints(area: Rect, buf: &mut Buffer, hints: &[KeyHint], style: KeyHintBarStyle) {
    let mut spans = vec![Span::raw(" ")];
    let mut used = 1usize;
    let available = area.width as usize;

    for (i, hint) in hints.iter().enumerate() {
        let gap = if i > 0 { style.item_gap.width() } else { 0 };
        if used + gap + hint.width() > available {
            break;
        }
        if i > 0 {
            spans.push(Span::raw(style.item_gap));
        }
        let (key_style, action_style) = if hint.enabled {
            (style.key_style, style.action_style)
        } else {
            (style.disabled_style, style.disabled_style)
        };
        spans.push(Span::styled(format!(" {} ", hint.key), key_style));
        spans.push(Span::styled(format!(" {}", hint.action), action_style));
        used += gap + hint.width();
    }

    Paragraph::new(Line::from(spans))
        .style(Style::default().bg(style.background))
        .render(area, buf);
}
