//! Shared UI color constants.

use ratatui::style::Color;

use crate::graph::EntityKind;

pub const BG_BASE: Color = Color::Rgb(18, 18, 18);
pub const BG_ELEVATED: Color = Color::Rgb(28, 28, 28);
pub const SELECTED_BG: Color = Color::Rgb(40, 60, 80);

pub const HEADER_BG: Color = Color::Rgb(20, 20, 20);
pub const STATUS_BAR_BG: Color = Color::Rgb(30, 30, 30);
pub const FOOTER_BG: Color = Color::Rgb(25, 25, 25);
pub const KEY_HINT_BG: Color = Color::Rgb(60, 60, 60);

pub const TEXT_BRIGHT: Color = Color::Rgb(240, 240, 240);
pub const TEXT_PRIMARY: Color = Color::Rgb(210, 210, 210);
pub const TEXT_SECONDARY: Color = Color::Rgb(170, 170, 170);
pub const TEXT_MUTED: Color = Color::Rgb(130, 130, 130);
pub const TEXT_FAINT: Color = Color::Rgb(85, 85, 85);

pub const BORDER_DEFAULT: Color = Color::Rgb(60, 60, 60);
pub const BORDER_FOCUSED: Color = Color::Rgb(90, 140, 190);

pub const ACCENT_PRIMARY: Color = Color::Rgb(97, 175, 239);
pub const ACCENT_SUCCESS: Color = Color::Rgb(152, 195, 121);
pub const ACCENT_WARNING: Color = Color::Rgb(229, 192, 123);
pub const ACCENT_ERROR: Color = Color::Rgb(224, 108, 117);

pub const BRANCH_COLOR: Color = Color::Rgb(198, 120, 221);
pub const PAPER_COLOR: Color = Color::Rgb(97, 175, 239);
pub const HYPOTHESIS_COLOR: Color = Color::Rgb(229, 192, 123);

/// Glyph and color used for an entity kind everywhere in the UI
pub fn kind_style(kind: EntityKind) -> (&'static str, Color) {
    match kind {
        EntityKind::Branch => ("◆", BRANCH_COLOR),
        EntityKind::Paper => ("•", PAPER_COLOR),
        EntityKind::Hypothesis => ("★", HYPOTHESIS_COLOR),
    }
}
