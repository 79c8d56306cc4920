//! Branch tree of the visible research graph.
//!
//! Branches nest under the branch they split from; papers and hypotheses are
//! listed under the branch that produced them. Nodes with no visible parent
//! are shown at the top level.

use std::collections::{HashMap, HashSet};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::graph::{Entity, EntityAttributes, EntityId, RelationshipKind};
use crate::replay::Snapshot;

use super::{
    kind_style, BORDER_DEFAULT, SELECTED_BG, TEXT_BRIGHT, TEXT_FAINT, TEXT_MUTED, TEXT_PRIMARY,
};

/// One line of the tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeRow<'a> {
    pub depth: usize,
    pub entity: &'a Entity,
}

/// Flatten a snapshot into display order.
pub fn tree_rows<'a>(snapshot: &Snapshot<'a>) -> Vec<TreeRow<'a>> {
    let nodes: HashMap<&EntityId, &'a Entity> =
        snapshot.nodes.iter().map(|e| (&e.id, *e)).collect();

    let mut children: HashMap<&EntityId, Vec<&'a Entity>> = HashMap::new();
    let mut has_parent: HashSet<&EntityId> = HashSet::new();
    for edge in &snapshot.edges {
        if edge.kind == RelationshipKind::Support {
            continue;
        }
        if let Some(target) = nodes.get(&edge.target_id) {
            children.entry(&edge.source_id).or_default().push(*target);
            has_parent.insert(&edge.target_id);
        }
    }
    for list in children.values_mut() {
        list.sort_by(|a, b| creation_order(a, b));
        list.dedup_by(|a, b| a.id == b.id);
    }

    let mut roots: Vec<&'a Entity> = snapshot
        .nodes
        .iter()
        .copied()
        .filter(|e| !has_parent.contains(&e.id))
        .collect();
    roots.sort_by(|a, b| creation_order(a, b));

    let mut rows = Vec::with_capacity(snapshot.nodes.len());
    let mut expanded = HashSet::new();
    for root in roots {
        push_subtree(root, 0, &children, &mut expanded, &mut rows);
    }
    // Anything left over sits on a cycle of branch splits
    for entity in snapshot.nodes.iter().copied() {
        if !expanded.contains(&entity.id) {
            push_subtree(entity, 0, &children, &mut expanded, &mut rows);
        }
    }
    rows
}

fn push_subtree<'a>(
    entity: &'a Entity,
    depth: usize,
    children: &HashMap<&EntityId, Vec<&'a Entity>>,
    expanded: &mut HashSet<&'a EntityId>,
    rows: &mut Vec<TreeRow<'a>>,
) {
    rows.push(TreeRow { depth, entity });
    // A paper found by two branches is listed under both, but only expanded once
    if !expanded.insert(&entity.id) {
        return;
    }
    if let Some(list) = children.get(&entity.id) {
        for child in list.iter().copied() {
            push_subtree(child, depth + 1, children, expanded, rows);
        }
    }
}

fn creation_order(a: &Entity, b: &Entity) -> std::cmp::Ordering {
    let key = |e: &Entity| e.created_at.unwrap_or(f64::NEG_INFINITY);
    key(a).total_cmp(&key(b)).then_with(|| a.id.cmp(&b.id))
}

/// Cut `text` to at most `width` terminal columns, ending in `…` when shortened
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Graph panel
pub struct GraphView<'a, 'b> {
    snapshot: &'b Snapshot<'a>,
    title: String,
}

impl<'a, 'b> GraphView<'a, 'b> {
    pub fn new(snapshot: &'b Snapshot<'a>) -> Self {
        Self {
            snapshot,
            title: " Graph ".to_string(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn row_line(row: &TreeRow<'_>, width: usize, newest: bool) -> Line<'static> {
        let (glyph, color) = kind_style(row.entity.kind());
        let indent = "  ".repeat(row.depth);
        let detail = Self::detail(row.entity);
        let label_width = width
            .saturating_sub(indent.width() + glyph.width() + 1)
            .saturating_sub(detail.width());
        let label = truncate_to_width(&row.entity.display_label(), label_width);

        let base = if newest {
            Style::default().bg(SELECTED_BG).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let label_color = if row.entity.created_at.is_none() {
            TEXT_MUTED
        } else if newest {
            TEXT_BRIGHT
        } else {
            TEXT_PRIMARY
        };

        Line::from(vec![
            Span::styled(indent, base),
            Span::styled(format!("{glyph} "), base.fg(color)),
            Span::styled(label, base.fg(label_color)),
            Span::styled(detail, base.fg(TEXT_FAINT)),
        ])
    }

    fn detail(entity: &Entity) -> String {
        match &entity.attributes {
            EntityAttributes::Branch(branch) => match &branch.status {
                Some(status) => format!("  [{} · {status}]", branch.mode.label()),
                None => format!("  [{}]", branch.mode.label()),
            },
            EntityAttributes::Paper(paper) => match paper.citation_count {
                Some(citations) => format!("  {citations} cit."),
                None => String::new(),
            },
            EntityAttributes::Hypothesis(hypothesis) => match hypothesis.confidence {
                Some(confidence) => format!("  {:.0}%", confidence * 100.0),
                None => String::new(),
            },
        }
    }
}

impl Widget for GraphView<'_, '_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER_DEFAULT))
            .title(Span::styled(self.title.clone(), Style::default().fg(TEXT_MUTED)));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let rows = tree_rows(self.snapshot);
        if rows.is_empty() {
            let empty = Line::from(Span::styled(
                "Nothing has been created yet",
                Style::default().fg(TEXT_FAINT),
            ));
            buf.set_line(inner.x + 1, inner.y, &empty, inner.width.saturating_sub(1));
            return;
        }

        let newest_id = self.snapshot.newest().map(|e| &e.id);
        let newest_row = rows
            .iter()
            .rposition(|row| Some(&row.entity.id) == newest_id);

        // Keep the newest node on screen
        let visible = inner.height as usize;
        let offset = match newest_row {
            Some(idx) if idx >= visible => idx + 1 - visible,
            _ => 0,
        };

        let width = inner.width as usize;
        for (i, row) in rows.iter().enumerate().skip(offset).take(visible) {
            let y = inner.y + (i - offset) as u16;
            let line = Self::row_line(row, width, Some(i) == newest_row);
            buf.set_line(inner.x, y, &line, inner.width);
        }
    }
}
