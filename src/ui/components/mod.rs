mod event_log_view;
mod graph_view;
mod key_hints;
mod scrollbar;
mod stats_bar;
mod theme;
mod timeline_bar;

pub use event_log_view::EventLogView;
pub use graph_view::{tree_rows, truncate_to_width, GraphView, TreeRow};
pub use key_hints::{render_key_hints, KeyHint, KeyHintBarStyle};
pub use scrollbar::render_vertical_scrollbar;
pub use stats_bar::StatsBar;
pub use theme::*;
pub use timeline_bar::{format_speed, TimelineBar};
