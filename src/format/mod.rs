//! Output formatting for `tracker_dash`.
//!
//! JSON output is the serde form of the result types themselves; this module
//! holds the human-readable renderers.

mod text;

pub use text::{
    format_issue_line, render_issue_page, render_options, render_projects, render_stats,
    render_sync_report, render_timeline, render_versions, terminal_width, truncate_title,
};
