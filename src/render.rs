//! Human-readable board rendering.
//!
//! Columns are printed left to right as consecutive blocks. Each card shows
//! its key (with a `*` badge while temporal), the type glyph, the assignee,
//! the summary, and the two transition controls, where a disabled control is
//! drawn as `-`.

use crate::board::{Adjacency, Column, Columns, StateIndex};
use crate::models::ResolvedIssue;
use crate::Result;

/// Badge appended to the key of an issue that has not been synced yet.
pub const TEMPORAL_BADGE: char = '*';

fn display_assignee(assignee: &str) -> String {
    if assignee.is_empty() {
        "(unassigned)".to_string()
    } else {
        format!("@{}", assignee)
    }
}

/// Transition controls of a card, e.g. `[<] [>]` or `[-] [>]`.
pub fn render_controls(adjacency: &Adjacency) -> String {
    let left = if adjacency.can_move_left() { '<' } else { '-' };
    let right = if adjacency.can_move_right() { '>' } else { '-' };
    format!("[{}] [{}]", left, right)
}

/// One card, as indented lines.
pub fn render_card(issue: &ResolvedIssue, adjacency: &Adjacency) -> String {
    let badge = if issue.temporal {
        TEMPORAL_BADGE.to_string()
    } else {
        String::new()
    };
    format!(
        "  {}{} [{}] {}\n    {}\n    {}",
        issue.key,
        badge,
        issue.issue_type.glyph(),
        display_assignee(&issue.assignee),
        issue.summary,
        render_controls(adjacency),
    )
}

pub fn render_column(column: &Column, adjacency: &Adjacency) -> String {
    let mut out = format!("== {} ({}) ==", column.state, column.issues.len());
    if column.issues.is_empty() {
        out.push_str("\n  (empty)");
    }
    for issue in &column.issues {
        out.push('\n');
        out.push_str(&render_card(issue, adjacency));
    }
    out
}

/// The whole board with its header.
pub fn render_board(columns: &Columns, index: &StateIndex, editor_opened: bool) -> Result<String> {
    let editor = if editor_opened {
        "(editor open)"
    } else {
        "[+] Add issue"
    };
    let mut out = format!(
        "Board: {} columns, {} issues    {}",
        columns.len(),
        columns.card_count(),
        editor
    );

    for column in columns.iter() {
        let adjacency = index.adjacent(&column.state)?;
        out.push_str("\n\n");
        out.push_str(&render_column(column, &adjacency));
    }
    Ok(out)
}
