//! Screen layout: fixed-width process list, one separator column, the
//! output panel, and a single status-bar row at the bottom.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::app::PROCESS_LIST_WIDTH;

/// Split the screen into (list, separator, output, status bar).
pub fn compute_layout(area: Rect) -> (Rect, Rect, Rect, Rect) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(PROCESS_LIST_WIDTH),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(vertical[0]);

    (horizontal[0], horizontal[1], horizontal[2], vertical[1])
}
