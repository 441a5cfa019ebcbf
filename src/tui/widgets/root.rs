//! Root layout widget - orchestrates main layout structure

use crate::app::state::AppState;
use crate::tui::View;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Clear,
};

use super::{help, lyrics, now_playing, queue};

/// Main layout structure:
/// ┌──────────────────────┬─────────────────────────────┐
/// │        Queue         │           Lyrics            │
/// │                      │   (scrolled to active line) │
/// ├──────────────────────┴─────────────────────────────┤
/// │                       Player                       │
/// └────────────────────────────────────────────────────┘
pub fn render(frame: &mut Frame, state: &mut AppState, view: &View<'_>) {
    let root = frame.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),    // Queue + lyrics
            Constraint::Length(8), // Player
        ])
        .split(root);

    let top_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[0]);

    queue::render(frame, state, view, top_cols[0]);
    lyrics::render(frame, view, top_cols[1]);
    now_playing::render(frame, state, view, rows[1]);

    if state.show_help {
        let area = centered(root, 64, 22);
        frame.render_widget(Clear, area);
        help::render(frame, area);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
