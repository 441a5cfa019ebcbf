//! Lyrics panel, scrolled so the active line sits in the middle.

use super::truncate_str;
use crate::tui::View;
use crate::tui::theme::get_theme;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn render(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(format!(" {} Lyrics ", icons.lyrics))
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = view.timeline.lines();
    if lines.is_empty() {
        let msg = if view.track.is_none() {
            ""
        } else if view.lyrics_pending {
            "Loading..."
        } else {
            "No lyrics available"
        };
        let content = Line::from(Span::styled(msg, Style::default().fg(theme.palette.fg_secondary)));
        frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), inner);
        return;
    }

    let height = inner.height as usize;
    let active = view.playback.active_lyric;
    let (start, end) = window(active, lines.len(), height);
    let max_width = (inner.width as usize).saturating_sub(2);

    let display: Vec<Line> = (start..end)
        .map(|i| {
            let style = if Some(i) == active {
                Style::default()
                    .fg(theme.palette.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.palette.fg_secondary)
            };
            Line::from(Span::styled(truncate_str(&lines[i].text, max_width), style))
        })
        .collect();

    frame.render_widget(Paragraph::new(display).alignment(Alignment::Center), inner);
}

/// Visible `[start, end)` range of `len` lines with `active` centered where
/// possible.
fn window(active: Option<usize>, len: usize, height: usize) -> (usize, usize) {
    if len <= height {
        return (0, len);
    }
    let anchor = active.unwrap_or(0);
    let start = anchor.saturating_sub(height / 2).min(len - height);
    (start, start + height)
}

#[cfg(test)]
mod tests {
    use super::window;

    #[test]
    fn window_centers_and_clamps() {
        assert_eq!(window(Some(2), 3, 10), (0, 3));
        assert_eq!(window(None, 30, 5), (0, 5));
        assert_eq!(window(Some(10), 30, 5), (8, 13));
        assert_eq!(window(Some(29), 30, 5), (25, 30));
    }
}
