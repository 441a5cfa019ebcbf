//! Queue panel

use super::truncate_str;
use crate::app::state::AppState;
use crate::tui::View;
use crate::tui::theme::get_theme;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn render(frame: &mut Frame, state: &mut AppState, view: &View<'_>, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let title = if state.loop_playlist {
        format!(" {} Queue ({}) {} ", icons.queue, view.queue.len(), icons.repeat)
    } else {
        format!(" {} Queue ({}) ", icons.queue, view.queue.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(title)
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if view.queue.is_empty() {
        let hint = Line::from(Span::styled(
            "Queue is empty. Add tracks with `cloudtide queue add <id>`.",
            Style::default().fg(theme.palette.fg_secondary),
        ));
        frame.render_widget(Paragraph::new(hint), inner);
        return;
    }

    let visible_height = inner.height as usize;
    let list = &mut state.queue_list;
    list.clamp(view.queue.len());
    list.update_scroll(visible_height);

    let max_width = (inner.width as usize).saturating_sub(8);
    let lines: Vec<Line> = view
        .queue
        .iter()
        .enumerate()
        .skip(list.scroll_offset)
        .take(visible_height)
        .map(|(i, track)| {
            let is_current = view.queue_current == Some(i);
            let is_selected = i == list.selected;

            let prefix = if is_current {
                format!("{} ", icons.play)
            } else {
                "  ".to_string()
            };

            let style = if is_selected {
                Style::default()
                    .fg(theme.palette.fg_primary)
                    .bg(theme.palette.bg_highlight)
                    .add_modifier(Modifier::BOLD)
            } else if is_current {
                Style::default()
                    .fg(theme.palette.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.palette.fg_primary)
            };

            Line::from(vec![
                Span::styled(prefix, Style::default().fg(theme.palette.accent)),
                Span::styled(
                    format!("{:>3}. ", i + 1),
                    Style::default().fg(theme.palette.fg_secondary),
                ),
                Span::styled(truncate_str(&track.display(), max_width), style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}
