//! Keybinding overlay

use crate::tui::theme::{Theme, get_theme};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn render(frame: &mut Frame, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(format!(" {} Keybinds ", icons.help))
        .title_style(Style::default().fg(theme.palette.accent));

    let content = vec![
        section_header("Queue", &theme),
        keybind("j / Down", "Move down", &theme),
        keybind("k / Up", "Move up", &theme),
        keybind("g / G", "Go to top / bottom", &theme),
        keybind("Enter", "Play selected track", &theme),
        keybind("d", "Remove selected track", &theme),
        keybind("c", "Clear queue", &theme),
        keybind("L", "Toggle playlist loop", &theme),
        Line::default(),
        section_header("Playback", &theme),
        keybind("Space", "Play / pause", &theme),
        keybind("n / p", "Next / previous track", &theme),
        keybind("s", "Play a random track", &theme),
        keybind("+ / -", "Volume up / down", &theme),
        keybind("m", "Mute", &theme),
        keybind("] / [", "Seek 5% forward / back", &theme),
        keybind("r", "Retry a failed track", &theme),
        Line::default(),
        keybind("?", "Close this help", &theme),
        keybind("q", "Quit", &theme),
    ];

    frame.render_widget(
        Paragraph::new(content)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn section_header(title: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![Span::styled(
        format!("━━ {} ━━", title),
        Style::default()
            .fg(theme.palette.accent)
            .add_modifier(Modifier::BOLD),
    )])
}

fn keybind(key: &str, desc: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled(
            format!("{:12}", key),
            Style::default()
                .fg(theme.palette.accent_alt)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc.to_string(), Style::default().fg(theme.palette.fg_primary)),
    ])
}
