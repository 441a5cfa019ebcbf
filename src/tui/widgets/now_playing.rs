//! Now Playing widget - compact text-only player for bottom bar

use super::truncate_str;
use crate::app::state::{AppState, ToastKind};
use crate::player::Phase;
use crate::tui::View;
use crate::tui::theme::{Icons, get_theme};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn render(frame: &mut Frame, state: &AppState, view: &View<'_>, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(format!(" {} Player ", icons.music))
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let padded = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner)[1];

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Track title
            Constraint::Length(1), // Artist / album
            Constraint::Length(1), // Progress bar
            Constraint::Length(1), // Time + controls + volume
            Constraint::Length(1), // Phase / status
            Constraint::Min(0),    // Toast (if any)
        ])
        .split(padded);

    let content_width = padded.width.saturating_sub(1) as usize;
    let pb = view.playback;

    let title = view.track.map(|t| t.name.as_str()).unwrap_or("Not playing");
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            truncate_str(title, content_width),
            Style::default()
                .fg(theme.palette.fg_primary)
                .add_modifier(Modifier::BOLD),
        ))),
        rows[0],
    );

    let mut subtitle = view.track.map(|t| t.artists.join(", ")).unwrap_or_default();
    if let Some(album) = view.details.and_then(|d| d.album_name()) {
        subtitle = format!("{subtitle} {} {album}", icons.bullet);
    }
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            truncate_str(&subtitle, content_width),
            Style::default().fg(theme.palette.fg_secondary),
        ))),
        rows[1],
    );

    let ratio = if pb.duration_ms > 0.0 {
        (pb.position_ms / pb.duration_ms).clamp(0.0, 1.0)
    } else {
        0.0
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            render_progress_bar(rows[2].width as usize, ratio, icons),
            Style::default().fg(theme.palette.accent),
        ))),
        rows[2],
    );

    let play_icon = if pb.is_playing { icons.pause } else { icons.play };
    let vol_icon = if pb.is_muted || pb.volume_percent == 0 {
        icons.volume_mute
    } else if pb.volume_percent < 50 {
        icons.volume_low
    } else {
        icons.volume_high
    };

    let mut controls = vec![
        Span::styled(
            format!("{}/{}", format_ms(pb.position_ms), format_ms(pb.duration_ms)),
            Style::default().fg(theme.palette.fg_secondary),
        ),
        Span::raw(" "),
        Span::styled(icons.prev, Style::default().fg(theme.palette.fg_secondary)),
        Span::raw(" "),
        Span::styled(play_icon, Style::default().fg(theme.palette.playing)),
        Span::raw(" "),
        Span::styled(icons.next, Style::default().fg(theme.palette.fg_secondary)),
        Span::raw("  "),
        Span::styled(vol_icon, Style::default().fg(theme.palette.fg_secondary)),
        Span::raw(" "),
        Span::styled(
            if pb.is_muted {
                "muted".to_string()
            } else {
                format!("{}%", pb.volume_percent)
            },
            Style::default().fg(theme.palette.fg_secondary),
        ),
    ];
    if state.loop_playlist {
        controls.push(Span::raw(" "));
        controls.push(Span::styled(icons.repeat, Style::default().fg(theme.palette.accent_alt)));
    }
    if let Some(stream) = view.stream {
        controls.push(Span::styled(
            format!("  {} {}k", stream.source, stream.bitrate / 1000),
            Style::default().fg(theme.palette.fg_secondary),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(controls)), rows[3]);

    let status = match view.phase {
        Phase::Loading => format!("{} Loading...", icons.loading),
        Phase::Failed(reason) => format!("{} {}", icons.error, reason.message()),
        _ => state.status.clone(),
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            truncate_str(&status, content_width),
            Style::default().fg(theme.palette.fg_secondary),
        ))),
        rows[4],
    );

    if let Some(toast) = &state.toast {
        let (prefix, color) = match toast.kind {
            ToastKind::Success => (icons.success, theme.palette.playing),
            ToastKind::Error => (icons.error, theme.palette.error),
        };
        let toast_line = Line::from(vec![
            Span::styled(format!("{} ", prefix), Style::default().fg(color)),
            Span::styled(
                truncate_str(&toast.message, content_width.saturating_sub(3)),
                Style::default().fg(color),
            ),
        ]);
        frame.render_widget(Paragraph::new(toast_line), rows[5]);
    }
}

fn format_ms(ms: f64) -> String {
    let secs = (ms.max(0.0) / 1000.0).floor() as u64;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn render_progress_bar(width: usize, ratio: f64, icons: &Icons) -> String {
    if width < 3 {
        return String::new();
    }

    let filled = ((width - 1) as f64 * ratio).round() as usize;
    let empty = width.saturating_sub(filled + 1);

    let mut bar = String::with_capacity(width * 3);
    for _ in 0..filled {
        bar.push_str(icons.progress_full);
    }
    bar.push_str(icons.progress_head);
    for _ in 0..empty {
        bar.push_str(icons.progress_empty);
    }
    bar
}
