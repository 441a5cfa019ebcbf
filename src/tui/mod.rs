use crate::api::models::{SongDetail, TrackRef};
use crate::api::resolve::StreamDescriptor;
use crate::app::state::AppState;
use crate::lyrics::LyricTimeline;
use crate::player::{Phase, PlaybackState};
use anyhow::Context;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};

pub mod theme;
pub mod widgets;

pub type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

pub struct TerminalGuard {
    terminal: TuiTerminal,
}

impl TerminalGuard {
    pub fn enter() -> anyhow::Result<Self> {
        enable_raw_mode().context("enable raw mode")?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("enter alt screen")?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("create terminal")?;

        Ok(Self { terminal })
    }

    pub fn terminal_mut(&mut self) -> &mut TuiTerminal {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best-effort cleanup; don't panic in Drop.
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

/// Read-only snapshot of everything a frame shows besides [`AppState`].
pub struct View<'a> {
    pub playback: &'a PlaybackState,
    pub phase: &'a Phase,
    pub track: Option<&'a TrackRef>,
    pub details: Option<&'a SongDetail>,
    pub stream: Option<&'a StreamDescriptor>,
    pub timeline: &'a LyricTimeline,
    pub lyrics_pending: bool,
    pub queue: &'a [TrackRef],
    pub queue_current: Option<usize>,
}

pub fn draw(terminal: &mut TuiTerminal, state: &mut AppState, view: &View<'_>) -> anyhow::Result<()> {
    if let Some(toast) = &state.toast
        && toast.is_expired()
    {
        state.toast = None;
    }

    terminal
        .draw(|f| {
            widgets::root::render(f, state, view);
        })
        .context("terminal draw")?;
    Ok(())
}
