pub mod actions;
pub mod events;
pub mod state;

use crate::api::{self, NcmClient, StreamResolver};
use crate::api::resolve::QualityLevel;
use crate::config::Config;
use crate::input;
use crate::lyrics;
use crate::player::mpv::MpvHandle;
use crate::player::{AudioOutcome, LoadTicket, Phase, PlaybackController};
use crate::queue::Queue;
use crate::storage::{SharedStore, Storage};
use crate::tui::{self, TuiTerminal};
use actions::Action;
use events::{Event, NetworkEvent, PlayerEvent};
use state::{AppState, Toast};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

const VOLUME_STEP: u8 = 5;
const SEEK_STEP: f64 = 0.05;

pub struct App {
    cfg: Config,
    config_path: PathBuf,
    state: AppState,
    api: NcmClient,
    resolver: StreamResolver<NcmClient>,
    controller: PlaybackController<Option<MpvHandle>>,
    queue: Queue,
}

impl App {
    pub fn new(cfg: Config, config_path: PathBuf) -> anyhow::Result<Self> {
        let api = NcmClient::new(&cfg.api.base_url, cfg.api.cookie.clone())?;
        let resolver = StreamResolver::new(api.clone(), QualityLevel::parse(&cfg.api.quality));
        let store: SharedStore = Arc::new(Storage::open(&cfg.db_path())?);

        let controller = PlaybackController::new(None, store.clone(), cfg.player.volume);
        let queue = Queue::restore(store);
        let state = AppState::new(cfg.player.loop_playlist, queue.current_index().unwrap_or(0));

        Ok(Self {
            cfg,
            config_path,
            state,
            api,
            resolver,
            controller,
            queue,
        })
    }

    pub async fn run(&mut self, terminal: &mut TuiTerminal) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<Event>(256);

        input::spawn_input_task(tx.clone());
        // No ticker: the UI redraws on input, network and player events, and
        // mpv reports time-pos often enough while something is playing.

        let mpv_log = self.cfg.paths.data_dir.join("mpv.log");
        match MpvHandle::spawn(
            tx.clone(),
            self.cfg.player.audio_device.as_deref(),
            Some(&mpv_log),
        )
        .await
        {
            Ok(h) => {
                self.controller.attach_output(Some(h));
                self.controller.sync_output().await;
            }
            Err(e) => {
                tracing::warn!("mpv unavailable: {e:#}");
                self.state.toast = Some(Toast::error(format!("mpv disabled: {e:#}")));
            }
        }

        if !self.queue.is_empty() {
            self.state.status = format!("Restored queue: {} tracks", self.queue.len());
        }

        self.draw(terminal)?;

        while let Some(ev) = rx.recv().await {
            match ev {
                Event::Input(input_ev) => {
                    if let Some(action) = input::map_input_to_action(&self.state, input_ev) {
                        self.handle_action(action, &tx).await;
                    }
                }
                Event::Player(pe) => {
                    self.handle_player(pe, &tx);
                }
                Event::Network(ne) => {
                    self.handle_network(ne).await;
                }
            }

            if self.state.should_quit {
                break;
            }

            self.draw(terminal)?;
        }

        self.save_state_on_quit();

        Ok(())
    }

    fn draw(&mut self, terminal: &mut TuiTerminal) -> anyhow::Result<()> {
        let view = tui::View {
            playback: self.controller.state(),
            phase: self.controller.phase(),
            track: self.controller.track(),
            details: self.controller.details(),
            stream: self.controller.stream(),
            timeline: self.controller.timeline(),
            lyrics_pending: self.controller.lyrics_pending(),
            queue: self.queue.tracks(),
            queue_current: self.queue.current_index(),
        };
        tui::draw(terminal, &mut self.state, &view)
    }

    fn save_state_on_quit(&mut self) {
        carry_preferences(&mut self.cfg, &self.state);

        if let Err(e) = crate::config::save(&self.cfg, Some(&self.config_path)) {
            tracing::warn!("save config: {e:#}");
        }
    }

    async fn handle_action(&mut self, action: Action, tx: &mpsc::Sender<Event>) {
        match action {
            Action::PlaySelected => {
                let index = self.state.queue_list.selected;
                let ticket = self.queue.play_at(index, &mut self.controller);
                self.start_load(ticket, tx);
            }
            Action::PlayNext => {
                let ticket = self.queue.play_next(self.state.loop_playlist, &mut self.controller);
                if ticket.is_none() {
                    self.state.status = "End of queue".into();
                }
                self.start_load(ticket, tx);
            }
            Action::PlayPrev => {
                let ticket = self.queue.play_previous(&mut self.controller);
                if ticket.is_none() {
                    self.state.status = "Start of queue".into();
                }
                self.start_load(ticket, tx);
            }
            Action::ShufflePick => {
                let ticket = self.queue.shuffle_pick(&mut self.controller);
                self.start_load(ticket, tx);
            }
            Action::Retry => match self.controller.retry() {
                Some(ticket) => self.start_load(Some(ticket), tx),
                None => self.state.status = "Nothing to retry".into(),
            },
            Action::TogglePause => {
                if let Err(e) = self.controller.toggle_play().await {
                    self.state.toast = Some(Toast::error(format!("Playback: {e}")));
                }
            }
            Action::VolumeUp | Action::VolumeDown => {
                let v = self.controller.state().volume_percent;
                let v = if action == Action::VolumeUp {
                    v.saturating_add(VOLUME_STEP).min(100)
                } else {
                    v.saturating_sub(VOLUME_STEP)
                };
                if let Err(e) = self.controller.set_volume(v).await {
                    self.state.status = format!("Volume: {e}");
                }
            }
            Action::ToggleMute => {
                if let Err(e) = self.controller.toggle_mute().await {
                    self.state.status = format!("Mute: {e}");
                }
            }
            Action::SeekForward | Action::SeekBack => {
                let delta = if action == Action::SeekForward { SEEK_STEP } else { -SEEK_STEP };
                let target = self.controller.progress() + delta;
                match self.controller.seek(target).await {
                    Ok(true) => {}
                    Ok(false) => self.state.status = "Duration not known yet".into(),
                    Err(e) => self.state.status = format!("Seek: {e}"),
                }
            }
            _ => self.reduce(action),
        }
    }

    fn reduce(&mut self, action: Action) {
        let len = self.queue.len();
        let list = &mut self.state.queue_list;
        match action {
            Action::Quit => self.state.should_quit = true,
            Action::ToggleHelp => self.state.show_help = !self.state.show_help,
            Action::Resize => {}
            Action::ListUp => list.select_prev(),
            Action::ListDown => list.select_next(len),
            Action::GoTop => list.selected = 0,
            Action::GoBottom => list.select_last(len),
            Action::QueueRemoveSelected => {
                if let Some(track) = self.queue.remove(list.selected) {
                    list.clamp(self.queue.len());
                    self.state.toast = Some(Toast::success(format!("Removed: {}", track.display())));
                }
            }
            Action::QueueClear => {
                self.queue.clear();
                list.clamp(0);
                self.state.toast = Some(Toast::success("Queue cleared"));
            }
            Action::ToggleLoop => {
                self.state.loop_playlist = !self.state.loop_playlist;
                self.state.status = if self.state.loop_playlist {
                    "Loop: on".into()
                } else {
                    "Loop: off".into()
                };
            }
            // Handled in handle_action
            Action::PlaySelected
            | Action::PlayNext
            | Action::PlayPrev
            | Action::ShufflePick
            | Action::Retry
            | Action::TogglePause
            | Action::VolumeUp
            | Action::VolumeDown
            | Action::ToggleMute
            | Action::SeekForward
            | Action::SeekBack => {}
        }
    }

    /// Fan out the three sub-requests of a track load. Each reports back
    /// on its own so a slow one never holds up the others.
    fn start_load(&mut self, ticket: Option<LoadTicket>, tx: &mpsc::Sender<Event>) {
        let Some(ticket) = ticket else {
            return;
        };
        let track_id = ticket.track_id;
        if let Some(current) = self.queue.current_index() {
            self.state.queue_list.selected = current;
        }
        if let Some(track) = self.controller.track() {
            self.state.status = format!("Loading: {}", track.display());
        }

        let client = self.api.clone();
        let tx_lyrics = tx.clone();
        tokio::spawn(async move {
            let lyrics = match lyrics::fetch_lyrics(&client, track_id).await {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::debug!(track_id, "lyrics unavailable: {e}");
                    None
                }
            };
            let _ = tx_lyrics
                .send(Event::Network(NetworkEvent::LyricsLoaded { ticket, lyrics }))
                .await;
        });

        let client = self.api.clone();
        let tx_details = tx.clone();
        tokio::spawn(async move {
            match api::song_detail(&client, track_id).await {
                Ok(Some(detail)) => {
                    let _ = tx_details
                        .send(Event::Network(NetworkEvent::DetailsLoaded { ticket, detail }))
                        .await;
                }
                Ok(None) => tracing::debug!(track_id, "no song detail"),
                Err(e) => tracing::debug!(track_id, "song detail failed: {e}"),
            }
        });

        let resolver = self.resolver.clone();
        let tx_stream = tx.clone();
        tokio::spawn(async move {
            let result = resolver.resolve(track_id).await;
            let _ = tx_stream
                .send(Event::Network(NetworkEvent::StreamResolved { ticket, result }))
                .await;
        });
    }

    fn handle_player(&mut self, pe: PlayerEvent, tx: &mpsc::Sender<Event>) {
        match self.controller.on_audio_event(pe) {
            AudioOutcome::Nothing => {}
            AudioOutcome::LyricMoved(change) => {
                let text = self.controller.active_line().map(|l| l.text.as_str());
                tracing::trace!(?change, ?text, "lyric line");
            }
            AudioOutcome::TrackEnded => {
                let ticket = self.queue.play_next(self.state.loop_playlist, &mut self.controller);
                if ticket.is_none() {
                    self.state.status = "Queue finished".into();
                }
                self.start_load(ticket, tx);
            }
            AudioOutcome::Failed(_) => self.report_failure(),
            AudioOutcome::Warning(msg) => self.state.status = msg,
        }
    }

    async fn handle_network(&mut self, ne: NetworkEvent) {
        match ne {
            NetworkEvent::LyricsLoaded { ticket, lyrics } => {
                self.controller.apply_lyrics(ticket, lyrics.as_deref());
            }
            NetworkEvent::DetailsLoaded { ticket, detail } => {
                self.controller.apply_details(ticket, detail);
            }
            NetworkEvent::StreamResolved { ticket, result } => {
                if self.controller.apply_stream(ticket, result).await {
                    self.report_failure();
                }
            }
        }
        self.check_session();
    }

    fn report_failure(&mut self) {
        if let Phase::Failed(reason) = self.controller.phase() {
            let msg = reason.message();
            self.state.status = msg.clone();
            self.state.toast = Some(Toast::error(msg));
        }
    }

    fn check_session(&mut self) {
        if !self.state.session_expired && self.cfg.api.cookie.is_some() && !self.api.has_session() {
            self.state.session_expired = true;
            self.state.toast = Some(Toast::error(
                "Session expired; continuing anonymously (set a new cookie with `auth cookie`)",
            ));
        }
    }
}

/// Session preferences that belong in the config file. Volume is not one of
/// them: it lives in the store, and `player.volume` stays the user's default.
fn carry_preferences(cfg: &mut Config, state: &AppState) {
    cfg.player.loop_playlist = state.loop_playlist;
    if state.session_expired {
        cfg.api.cookie = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quitting_keeps_the_configured_default_volume() {
        let mut cfg = crate::config::defaults::defaults();
        cfg.player.volume = 60;
        cfg.api.cookie = Some("MUSIC_U=abc".into());

        let state = AppState {
            loop_playlist: true,
            ..AppState::default()
        };
        carry_preferences(&mut cfg, &state);
        assert_eq!(cfg.player.volume, 60);
        assert!(cfg.player.loop_playlist);
        assert_eq!(cfg.api.cookie.as_deref(), Some("MUSIC_U=abc"));

        let expired = AppState {
            session_expired: true,
            ..AppState::default()
        };
        carry_preferences(&mut cfg, &expired);
        assert!(cfg.api.cookie.is_none());
        assert!(!cfg.player.loop_playlist);
    }
}
