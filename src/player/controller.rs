//! Playback state machine.
//!
//! ```text
//! Idle ──load_track──▶ Loading ──stream attached + Started──▶ Playing ◀──▶ Paused
//!                         │                                     │
//!                         └──NotPlayable / play rejected──▶ Failed ◀──backend error
//! ```
//!
//! Any phase goes back to `Loading` on `load_track`. Sub-request results are
//! tagged with the [`LoadTicket`] handed out by that call and are dropped
//! once a newer load has started.

use super::{AudioOutput, PlaybackError, PlayerEvent};
use crate::api::models::{FeeTier, SongDetail, TrackId, TrackRef};
use crate::api::resolve::{NotPlayable, StreamDescriptor};
use crate::lyrics::{LyricChange, LyricLine, LyricTimeline, sync};
use crate::storage::{self, SharedStore};

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_muted: bool,
    pub volume_percent: u8,
    pub current_track_id: Option<TrackId>,
    pub position_ms: f64,
    pub duration_ms: f64,
    /// `None` or a valid index into the loaded timeline.
    pub active_lyric: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Subscription-only track with no alternate source.
    Restricted,
    /// Must be purchased first.
    PayPerItem,
    /// Nothing usable came back from any source.
    Unavailable,
    /// The audio backend refused or failed the stream.
    PlaybackRejected(String),
}

impl FailureReason {
    pub fn from_fee_tier(tier: FeeTier) -> Self {
        match tier {
            FeeTier::Restricted => FailureReason::Restricted,
            FeeTier::PayPerItem => FailureReason::PayPerItem,
            FeeTier::Free | FeeTier::Unknown(_) => FailureReason::Unavailable,
        }
    }

    pub fn message(&self) -> String {
        match self {
            FailureReason::Restricted => {
                "Subscription-only track, no alternate source found (r to retry)".into()
            }
            FailureReason::PayPerItem => "This track has to be purchased before it can be played".into(),
            FailureReason::Unavailable => "No playable source (r to retry, n to skip)".into(),
            FailureReason::PlaybackRejected(e) => format!("Playback failed: {e} (r to retry)"),
        }
    }

    pub fn can_retry(&self) -> bool {
        !matches!(self, FailureReason::PayPerItem)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Playing,
    Paused,
    Failed(FailureReason),
}

/// Identifies one `load_track` call. Results carrying an older ticket are
/// stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    pub track_id: TrackId,
}

/// What an audio event meant for the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioOutcome {
    Nothing,
    LyricMoved(LyricChange),
    /// The current track finished; the queue decides what plays next.
    TrackEnded,
    Failed(String),
    Warning(String),
}

pub struct PlaybackController<A> {
    audio: A,
    store: SharedStore,
    state: PlaybackState,
    phase: Phase,
    generation: u64,
    track: Option<TrackRef>,
    details: Option<SongDetail>,
    stream: Option<StreamDescriptor>,
    /// The backend holds a file, possibly one a newer load superseded.
    output_loaded: bool,
    timeline: LyricTimeline,
    lyrics_pending: bool,
}

impl<A: AudioOutput> PlaybackController<A> {
    /// Volume comes from the store when present, else `default_volume`.
    pub fn new(audio: A, store: SharedStore, default_volume: u8) -> Self {
        let volume_percent = storage::load_volume(&*store).unwrap_or(default_volume.min(100));
        Self {
            audio,
            store,
            state: PlaybackState {
                is_playing: false,
                is_muted: false,
                volume_percent,
                current_track_id: None,
                position_ms: 0.0,
                duration_ms: 0.0,
                active_lyric: None,
            },
            phase: Phase::Idle,
            generation: 0,
            track: None,
            details: None,
            stream: None,
            output_loaded: false,
            timeline: LyricTimeline::default(),
            lyrics_pending: false,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn track(&self) -> Option<&TrackRef> {
        self.track.as_ref()
    }

    pub fn details(&self) -> Option<&SongDetail> {
        self.details.as_ref()
    }

    pub fn stream(&self) -> Option<&StreamDescriptor> {
        self.stream.as_ref()
    }

    pub fn timeline(&self) -> &LyricTimeline {
        &self.timeline
    }

    pub fn lyrics_pending(&self) -> bool {
        self.lyrics_pending
    }

    pub fn active_line(&self) -> Option<&LyricLine> {
        self.timeline.get(self.state.active_lyric?)
    }

    /// Fraction of the track played, 0 when the duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.state.duration_ms > 0.0 {
            (self.state.position_ms / self.state.duration_ms).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Swap in a newly started backend. Nothing is loaded on it yet.
    pub fn attach_output(&mut self, audio: A) {
        self.audio = audio;
        self.stream = None;
        self.output_loaded = false;
        self.state.is_playing = false;
        if matches!(self.phase, Phase::Playing | Phase::Paused) {
            self.phase = Phase::Idle;
        }
    }

    /// Push the restored volume and mute flag to a freshly started backend.
    pub async fn sync_output(&self) {
        if let Err(e) = self.audio.set_volume(self.state.volume_percent).await {
            tracing::warn!("set initial volume: {e}");
        }
        if let Err(e) = self.audio.set_muted(self.state.is_muted).await {
            tracing::warn!("set initial mute: {e}");
        }
    }

    /// Start loading `track`, superseding anything in flight. The caller
    /// fetches lyrics, details and the stream concurrently and feeds each
    /// result back with the returned ticket.
    pub fn load_track(&mut self, track: TrackRef) -> LoadTicket {
        self.generation += 1;
        let ticket = LoadTicket {
            generation: self.generation,
            track_id: track.id,
        };

        tracing::debug!(track_id = track.id, generation = self.generation, "load track");
        self.state.current_track_id = Some(track.id);
        self.state.is_playing = false;
        self.state.position_ms = 0.0;
        self.state.duration_ms = 0.0;
        self.state.active_lyric = None;
        self.timeline = LyricTimeline::default();
        self.lyrics_pending = true;
        self.details = None;
        self.stream = None;
        self.track = Some(track);
        self.phase = Phase::Loading;
        ticket
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation && self.state.current_track_id == Some(ticket.track_id)
    }

    fn check_ticket(&self, ticket: LoadTicket, what: &str) -> bool {
        let current = self.is_current(ticket);
        if !current {
            tracing::debug!(track_id = ticket.track_id, "dropping stale {what}");
        }
        current
    }

    /// Install the lyric timeline; `None` means the track has no lyrics.
    pub fn apply_lyrics(&mut self, ticket: LoadTicket, raw: Option<&str>) -> bool {
        if !self.check_ticket(ticket, "lyrics") {
            return false;
        }
        self.timeline = raw.map(LyricTimeline::parse).unwrap_or_default();
        self.state.active_lyric = None;
        self.lyrics_pending = false;
        if self.stream.is_some() {
            self.state.active_lyric = sync::advance(self.position_ms(), &self.timeline, None);
        }
        true
    }

    pub fn apply_details(&mut self, ticket: LoadTicket, detail: SongDetail) -> bool {
        if !self.check_ticket(ticket, "details") {
            return false;
        }
        if let Some(track) = self.track.as_mut() {
            if track.name.is_empty() {
                track.name = detail.name.clone();
            }
            if track.artists.is_empty() {
                track.artists = detail.artist_names();
            }
        }
        self.details = Some(detail);
        true
    }

    /// Attach a resolved stream and start it, or fail with a reason that
    /// depends on the fee tier.
    pub async fn apply_stream(
        &mut self,
        ticket: LoadTicket,
        result: Result<StreamDescriptor, NotPlayable>,
    ) -> bool {
        if !self.check_ticket(ticket, "stream") {
            return false;
        }

        let descriptor = match result {
            Ok(d) => d,
            Err(np) => {
                tracing::warn!("{np}");
                self.release_output().await;
                self.phase = Phase::Failed(FailureReason::from_fee_tier(np.fee_tier));
                return true;
            }
        };

        if let Err(e) = self.start(&descriptor.url).await {
            tracing::warn!(track_id = ticket.track_id, "start playback: {e}");
            self.output_loaded = true;
            self.release_output().await;
            self.phase = Phase::Failed(FailureReason::PlaybackRejected(e.to_string()));
            return true;
        }
        tracing::info!(track_id = ticket.track_id, source = %descriptor.source, "stream attached");
        self.stream = Some(descriptor);
        self.output_loaded = true;
        true
    }

    async fn start(&self, url: &str) -> Result<(), PlaybackError> {
        self.audio.load(url).await?;
        self.audio.play().await
    }

    /// Unload whatever the backend still holds after a failed load.
    async fn release_output(&mut self) {
        if !self.output_loaded {
            return;
        }
        if let Err(e) = self.audio.stop().await {
            tracing::debug!("stop audio: {e}");
        }
        self.output_loaded = false;
        self.state.is_playing = false;
    }

    /// Ask the backend to flip play/pause. `is_playing` follows once the
    /// backend reports back.
    pub async fn toggle_play(&mut self) -> Result<(), PlaybackError> {
        if self.stream.is_none() && !self.output_loaded {
            return Ok(());
        }
        if self.state.is_playing {
            self.audio.pause().await
        } else {
            self.audio.play().await
        }
    }

    /// Seek to `fraction` of the duration. Returns `false` while the
    /// duration is still unknown.
    pub async fn seek(&mut self, fraction: f64) -> Result<bool, PlaybackError> {
        if self.stream.is_none() || self.state.duration_ms <= 0.0 || !fraction.is_finite() {
            return Ok(false);
        }
        let target_ms = fraction.clamp(0.0, 1.0) * self.state.duration_ms;
        self.audio.seek_to(target_ms / 1000.0).await?;
        self.state.position_ms = target_ms;
        self.state.active_lyric =
            sync::advance(self.position_ms(), &self.timeline, self.state.active_lyric);
        Ok(true)
    }

    pub async fn set_volume(&mut self, percent: u8) -> Result<(), PlaybackError> {
        let percent = percent.min(100);
        self.state.volume_percent = percent;
        if let Err(e) = self.store.set(storage::KEY_VOLUME, &percent.to_string()) {
            tracing::warn!("persist volume: {e:#}");
        }
        self.audio.set_volume(percent).await
    }

    pub async fn toggle_mute(&mut self) -> Result<(), PlaybackError> {
        self.state.is_muted = !self.state.is_muted;
        self.audio.set_muted(self.state.is_muted).await
    }

    /// Reload the current track after a failure the user chose to retry.
    pub fn retry(&mut self) -> Option<LoadTicket> {
        match &self.phase {
            Phase::Failed(reason) if reason.can_retry() => {
                let track = self.track.clone()?;
                Some(self.load_track(track))
            }
            _ => None,
        }
    }

    fn position_ms(&self) -> u64 {
        self.state.position_ms.max(0.0) as u64
    }

    /// Fold a backend signal into the state. Play/pause signals always set
    /// `is_playing`; other signals that arrive while no stream is attached
    /// belong to a superseded track and do not touch the phase, position
    /// or queue.
    pub fn on_audio_event(&mut self, ev: PlayerEvent) -> AudioOutcome {
        let attached = self.stream.is_some();
        match ev {
            PlayerEvent::Volume { percent } => {
                self.state.volume_percent = percent.round().clamp(0.0, 100.0) as u8;
            }
            PlayerEvent::Muted(m) => self.state.is_muted = m,
            PlayerEvent::Warning(msg) => {
                tracing::warn!("{msg}");
                return AudioOutcome::Warning(msg);
            }
            PlayerEvent::Started => {
                self.state.is_playing = true;
                if attached && matches!(self.phase, Phase::Loading | Phase::Paused) {
                    self.phase = Phase::Playing;
                }
            }
            PlayerEvent::Paused => {
                self.state.is_playing = false;
                if attached && matches!(self.phase, Phase::Loading | Phase::Playing) {
                    self.phase = Phase::Paused;
                }
            }
            PlayerEvent::Ended | PlayerEvent::Error(_) if !attached => {
                // The superseded file ran out before the new one arrived.
                self.output_loaded = false;
                self.state.is_playing = false;
            }
            _ if !attached => {
                tracing::trace!("audio event with no stream attached");
            }
            PlayerEvent::Position { seconds } => {
                self.state.position_ms = (seconds * 1000.0).max(0.0);
                let previous = self.state.active_lyric;
                let current = sync::advance(self.position_ms(), &self.timeline, previous);
                if current != previous {
                    self.state.active_lyric = current;
                    return AudioOutcome::LyricMoved(LyricChange { previous, current });
                }
            }
            PlayerEvent::Duration { seconds } => {
                self.state.duration_ms = (seconds * 1000.0).max(0.0);
            }
            PlayerEvent::Ended => {
                if matches!(self.phase, Phase::Failed(_) | Phase::Idle) {
                    return AudioOutcome::Nothing;
                }
                self.state.is_playing = false;
                self.stream = None;
                self.output_loaded = false;
                self.phase = Phase::Idle;
                return AudioOutcome::TrackEnded;
            }
            PlayerEvent::Error(msg) => {
                tracing::warn!("{msg}");
                self.state.is_playing = false;
                self.stream = None;
                self.output_loaded = false;
                self.phase = Phase::Failed(FailureReason::PlaybackRejected(msg.clone()));
                return AudioOutcome::Failed(msg);
            }
        }
        AudioOutcome::Nothing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::resolve::{QualityLevel, StreamSource};
    use crate::storage::{KeyValueStore, MemoryStore};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeAudio {
        calls: Mutex<Vec<String>>,
        reject_play: bool,
    }

    impl FakeAudio {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) -> Result<(), PlaybackError> {
            self.calls.lock().unwrap().push(call);
            Ok(())
        }
    }

    impl AudioOutput for FakeAudio {
        async fn load(&self, url: &str) -> Result<(), PlaybackError> {
            self.record(format!("load {url}"))
        }

        async fn play(&self) -> Result<(), PlaybackError> {
            if self.reject_play {
                return Err(PlaybackError::Unavailable);
            }
            self.record("play".into())
        }

        async fn pause(&self) -> Result<(), PlaybackError> {
            self.record("pause".into())
        }

        async fn stop(&self) -> Result<(), PlaybackError> {
            self.record("stop".into())
        }

        async fn seek_to(&self, seconds: f64) -> Result<(), PlaybackError> {
            self.record(format!("seek {seconds}"))
        }

        async fn set_volume(&self, percent: u8) -> Result<(), PlaybackError> {
            self.record(format!("volume {percent}"))
        }

        async fn set_muted(&self, muted: bool) -> Result<(), PlaybackError> {
            self.record(format!("mute {muted}"))
        }
    }

    fn controller(audio: FakeAudio) -> (PlaybackController<FakeAudio>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        (PlaybackController::new(audio, store.clone(), 80), store)
    }

    fn track(id: TrackId) -> TrackRef {
        TrackRef {
            id,
            name: format!("Track {id}"),
            artists: vec!["Artist".into()],
        }
    }

    fn descriptor(url: &str) -> StreamDescriptor {
        StreamDescriptor {
            url: url.into(),
            bitrate: 128_000,
            size_bytes: 4_000_000,
            checksum: None,
            quality: QualityLevel::Standard,
            source: StreamSource::Primary,
            is_restricted: false,
            original_fee_tier: 0,
        }
    }

    #[tokio::test]
    async fn load_resolve_play_and_follow_lyrics() {
        let (mut ctl, _) = controller(FakeAudio::default());
        let ticket = ctl.load_track(track(123));
        assert_eq!(ctl.phase(), &Phase::Loading);

        assert!(ctl.apply_lyrics(ticket, Some("[00:01.00]Hello\n[00:02.00]World")));
        assert!(ctl.apply_stream(ticket, Ok(descriptor("http://m7.music.126.net/123.mp3"))).await);
        assert_eq!(
            ctl.audio.calls(),
            vec!["load http://m7.music.126.net/123.mp3", "play"]
        );
        // Requests alone do not flip the playing flag
        assert!(!ctl.state().is_playing);

        ctl.on_audio_event(PlayerEvent::Duration { seconds: 200.0 });
        ctl.on_audio_event(PlayerEvent::Started);
        assert_eq!(ctl.phase(), &Phase::Playing);

        let moved = ctl.on_audio_event(PlayerEvent::Position { seconds: 1.5 });
        assert_eq!(
            moved,
            AudioOutcome::LyricMoved(LyricChange {
                previous: None,
                current: Some(0)
            })
        );
        ctl.on_audio_event(PlayerEvent::Position { seconds: 2.5 });

        let s = ctl.state();
        assert!(s.duration_ms > 0.0);
        assert!(s.is_playing);
        assert_eq!(s.current_track_id, Some(123));
        assert_eq!(s.active_lyric, Some(1));
        assert_eq!(ctl.active_line().map(|l| l.text.as_str()), Some("World"));
    }

    #[tokio::test]
    async fn stale_results_are_dropped() {
        let (mut ctl, _) = controller(FakeAudio::default());
        let old = ctl.load_track(track(1));
        let new = ctl.load_track(track(2));

        let mut old_detail: SongDetail = serde_json::from_value(serde_json::json!({
            "id": 1, "name": "Old", "fee": 0, "ar": [], "al": null, "dt": 1000
        }))
        .unwrap();
        assert!(!ctl.apply_lyrics(old, Some("[00:00.00]old")));
        assert!(!ctl.apply_details(old, old_detail.clone()));
        assert!(!ctl.apply_stream(old, Ok(descriptor("http://a/1.mp3"))).await);
        assert!(ctl.timeline().is_empty());
        assert!(ctl.details().is_none());
        assert_eq!(ctl.track().map(|t| t.name.as_str()), Some("Track 2"));

        old_detail.id = 2;
        assert!(ctl.apply_details(new, old_detail));
        assert!(ctl.details().is_some());
        assert!(ctl.audio.calls().is_empty());

        // Same id reloaded: the earlier ticket is still stale
        let again = ctl.load_track(track(2));
        assert!(!ctl.is_current(new));
        assert!(ctl.apply_stream(again, Ok(descriptor("http://a/2.mp3"))).await);
    }

    #[tokio::test]
    async fn not_playable_maps_to_tier_specific_failures() {
        let cases = [
            (FeeTier::Restricted, FailureReason::Restricted, true),
            (FeeTier::PayPerItem, FailureReason::PayPerItem, false),
            (FeeTier::Unknown(0), FailureReason::Unavailable, true),
        ];
        for (tier, reason, retry) in cases {
            let (mut ctl, _) = controller(FakeAudio::default());
            let t = ctl.load_track(track(5));
            let np = NotPlayable {
                track_id: 5,
                fee_tier: tier,
            };
            assert!(ctl.apply_stream(t, Err(np)).await);
            assert_eq!(ctl.phase(), &Phase::Failed(reason.clone()));
            assert_eq!(reason.can_retry(), retry);
            assert_eq!(ctl.retry().is_some(), retry);
        }
    }

    #[tokio::test]
    async fn rejected_play_fails_without_panicking() {
        let audio = FakeAudio {
            reject_play: true,
            ..FakeAudio::default()
        };
        let (mut ctl, _) = controller(audio);
        let t = ctl.load_track(track(9));
        ctl.apply_stream(t, Ok(descriptor("https://x/9.mp3"))).await;
        assert!(matches!(ctl.phase(), Phase::Failed(FailureReason::PlaybackRejected(_))));
        assert!(!ctl.state().is_playing);

        let retry = ctl.retry().unwrap();
        assert_eq!(retry.track_id, 9);
        assert_eq!(ctl.phase(), &Phase::Loading);
    }

    #[tokio::test]
    async fn seek_needs_a_known_duration() {
        let (mut ctl, _) = controller(FakeAudio::default());
        let t = ctl.load_track(track(3));
        ctl.apply_lyrics(t, Some("[00:10.00]a\n[01:00.00]b"));
        ctl.apply_stream(t, Ok(descriptor("http://a/3.mp3"))).await;

        assert!(!ctl.seek(0.5).await.unwrap());

        ctl.on_audio_event(PlayerEvent::Duration { seconds: 100.0 });
        ctl.on_audio_event(PlayerEvent::Position { seconds: 70.0 });
        assert_eq!(ctl.state().active_lyric, Some(1));

        assert!(ctl.seek(0.25).await.unwrap());
        assert_eq!(ctl.state().position_ms, 25_000.0);
        assert_eq!(ctl.state().active_lyric, Some(0));
        assert_eq!(ctl.audio.calls().last().map(String::as_str), Some("seek 25"));
    }

    #[tokio::test]
    async fn volume_is_persisted_and_restored() {
        let (mut ctl, store) = controller(FakeAudio::default());
        assert_eq!(ctl.state().volume_percent, 80);
        ctl.set_volume(130).await.unwrap();
        assert_eq!(ctl.state().volume_percent, 100);
        assert_eq!(store.get("volume").unwrap().as_deref(), Some("100"));

        ctl.set_volume(35).await.unwrap();
        let restored = PlaybackController::new(FakeAudio::default(), store, 80);
        assert_eq!(restored.state().volume_percent, 35);
    }

    #[tokio::test]
    async fn toggles_go_through_the_backend() {
        let (mut ctl, _) = controller(FakeAudio::default());
        // Nothing attached yet
        ctl.toggle_play().await.unwrap();
        assert!(ctl.audio.calls().is_empty());

        let t = ctl.load_track(track(4));
        ctl.apply_stream(t, Ok(descriptor("http://a/4.mp3"))).await;
        ctl.on_audio_event(PlayerEvent::Started);
        ctl.toggle_play().await.unwrap();
        assert_eq!(ctl.audio.calls().last().map(String::as_str), Some("pause"));
        assert!(ctl.state().is_playing);
        ctl.on_audio_event(PlayerEvent::Paused);
        assert_eq!(ctl.phase(), &Phase::Paused);

        ctl.toggle_mute().await.unwrap();
        assert!(ctl.state().is_muted);
        assert_eq!(ctl.audio.calls().last().map(String::as_str), Some("mute true"));
    }

    #[tokio::test]
    async fn end_of_track_is_reported_once() {
        let (mut ctl, _) = controller(FakeAudio::default());
        let t = ctl.load_track(track(6));
        ctl.apply_stream(t, Ok(descriptor("http://a/6.mp3"))).await;
        ctl.on_audio_event(PlayerEvent::Started);

        assert_eq!(ctl.on_audio_event(PlayerEvent::Ended), AudioOutcome::TrackEnded);
        assert_eq!(ctl.on_audio_event(PlayerEvent::Ended), AudioOutcome::Nothing);
        assert_eq!(ctl.phase(), &Phase::Idle);
        assert!(!ctl.state().is_playing);
    }

    #[tokio::test]
    async fn failed_load_stops_the_previous_track() {
        let (mut ctl, _) = controller(FakeAudio::default());
        let first = ctl.load_track(track(1));
        ctl.apply_stream(first, Ok(descriptor("http://a/1.mp3"))).await;
        ctl.on_audio_event(PlayerEvent::Started);

        let second = ctl.load_track(track(2));
        let np = NotPlayable {
            track_id: 2,
            fee_tier: FeeTier::PayPerItem,
        };
        ctl.apply_stream(second, Err(np)).await;
        assert_eq!(ctl.audio.calls(), vec!["load http://a/1.mp3", "play", "stop"]);
        assert!(!ctl.state().is_playing);
        assert_eq!(ctl.phase(), &Phase::Failed(FailureReason::PayPerItem));

        // Nothing left to toggle
        ctl.toggle_play().await.unwrap();
        assert_eq!(ctl.audio.calls().len(), 3);
    }

    #[tokio::test]
    async fn superseded_track_stays_controllable_while_loading() {
        let (mut ctl, _) = controller(FakeAudio::default());
        let first = ctl.load_track(track(1));
        ctl.apply_stream(first, Ok(descriptor("http://a/1.mp3"))).await;
        ctl.on_audio_event(PlayerEvent::Started);

        ctl.load_track(track(2));
        ctl.on_audio_event(PlayerEvent::Started);
        assert!(ctl.state().is_playing);
        ctl.toggle_play().await.unwrap();
        assert_eq!(ctl.audio.calls().last().map(String::as_str), Some("pause"));

        // Its end does not advance the queue past the pending load
        assert_eq!(ctl.on_audio_event(PlayerEvent::Ended), AudioOutcome::Nothing);
        assert!(!ctl.state().is_playing);
        assert_eq!(ctl.phase(), &Phase::Loading);
    }

    #[test]
    fn events_without_a_stream_only_touch_mirrors() {
        let (mut ctl, _) = controller(FakeAudio::default());
        ctl.load_track(track(8));
        ctl.on_audio_event(PlayerEvent::Started);
        ctl.on_audio_event(PlayerEvent::Position { seconds: 12.0 });
        ctl.on_audio_event(PlayerEvent::Volume { percent: 42.4 });
        // The backend is authoritative for the playing flag
        assert!(ctl.state().is_playing);
        assert_eq!(ctl.state().position_ms, 0.0);
        assert_eq!(ctl.state().volume_percent, 42);
        assert_eq!(ctl.phase(), &Phase::Loading);
    }
}
