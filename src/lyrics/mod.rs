//! Lyrics: LRC parsing, playback synchronisation and the `/lyric` fetch.

pub mod parser;
pub mod sync;

use crate::api::client::{ApiError, MusicApi};
use crate::api::models::{LyricResponse, TrackId};

pub use parser::{LyricLine, LyricTimeline};
pub use sync::LyricChange;

/// Raw LRC text for a track, `None` when the track has no synced lyrics.
pub async fn fetch_lyrics<C: MusicApi>(api: &C, track_id: TrackId) -> Result<Option<String>, ApiError> {
    let v = api.get("/lyric", &[("id", track_id.to_string())]).await?;
    let resp: LyricResponse = serde_json::from_value(v)?;
    Ok(resp
        .lrc
        .and_then(|l| l.lyric)
        .filter(|raw| !raw.trim().is_empty()))
}
