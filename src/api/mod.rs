pub mod client;
pub mod models;
pub mod resolve;

pub use client::{ApiError, MusicApi, NcmClient};
pub use models::{SongDetail, TrackId};
pub use resolve::StreamResolver;

use models::SongDetailResponse;

/// `/song/detail` for a single id; `None` when the service knows no such song.
pub async fn song_detail<C: MusicApi>(api: &C, track_id: TrackId) -> Result<Option<SongDetail>, ApiError> {
    let v = api.get("/song/detail", &[("ids", track_id.to_string())]).await?;
    let resp: SongDetailResponse = serde_json::from_value(v)?;
    Ok(resp.songs.into_iter().next())
}
