//! Song id -> playable stream URL.
//!
//! Resolution walks a fixed chain of endpoints and stops at the first one
//! that yields a usable URL:
//!
//! 1. `/song/detail` for the fee tier
//! 2. `/song/url/match` first, for subscription-only tracks
//! 3. `/song/url/v1` at the configured quality level
//! 4. `/song/url` at a reduced bitrate
//! 5. `/song/url/match` as a last resort for everything else

use crate::api::client::{ApiError, MusicApi};
use crate::api::models::{FeeTier, MatchResponse, SongUrl, SongUrlResponse, TrackId};
use serde::Serialize;
use std::fmt;

const LEGACY_BITRATE: u32 = 128_000;

/// Substrings that mark a URL the server hands out instead of real audio.
const UNAVAILABLE_SENTINELS: &[&str] = &["该资源暂时无法播放", "unavailable"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamSource {
    Primary,
    Legacy,
    Unblock,
    UnblockFallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    Standard,
    Higher,
    Exhigh,
    Lossless,
    Hires,
    Other(String),
}

impl QualityLevel {
    pub fn parse(s: &str) -> Self {
        match s {
            "standard" => QualityLevel::Standard,
            "higher" => QualityLevel::Higher,
            "exhigh" => QualityLevel::Exhigh,
            "lossless" => QualityLevel::Lossless,
            "hires" => QualityLevel::Hires,
            other => QualityLevel::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            QualityLevel::Standard => "standard",
            QualityLevel::Higher => "higher",
            QualityLevel::Exhigh => "exhigh",
            QualityLevel::Lossless => "lossless",
            QualityLevel::Hires => "hires",
            QualityLevel::Other(s) => s,
        }
    }
}

impl fmt::Display for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StreamSource::Primary => "primary",
            StreamSource::Legacy => "legacy",
            StreamSource::Unblock => "unblock",
            StreamSource::UnblockFallback => "unblock_fallback",
        })
    }
}

/// A resolved, playable stream. Consumed by the audio backend; never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamDescriptor {
    pub url: String,
    pub bitrate: u32,
    pub size_bytes: u64,
    pub checksum: Option<String>,
    pub quality: QualityLevel,
    pub source: StreamSource,
    pub is_restricted: bool,
    pub original_fee_tier: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("track {track_id} is not playable ({fee_tier})")]
pub struct NotPlayable {
    pub track_id: TrackId,
    pub fee_tier: FeeTier,
}

/// Accepts `http(s)://` URLs that carry none of the sentinel markers.
pub fn is_playable_url(url: &str) -> bool {
    (url.starts_with("http://") || url.starts_with("https://"))
        && !UNAVAILABLE_SENTINELS.iter().any(|s| url.contains(s))
}

#[derive(Debug, Clone)]
pub struct StreamResolver<C> {
    api: C,
    quality: QualityLevel,
}

impl<C: MusicApi> StreamResolver<C> {
    pub fn new(api: C, quality: QualityLevel) -> Self {
        Self { api, quality }
    }

    pub async fn resolve(&self, track_id: TrackId) -> Result<StreamDescriptor, NotPlayable> {
        let fee_tier = self.fee_tier(track_id).await;
        let restricted = fee_tier.is_restricted();

        if restricted
            && let Some(d) = self
                .try_unblock(track_id, StreamSource::Unblock, fee_tier)
                .await
        {
            return Ok(d);
        }

        if let Some(d) = self.try_primary(track_id, fee_tier).await {
            return Ok(d);
        }

        if let Some(d) = self.try_legacy(track_id, fee_tier).await {
            return Ok(d);
        }

        if !restricted
            && let Some(d) = self
                .try_unblock(track_id, StreamSource::UnblockFallback, fee_tier)
                .await
        {
            return Ok(d);
        }

        tracing::warn!(track_id, %fee_tier, "every stream source failed");
        Err(NotPlayable { track_id, fee_tier })
    }

    async fn fee_tier(&self, track_id: TrackId) -> FeeTier {
        match super::song_detail(&self.api, track_id).await {
            Ok(detail) => detail.map(|s| s.fee_tier()).unwrap_or(FeeTier::Unknown(0)),
            Err(e) => {
                tracing::debug!(track_id, "song detail failed, assuming free: {e}");
                FeeTier::Unknown(0)
            }
        }
    }

    async fn try_unblock(
        &self,
        track_id: TrackId,
        source: StreamSource,
        fee_tier: FeeTier,
    ) -> Option<StreamDescriptor> {
        let resp = self
            .api
            .get("/song/url/match", &[("id", track_id.to_string())])
            .await
            .and_then(|v| serde_json::from_value::<MatchResponse>(v).map_err(ApiError::from));
        let song = match resp {
            Ok(r) => r.data?.into_song_url(),
            Err(e) => {
                tracing::debug!(track_id, %source, "unblock failed: {e}");
                return None;
            }
        };
        let is_restricted = source == StreamSource::Unblock;
        accept(song, QualityLevel::Standard, source, is_restricted, fee_tier)
    }

    async fn try_primary(&self, track_id: TrackId, fee_tier: FeeTier) -> Option<StreamDescriptor> {
        let params = [
            ("id", track_id.to_string()),
            ("level", self.quality.as_str().to_string()),
        ];
        let song = self.fetch_song_url("/song/url/v1", &params, track_id).await?;
        let quality = song
            .level
            .as_deref()
            .map(QualityLevel::parse)
            .unwrap_or_else(|| self.quality.clone());
        accept(
            song,
            quality,
            StreamSource::Primary,
            fee_tier.is_restricted(),
            fee_tier,
        )
    }

    async fn try_legacy(&self, track_id: TrackId, fee_tier: FeeTier) -> Option<StreamDescriptor> {
        let params = [
            ("id", track_id.to_string()),
            ("br", LEGACY_BITRATE.to_string()),
        ];
        let song = self.fetch_song_url("/song/url", &params, track_id).await?;
        accept(
            song,
            QualityLevel::Standard,
            StreamSource::Legacy,
            fee_tier.is_restricted(),
            fee_tier,
        )
    }

    async fn fetch_song_url(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        track_id: TrackId,
    ) -> Option<SongUrl> {
        let resp = self
            .api
            .get(endpoint, params)
            .await
            .and_then(|v| serde_json::from_value::<SongUrlResponse>(v).map_err(ApiError::from));
        match resp {
            Ok(r) => r.data?.into_first(),
            Err(e) => {
                tracing::debug!(track_id, endpoint, "song url failed: {e}");
                None
            }
        }
    }
}

fn accept(
    song: SongUrl,
    quality: QualityLevel,
    source: StreamSource,
    is_restricted: bool,
    fee_tier: FeeTier,
) -> Option<StreamDescriptor> {
    let url = song.url?;
    if !is_playable_url(&url) {
        tracing::debug!(%source, "rejected stream url");
        return None;
    }
    tracing::info!(%source, bitrate = song.br, "resolved stream");
    Some(StreamDescriptor {
        url,
        bitrate: song.br,
        size_bytes: song.size,
        checksum: song.md5.filter(|m| !m.is_empty()),
        quality,
        source,
        is_restricted,
        original_fee_tier: fee_tier.code(),
    })
}
