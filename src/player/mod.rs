pub mod controller;
pub mod mpv;

use std::future::Future;

pub use controller::{
    AudioOutcome, FailureReason, LoadTicket, Phase, PlaybackController, PlaybackState,
};

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("audio backend is not running")]
    Unavailable,

    #[error("audio backend ipc: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode audio backend command: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Signals reported by the audio backend. These are authoritative for
/// `is_playing`, volume and mute; the controller's own requests are not.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Started,
    Paused,
    Position { seconds: f64 },
    Duration { seconds: f64 },
    Volume { percent: f64 },
    Muted(bool),
    Ended,
    Error(String),
    Warning(String),
}

/// The playable-media primitive the controller drives. Every call is a
/// request; the outcome arrives later as a [`PlayerEvent`].
pub trait AudioOutput: Send + Sync {
    fn load(&self, url: &str) -> impl Future<Output = Result<(), PlaybackError>> + Send;

    fn play(&self) -> impl Future<Output = Result<(), PlaybackError>> + Send;

    fn pause(&self) -> impl Future<Output = Result<(), PlaybackError>> + Send;

    /// Unload whatever is playing.
    fn stop(&self) -> impl Future<Output = Result<(), PlaybackError>> + Send;

    /// Absolute position in seconds.
    fn seek_to(&self, seconds: f64) -> impl Future<Output = Result<(), PlaybackError>> + Send;

    fn set_volume(&self, percent: u8) -> impl Future<Output = Result<(), PlaybackError>> + Send;

    fn set_muted(&self, muted: bool) -> impl Future<Output = Result<(), PlaybackError>> + Send;
}

/// A backend that failed to start; every request reports `Unavailable`.
impl<A: AudioOutput> AudioOutput for Option<A> {
    async fn load(&self, url: &str) -> Result<(), PlaybackError> {
        match self {
            Some(a) => a.load(url).await,
            None => Err(PlaybackError::Unavailable),
        }
    }

    async fn play(&self) -> Result<(), PlaybackError> {
        match self {
            Some(a) => a.play().await,
            None => Err(PlaybackError::Unavailable),
        }
    }

    async fn pause(&self) -> Result<(), PlaybackError> {
        match self {
            Some(a) => a.pause().await,
            None => Err(PlaybackError::Unavailable),
        }
    }

    async fn stop(&self) -> Result<(), PlaybackError> {
        match self {
            Some(a) => a.stop().await,
            None => Err(PlaybackError::Unavailable),
        }
    }

    async fn seek_to(&self, seconds: f64) -> Result<(), PlaybackError> {
        match self {
            Some(a) => a.seek_to(seconds).await,
            None => Err(PlaybackError::Unavailable),
        }
    }

    async fn set_volume(&self, percent: u8) -> Result<(), PlaybackError> {
        match self {
            Some(a) => a.set_volume(percent).await,
            None => Err(PlaybackError::Unavailable),
        }
    }

    async fn set_muted(&self, muted: bool) -> Result<(), PlaybackError> {
        match self {
            Some(a) => a.set_muted(muted).await,
            None => Err(PlaybackError::Unavailable),
        }
    }
}
