use crate::api::models::SongDetail;
use crate::api::resolve::{NotPlayable, StreamDescriptor};
use crate::player::LoadTicket;

pub use crate::player::PlayerEvent;

#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    Player(PlayerEvent),
    Network(NetworkEvent),
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(crossterm::event::KeyEvent),
    Resize,
}

/// Results of the per-track sub-requests, tagged with the load they belong to.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    LyricsLoaded {
        ticket: LoadTicket,
        lyrics: Option<String>,
    },
    DetailsLoaded {
        ticket: LoadTicket,
        detail: SongDetail,
    },
    StreamResolved {
        ticket: LoadTicket,
        result: Result<StreamDescriptor, NotPlayable>,
    },
}
