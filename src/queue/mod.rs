use crate::api::models::TrackRef;
use crate::player::{AudioOutput, LoadTicket, PlaybackController};
use crate::storage::{self, SharedStore};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Persisted form of the queue, stored as JSON under the `queue` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub tracks: Vec<TrackRef>,
    pub current_index: Option<usize>,
}

/// Ordered tracks plus a pointer to the one playing. Every mutation is
/// written through to the store; the in-memory copy stays authoritative.
pub struct Queue {
    tracks: Vec<TrackRef>,
    current_index: Option<usize>,
    store: SharedStore,
}

impl Queue {
    pub fn new(store: SharedStore) -> Self {
        Self {
            tracks: Vec::new(),
            current_index: None,
            store,
        }
    }

    /// Load the last saved queue. Missing or unreadable data gives an empty
    /// queue; a saved index past the end is dropped.
    pub fn restore(store: SharedStore) -> Self {
        let snapshot = match store.get(storage::KEY_QUEUE) {
            Ok(Some(raw)) => serde_json::from_str::<QueueSnapshot>(&raw).unwrap_or_else(|e| {
                tracing::warn!("discarding unreadable saved queue: {e}");
                QueueSnapshot::default()
            }),
            Ok(None) => QueueSnapshot::default(),
            Err(e) => {
                tracing::warn!("read saved queue: {e:#}");
                QueueSnapshot::default()
            }
        };
        let current_index = snapshot.current_index.filter(|&i| i < snapshot.tracks.len());
        Self {
            tracks: snapshot.tracks,
            current_index,
            store,
        }
    }

    pub fn to_snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            tracks: self.tracks.clone(),
            current_index: self.current_index,
        }
    }

    fn persist(&self) {
        let raw = match serde_json::to_string(&self.to_snapshot()) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("encode queue: {e}");
                return;
            }
        };
        if let Err(e) = self.store.set(storage::KEY_QUEUE, &raw) {
            tracing::warn!("persist queue: {e:#}");
        }
    }

    pub fn append(&mut self, track: TrackRef) {
        self.tracks.push(track);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current_index = None;
        self.persist();
    }

    /// Remove the track at `index`, keeping the pointer on the same track
    /// when possible, otherwise on the entry that slid into its place.
    pub fn remove(&mut self, index: usize) -> Option<TrackRef> {
        if index >= self.tracks.len() {
            return None;
        }

        let track = self.tracks.remove(index);

        if let Some(current) = self.current_index {
            if index < current {
                self.current_index = Some(current - 1);
            } else if index == current {
                if self.tracks.is_empty() {
                    self.current_index = None;
                } else if current >= self.tracks.len() {
                    self.current_index = Some(self.tracks.len() - 1);
                }
            }
        }

        self.persist();
        Some(track)
    }

    /// Make `index` current and start loading it. Out of range is a no-op.
    pub fn play_at<A: AudioOutput>(
        &mut self,
        index: usize,
        controller: &mut PlaybackController<A>,
    ) -> Option<LoadTicket> {
        let track = self.tracks.get(index)?.clone();
        self.current_index = Some(index);
        self.persist();
        Some(controller.load_track(track))
    }

    /// Step forward. At the last track this stays put unless
    /// `loop_playlist` is set, in which case it wraps to the first.
    pub fn play_next<A: AudioOutput>(
        &mut self,
        loop_playlist: bool,
        controller: &mut PlaybackController<A>,
    ) -> Option<LoadTicket> {
        let next = match self.current_index {
            None => 0,
            Some(i) if i + 1 < self.tracks.len() => i + 1,
            Some(_) if loop_playlist => 0,
            Some(_) => return None,
        };
        self.play_at(next, controller)
    }

    /// Step back; the first track is a floor.
    pub fn play_previous<A: AudioOutput>(
        &mut self,
        controller: &mut PlaybackController<A>,
    ) -> Option<LoadTicket> {
        let prev = self.current_index?.checked_sub(1)?;
        self.play_at(prev, controller)
    }

    /// Play a uniformly random entry. A single-track queue picks itself.
    pub fn shuffle_pick<A: AudioOutput>(
        &mut self,
        controller: &mut PlaybackController<A>,
    ) -> Option<LoadTicket> {
        if self.tracks.is_empty() {
            return None;
        }
        let index = rand::rng().random_range(0..self.tracks.len());
        self.play_at(index, controller)
    }

    pub fn current_track(&self) -> Option<&TrackRef> {
        self.current_index.and_then(|i| self.tracks.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn tracks(&self) -> &[TrackRef] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlaybackError;
    use crate::storage::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    struct NullAudio;

    impl AudioOutput for NullAudio {
        async fn load(&self, _url: &str) -> Result<(), PlaybackError> {
            Ok(())
        }
        async fn play(&self) -> Result<(), PlaybackError> {
            Ok(())
        }
        async fn pause(&self) -> Result<(), PlaybackError> {
            Ok(())
        }
        async fn stop(&self) -> Result<(), PlaybackError> {
            Ok(())
        }
        async fn seek_to(&self, _seconds: f64) -> Result<(), PlaybackError> {
            Ok(())
        }
        async fn set_volume(&self, _percent: u8) -> Result<(), PlaybackError> {
            Ok(())
        }
        async fn set_muted(&self, _muted: bool) -> Result<(), PlaybackError> {
            Ok(())
        }
    }

    fn make_track(id: u64) -> TrackRef {
        TrackRef {
            id,
            name: format!("Track {id}"),
            artists: vec!["Artist".to_string()],
        }
    }

    fn setup(n: u64) -> (Queue, PlaybackController<NullAudio>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let mut queue = Queue::new(store.clone());
        for id in 1..=n {
            queue.append(make_track(id));
        }
        let ctl = PlaybackController::new(NullAudio, store.clone(), 80);
        (queue, ctl, store)
    }

    #[test]
    fn test_append_and_len() {
        let (mut queue, _, _) = setup(0);
        assert!(queue.is_empty());
        queue.append(make_track(1));
        queue.append(make_track(2));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.current_index(), None);
    }

    #[test]
    fn next_clamps_at_the_end_without_loop() {
        let (mut queue, mut ctl, _) = setup(3);
        queue.play_at(2, &mut ctl);

        assert!(queue.play_next(false, &mut ctl).is_none());
        assert_eq!(queue.current_index(), Some(2));

        let ticket = queue.play_next(true, &mut ctl).unwrap();
        assert_eq!(queue.current_index(), Some(0));
        assert_eq!(ticket.track_id, 1);
        assert_eq!(ctl.state().current_track_id, Some(1));
    }

    #[test]
    fn previous_clamps_at_the_start() {
        let (mut queue, mut ctl, _) = setup(3);
        assert!(queue.play_previous(&mut ctl).is_none());

        queue.play_at(1, &mut ctl);
        assert_eq!(queue.play_previous(&mut ctl).map(|t| t.track_id), Some(1));
        assert!(queue.play_previous(&mut ctl).is_none());
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn next_from_nothing_starts_at_the_top() {
        let (mut queue, mut ctl, _) = setup(2);
        assert_eq!(queue.play_next(false, &mut ctl).map(|t| t.track_id), Some(1));
    }

    #[test]
    fn play_at_out_of_range_is_a_no_op() {
        let (mut queue, mut ctl, _) = setup(2);
        queue.play_at(1, &mut ctl);
        assert!(queue.play_at(5, &mut ctl).is_none());
        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(ctl.state().current_track_id, Some(2));
    }

    #[test]
    fn shuffle_pick_single_and_many() {
        let (mut queue, mut ctl, _) = setup(1);
        assert_eq!(queue.shuffle_pick(&mut ctl).map(|t| t.track_id), Some(1));

        let (mut queue, mut ctl, _) = setup(3);
        let mut seen = [false; 3];
        for _ in 0..300 {
            queue.shuffle_pick(&mut ctl);
            seen[queue.current_index().unwrap()] = true;
        }
        assert_eq!(seen, [true; 3]);

        let (mut empty, mut ctl, _) = setup(0);
        assert!(empty.shuffle_pick(&mut ctl).is_none());
    }

    #[test]
    fn test_remove() {
        let (mut queue, mut ctl, _) = setup(3);
        queue.play_at(1, &mut ctl);

        queue.remove(0);
        assert_eq!(queue.current_index(), Some(0));
        assert_eq!(queue.current_track().unwrap().id, 2);

        // Removing the current last entry moves the pointer back
        queue.play_at(1, &mut ctl);
        queue.remove(1);
        assert_eq!(queue.current_index(), Some(0));
        queue.remove(0);
        assert_eq!(queue.current_index(), None);
        assert!(queue.remove(3).is_none());
    }

    #[test]
    fn every_mutation_is_saved_and_restored() {
        let (mut queue, mut ctl, store) = setup(3);
        queue.play_at(2, &mut ctl);
        let restored = Queue::restore(store.clone());
        assert_eq!(restored.to_snapshot(), queue.to_snapshot());
        assert_eq!(restored.current_track().map(|t| t.id), Some(3));

        queue.clear();
        assert!(Queue::restore(store).is_empty());
    }

    #[test]
    fn restore_tolerates_bad_data() {
        let store = Arc::new(MemoryStore::default());
        store.set("queue", "{not json").unwrap();
        assert!(Queue::restore(store.clone()).is_empty());

        store
            .set("queue", r#"{"tracks":[{"id":7,"name":"x","artists":[]}],"current_index":4}"#)
            .unwrap();
        let q = Queue::restore(store);
        assert_eq!(q.len(), 1);
        assert_eq!(q.current_index(), None);
    }
}
