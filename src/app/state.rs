use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
            created_at: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
            created_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > Duration::from_secs(4)
    }
}

/// Cursor over the queue panel, independent of what is playing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCursor {
    pub selected: usize,
    pub scroll_offset: usize,
}

impl ListCursor {
    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Keep `selected` inside a list that may have shrunk.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected - visible_height + 1;
        }
    }
}

/// UI-only state. Playback and queue state live in their own owners.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub should_quit: bool,
    pub show_help: bool,
    pub queue_list: ListCursor,
    pub loop_playlist: bool,
    /// The held session was rejected and has already been reported.
    pub session_expired: bool,
    pub toast: Option<Toast>,
    pub status: String,
}

impl AppState {
    pub fn new(loop_playlist: bool, selected: usize) -> Self {
        Self {
            loop_playlist,
            queue_list: ListCursor {
                selected,
                scroll_offset: 0,
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_stays_in_bounds() {
        let mut c = ListCursor::default();
        c.select_prev();
        assert_eq!(c.selected, 0);
        c.select_next(0);
        assert_eq!(c.selected, 0);
        c.select_next(3);
        c.select_next(3);
        c.select_next(3);
        assert_eq!(c.selected, 2);
        c.clamp(1);
        assert_eq!(c.selected, 0);
    }

    #[test]
    fn scroll_follows_selection() {
        let mut c = ListCursor::default();
        c.select_last(30);
        c.update_scroll(10);
        assert_eq!(c.scroll_offset, 20);
        c.selected = 5;
        c.update_scroll(10);
        assert_eq!(c.scroll_offset, 5);
    }
}
