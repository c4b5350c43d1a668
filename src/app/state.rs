use super::config::{PlaybackConfig, UserConfig};
use super::keys::KeyConfig;
use crate::player::{PlaybackState, PlayerEvent, QueueItem, StatusSnapshot};
use crate::ui::Theme;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub start_time: Instant,
    pub deadline: Instant,
}

/// Everything the UI draws, mirrored from the player's events 🎧
pub struct App {
    pub is_running: bool,
    pub theme: Theme,
    pub keys: KeyConfig,
    pub playback: PlaybackConfig,

    pub state: PlaybackState,
    pub track: Option<QueueItem>,
    pub status: StatusSnapshot,

    pub queue: Vec<QueueItem>,
    pub cursor: usize,

    pub show_keyhints: bool,
    pub toast: Option<Toast>,
}

impl App {
    pub fn new(config: &UserConfig) -> Self {
        Self {
            is_running: true,
            theme: Theme::default(),
            keys: config.keys.clone(),
            playback: config.playback.clone(),
            state: PlaybackState::Stopped,
            track: None,
            status: StatusSnapshot::default(),
            queue: Vec::new(),
            cursor: 0,
            show_keyhints: false,
            toast: None,
        }
    }

    pub fn apply_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Stopped => {
                self.state = PlaybackState::Stopped;
                self.track = None;
                self.status.position = 0.0;
            }
            PlayerEvent::Playing(track) | PlayerEvent::Unpaused(track) => {
                self.state = PlaybackState::Playing;
                self.track = track;
            }
            PlayerEvent::Paused(track) => {
                self.state = PlaybackState::Paused;
                self.track = track;
            }
            PlayerEvent::StatusUpdate(status) => self.status = status,
        }
    }

    /// Replace the mirrored queue, keeping the cursor in range.
    pub fn sync_queue(&mut self, queue: Vec<QueueItem>) {
        self.queue = queue;
        self.cursor = self.cursor.min(self.queue.len().saturating_sub(1));
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.queue.len() {
            self.cursor += 1;
        }
    }

    pub fn selected(&self) -> Option<&QueueItem> {
        self.queue.get(self.cursor)
    }

    pub fn show_toast(&mut self, message: &str) {
        let now = Instant::now();
        let deadline = now + Duration::from_millis(2000);

        // Rapid updates keep the entrance time so the toast doesn't flash
        if let Some(ref mut current) = self.toast {
            current.message = message.to_string();
            current.deadline = deadline;
        } else {
            self.toast = Some(Toast {
                message: message.to_string(),
                start_time: now,
                deadline,
            });
        }
    }

    /// Called every tick to update state
    pub fn on_tick(&mut self) {
        if let Some(ref toast) = self.toast {
            if Instant::now() > toast.deadline {
                self.toast = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> QueueItem {
        QueueItem {
            id: id.to_string(),
            title: id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_player_events_drive_state() {
        let mut app = App::new(&UserConfig::default());

        app.apply_player_event(PlayerEvent::Playing(Some(item("a"))));
        assert_eq!(app.state, PlaybackState::Playing);
        assert_eq!(app.track.as_ref().map(|t| t.id.as_str()), Some("a"));

        app.apply_player_event(PlayerEvent::Paused(Some(item("a"))));
        assert_eq!(app.state, PlaybackState::Paused);

        app.apply_player_event(PlayerEvent::StatusUpdate(StatusSnapshot {
            volume: 40,
            position: 3.0,
            duration: 200.0,
        }));
        assert_eq!(app.status.volume, 40);

        app.apply_player_event(PlayerEvent::Stopped);
        assert_eq!(app.state, PlaybackState::Stopped);
        assert!(app.track.is_none());
        assert_eq!(app.status.volume, 40);
    }

    #[test]
    fn test_cursor_stays_in_range() {
        let mut app = App::new(&UserConfig::default());
        app.sync_queue(vec![item("a"), item("b"), item("c")]);
        app.cursor_down();
        app.cursor_down();
        app.cursor_down();
        assert_eq!(app.cursor, 2);

        app.sync_queue(vec![item("a")]);
        assert_eq!(app.cursor, 0);
        app.cursor_up();
        assert_eq!(app.selected().map(|i| i.id.as_str()), Some("a"));

        app.sync_queue(Vec::new());
        assert!(app.selected().is_none());
    }

    #[test]
    fn test_toast_expires() {
        let mut app = App::new(&UserConfig::default());
        app.show_toast("Queue cleared");
        app.on_tick();
        assert!(app.toast.is_some());

        if let Some(toast) = app.toast.as_mut() {
            toast.deadline = Instant::now() - Duration::from_millis(1);
        }
        app.on_tick();
        assert!(app.toast.is_none());
    }
}
