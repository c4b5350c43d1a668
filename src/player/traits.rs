use super::observer::{Callback, SongCallback};
use super::queue::QueueItem;
use crate::error::Result;

/// Read-only view of a track handed to remote surfaces.
pub trait TrackInterface {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn artist(&self) -> &str;
    fn album(&self) -> &str;
    fn album_artist(&self) -> &str;
    /// Seconds
    fn duration(&self) -> u32;
    fn track_number(&self) -> u32;
    fn disc_number(&self) -> u32;
    fn is_valid(&self) -> bool;
}

impl TrackInterface for QueueItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn artist(&self) -> &str {
        &self.artist
    }

    fn album(&self) -> &str {
        &self.album
    }

    // The catalog does not track album artists separately
    fn album_artist(&self) -> &str {
        &self.artist
    }

    fn duration(&self) -> u32 {
        self.duration
    }

    fn track_number(&self) -> u32 {
        self.track_number
    }

    fn disc_number(&self) -> u32 {
        self.disc_number
    }

    fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.locator.is_empty()
    }
}

/// The player as seen by the UI and every remote control surface 🎵
///
/// Callbacks registered through the `on_*` methods run on the player's
/// event thread, in registration order. They must return quickly; anything
/// slow belongs on the observer's own thread.
pub trait ControlledPlayer: Send + Sync {
    /// Replace the queue with `item` and play it.
    fn play(&self, item: QueueItem) -> Result<()>;
    /// Toggle pause, or start the head when stopped.
    fn pause(&self) -> Result<()>;
    fn stop(&self) -> Result<()>;
    fn play_next_track(&self) -> Result<()>;
    fn previous_track(&self) -> Result<()>;
    fn seek_absolute(&self, seconds: f64) -> Result<()>;
    fn seek_relative(&self, delta_seconds: f64) -> Result<()>;
    fn set_volume(&self, percent: i64) -> Result<()>;
    fn adjust_volume(&self, delta: i64) -> Result<()>;

    fn volume(&self) -> u8;
    fn is_paused(&self) -> bool;
    fn is_playing(&self) -> bool;
    fn is_seeking(&self) -> bool;
    /// Elapsed seconds of the current track
    fn time_pos(&self) -> f64;
    fn current_track(&self) -> Option<QueueItem>;

    fn on_playing(&self, cb: Callback);
    fn on_paused(&self, cb: Callback);
    fn on_stopped(&self, cb: Callback);
    fn on_seek(&self, cb: Callback);
    fn on_song_change(&self, cb: SongCallback);

    /// Start or unpause; no-op while already playing.
    fn resume(&self) -> Result<()> {
        if self.is_playing() {
            Ok(())
        } else {
            self.pause()
        }
    }

    /// Pause if playing; no-op otherwise.
    fn hold(&self) -> Result<()> {
        if self.is_playing() {
            self.pause()
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_interface_validity() {
        let item = QueueItem {
            id: "tr-1".to_string(),
            locator: "http://music.test/rest/stream?id=tr-1".to_string(),
            title: "Song".to_string(),
            artist: "Band".to_string(),
            duration: 210,
            ..Default::default()
        };
        let track: &dyn TrackInterface = &item;
        assert!(track.is_valid());
        assert_eq!(track.album_artist(), "Band");
        assert_eq!(track.duration(), 210);

        let blank = QueueItem::default();
        assert!(!TrackInterface::is_valid(&blank));
    }
}
