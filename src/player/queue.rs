//! Play queue.
//!
//! Insertion order is playback order and index 0 is the head: the track the
//! engine has loaded (or is about to load) whenever playback is not stopped.
//! Bad indices are treated as UI races, so they are logged and ignored
//! instead of being reported as errors.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One enqueued track. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: String,
    /// URI or path handed to the engine's `load`
    pub locator: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Track length in seconds
    pub duration: u32,
    pub track_number: u32,
    pub disc_number: u32,
    pub cover_art: String,
    pub year: u32,
}

impl QueueItem {
    /// Minimal item for a bare locator (URL or file), titled after its last path segment.
    pub fn from_locator(locator: &str) -> Self {
        let title = locator
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(locator);
        let title = title
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .filter(|stem| !stem.is_empty())
            .unwrap_or(title);

        Self {
            id: locator.to_string(),
            locator: locator.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Queue {
    items: Vec<QueueItem>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The head, i.e. the current track.
    pub fn head(&self) -> Option<&QueueItem> {
        self.items.first()
    }

    pub fn get(&self, index: usize) -> Option<&QueueItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueItem> {
        self.items.iter()
    }

    pub fn to_vec(&self) -> Vec<QueueItem> {
        self.items.clone()
    }

    pub fn append(&mut self, item: QueueItem) {
        self.items.push(item);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drop everything and make `item` the only entry.
    pub fn replace_with(&mut self, item: QueueItem) {
        self.items.clear();
        self.items.push(item);
    }

    pub fn pop_head(&mut self) -> Option<QueueItem> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Option<QueueItem> {
        if index >= self.items.len() {
            debug!(index, len = self.items.len(), "remove ignored: index out of range");
            return None;
        }
        Some(self.items.remove(index))
    }

    /// Swap `index` with its predecessor. Returns whether anything moved.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.items.len() {
            debug!(index, len = self.items.len(), "move up ignored at boundary");
            return false;
        }
        self.items.swap(index - 1, index);
        true
    }

    /// Swap `index` with its successor. Returns whether anything moved.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.items.len() {
            debug!(index, len = self.items.len(), "move down ignored at boundary");
            return false;
        }
        self.items.swap(index, index + 1);
        true
    }

    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::thread_rng());
    }

    /// Performs `len / 2` random pair swaps.
    ///
    /// Not a uniform permutation: orders close to the original are more likely.
    pub fn shuffle_with<R: Rng>(&mut self, rng: &mut R) {
        let len = self.items.len();
        if len < 2 {
            return;
        }
        for _ in 0..len / 2 {
            let a = rng.gen_range(0..len);
            let b = rng.gen_range(0..len);
            self.items.swap(a, b);
        }
    }
}

impl FromIterator<QueueItem> for Queue {
    fn from_iter<T: IntoIterator<Item = QueueItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
