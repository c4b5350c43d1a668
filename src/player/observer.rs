//! Observer registry.
//!
//! Append-only callback lists per transition kind. The event loop calls
//! [`ObserverRegistry::notify`] after each derived transition; callbacks run
//! synchronously on that thread in registration order, so a slow callback
//! delays every observer behind it.

use super::queue::QueueItem;
use super::traits::TrackInterface;
use std::sync::{Arc, RwLock};

pub type Callback = Box<dyn Fn() + Send + Sync>;
pub type SongCallback = Box<dyn Fn(&dyn TrackInterface) + Send + Sync>;

/// What the observers are told about.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Playing,
    Paused,
    Stopped,
    Seek,
    SongChange(QueueItem),
}

/// Typed subscriber; implement only the hooks you need.
pub trait PlaybackObserver: Send + Sync {
    fn on_playing(&self) {}
    fn on_paused(&self) {}
    fn on_stopped(&self) {}
    fn on_seek(&self) {}
    fn on_song_change(&self, _track: &dyn TrackInterface) {}
}

#[derive(Default)]
pub struct ObserverRegistry {
    playing: RwLock<Vec<Arc<Callback>>>,
    paused: RwLock<Vec<Arc<Callback>>>,
    stopped: RwLock<Vec<Arc<Callback>>>,
    seek: RwLock<Vec<Arc<Callback>>>,
    song_change: RwLock<Vec<Arc<SongCallback>>>,
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("playing", &len(&self.playing))
            .field("paused", &len(&self.paused))
            .field("stopped", &len(&self.stopped))
            .field("seek", &len(&self.seek))
            .field("song_change", &len(&self.song_change))
            .finish()
    }
}

fn len<T>(list: &RwLock<Vec<T>>) -> usize {
    list.read().map(|l| l.len()).unwrap_or_else(|e| e.into_inner().len())
}

fn push<T>(list: &RwLock<Vec<Arc<T>>>, cb: T) {
    let mut guard = list.write().unwrap_or_else(|e| e.into_inner());
    guard.push(Arc::new(cb));
}

// Clone the list so callbacks run without the lock held; a callback may
// register further callbacks.
fn snapshot<T: ?Sized>(list: &RwLock<Vec<Arc<T>>>) -> Vec<Arc<T>> {
    list.read().unwrap_or_else(|e| e.into_inner()).clone()
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_playing(&self, cb: Callback) {
        push(&self.playing, cb);
    }

    pub fn on_paused(&self, cb: Callback) {
        push(&self.paused, cb);
    }

    pub fn on_stopped(&self, cb: Callback) {
        push(&self.stopped, cb);
    }

    pub fn on_seek(&self, cb: Callback) {
        push(&self.seek, cb);
    }

    pub fn on_song_change(&self, cb: SongCallback) {
        push(&self.song_change, cb);
    }

    /// Register every hook of a typed observer.
    pub fn subscribe(&self, observer: Arc<dyn PlaybackObserver>) {
        let o = observer.clone();
        self.on_playing(Box::new(move || o.on_playing()));
        let o = observer.clone();
        self.on_paused(Box::new(move || o.on_paused()));
        let o = observer.clone();
        self.on_stopped(Box::new(move || o.on_stopped()));
        let o = observer.clone();
        self.on_seek(Box::new(move || o.on_seek()));
        let o = observer;
        self.on_song_change(Box::new(move |track: &dyn TrackInterface| {
            o.on_song_change(track)
        }));
    }

    pub fn notify(&self, notification: &Notification) {
        match notification {
            Notification::Playing => snapshot(&self.playing).iter().for_each(|cb| cb()),
            Notification::Paused => snapshot(&self.paused).iter().for_each(|cb| cb()),
            Notification::Stopped => snapshot(&self.stopped).iter().for_each(|cb| cb()),
            Notification::Seek => snapshot(&self.seek).iter().for_each(|cb| cb()),
            Notification::SongChange(item) => {
                for cb in snapshot(&self.song_change) {
                    cb(item as &dyn TrackInterface);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_callbacks_run_in_registration_order() {
        let registry = ObserverRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let log = log.clone();
            registry.on_paused(Box::new(move || log.lock().unwrap().push(name)));
        }

        registry.notify(&Notification::Paused);
        registry.notify(&Notification::Playing);

        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_song_change_receives_track() {
        let registry = ObserverRegistry::new();
        let seen = Arc::new(Mutex::new(None));
        let seen_cb = seen.clone();
        registry.on_song_change(Box::new(move |track: &dyn TrackInterface| {
            *seen_cb.lock().unwrap() = Some(track.title().to_string());
        }));

        let item = QueueItem {
            id: "1".to_string(),
            title: "Blue in Green".to_string(),
            ..Default::default()
        };
        registry.notify(&Notification::SongChange(item));

        assert_eq!(seen.lock().unwrap().as_deref(), Some("Blue in Green"));
    }

    #[test]
    fn test_callback_may_register_more() {
        let registry = Arc::new(ObserverRegistry::new());
        let inner = registry.clone();
        registry.on_stopped(Box::new(move || {
            inner.on_stopped(Box::new(|| {}));
        }));

        registry.notify(&Notification::Stopped);
        assert_eq!(len(&registry.stopped), 2);
    }

    #[derive(Default)]
    struct Counter {
        seeks: Mutex<u32>,
        stops: Mutex<u32>,
    }

    impl PlaybackObserver for Counter {
        fn on_seek(&self) {
            *self.seeks.lock().unwrap() += 1;
        }
        fn on_stopped(&self) {
            *self.stops.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_typed_subscriber() {
        let registry = ObserverRegistry::new();
        let counter = Arc::new(Counter::default());
        registry.subscribe(counter.clone());

        registry.notify(&Notification::Seek);
        registry.notify(&Notification::Seek);
        registry.notify(&Notification::Stopped);
        registry.notify(&Notification::Playing);

        assert_eq!(*counter.seeks.lock().unwrap(), 2);
        assert_eq!(*counter.stops.lock().unwrap(), 1);
    }
}
