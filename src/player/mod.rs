pub mod backend;
pub mod engine;
pub mod event_loop;
pub mod events;
pub mod observer;
pub mod queue;
pub mod state;
pub mod traits;

pub use backend::{MediaBackend, MpvBackend, MpvOptions, SeekMode};
pub use engine::{EngineOptions, PlaybackEngine};
pub use events::{EngineEvent, PlayerEvent, Property, StatusSnapshot};
pub use observer::{Callback, Notification, ObserverRegistry, PlaybackObserver, SongCallback};
pub use queue::{Queue, QueueItem};
pub use state::PlaybackState;
pub use traits::{ControlledPlayer, TrackInterface};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock, recovering the data if a panicking thread poisoned the mutex.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
