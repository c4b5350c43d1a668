//! Playback engine: the single serialization point for queue and transport.
//!
//! Every command runs under one mutex guarding the queue, the transport
//! state and the last status snapshot. The event loop takes the same lock
//! to translate engine events, so a UI-issued `delete_queue_item` and an
//! end-of-track advance can never interleave.
//!
//! Commands never deliver notifications themselves. Anything observers must
//! hear about is pushed onto the raw event channel as an announcement and
//! delivered by the event loop, in order with engine events.

use super::backend::{MediaBackend, SeekMode};
use super::event_loop::{self, EventLoop, LoopMessage};
use super::events::{PlayerEvent, Property, StatusSnapshot};
use super::lock;
use super::observer::{Callback, ObserverRegistry, PlaybackObserver, SongCallback};
use super::queue::{Queue, QueueItem};
use super::state::{Input, PlaybackState, Transport};
use super::traits::ControlledPlayer;
use crate::error::{BackendError, PlayerError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Capacity of the UI event sink
    pub ui_event_buffer: usize,
    /// How long the producer blocks on the engine before re-checking for shutdown
    pub poll_interval: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            ui_event_buffer: 100,
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// State owned by the engine lock.
#[derive(Debug, Default)]
pub(crate) struct Core {
    pub queue: Queue,
    pub transport: Transport,
    pub status: StatusSnapshot,
}

pub struct PlaybackEngine {
    backend: Arc<dyn MediaBackend>,
    core: Mutex<Core>,
    observers: ObserverRegistry,
    raw_tx: mpsc::UnboundedSender<Option<LoopMessage>>,
    shut_down: Arc<AtomicBool>,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("core", &*self.core())
            .field("observers", &self.observers)
            .field("shut_down", &self.shut_down.load(Ordering::Relaxed))
            .finish()
    }
}

impl PlaybackEngine {
    /// Start the event producer and event loop threads.
    ///
    /// Returns the engine and the receiving end of the bounded UI sink.
    pub fn start(
        backend: Arc<dyn MediaBackend>,
        options: EngineOptions,
    ) -> Result<(Arc<Self>, mpsc::Receiver<PlayerEvent>)> {
        let (engine, raw_rx) = Self::detached(backend);
        let engine = Arc::new(engine);
        let (ui_tx, ui_rx) = mpsc::channel(options.ui_event_buffer.max(1));

        let producer = event_loop::spawn_producer(
            engine.backend.clone(),
            engine.raw_tx.clone(),
            engine.shut_down.clone(),
            options.poll_interval,
        )
        .map_err(BackendError::from)?;

        let consumer = match EventLoop::new(engine.clone(), raw_rx, ui_tx).spawn() {
            Ok(handle) => handle,
            Err(e) => {
                engine.shut_down.store(true, Ordering::SeqCst);
                return Err(BackendError::from(e).into());
            }
        };

        lock(&engine.threads).extend([producer, consumer]);
        info!("playback engine started");
        Ok((engine, ui_rx))
    }

    /// Engine without threads; the caller owns the raw event receiver.
    pub(crate) fn detached(
        backend: Arc<dyn MediaBackend>,
    ) -> (Self, mpsc::UnboundedReceiver<Option<LoopMessage>>) {
        let (raw_tx, raw_rx) = mpsc::unbounded_channel();

        let mut core = Core::default();
        match backend.get_number(Property::Volume) {
            Ok(volume) => core.status.volume = volume.round().clamp(0.0, 100.0) as u8,
            Err(e) => debug!("initial volume unknown: {}", e),
        }

        let engine = Self {
            backend,
            core: Mutex::new(core),
            observers: ObserverRegistry::new(),
            raw_tx,
            shut_down: Arc::new(AtomicBool::new(false)),
            threads: Mutex::new(Vec::new()),
        };
        (engine, raw_rx)
    }

    pub(crate) fn core(&self) -> MutexGuard<'_, Core> {
        lock(&self.core)
    }

    pub(crate) fn backend(&self) -> &dyn MediaBackend {
        self.backend.as_ref()
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    pub fn subscribe(&self, observer: Arc<dyn PlaybackObserver>) {
        self.observers.subscribe(observer);
    }

    fn ensure_running(&self) -> Result<()> {
        if self.shut_down.load(Ordering::SeqCst) {
            Err(PlayerError::ShutDown)
        } else {
            Ok(())
        }
    }

    /// Queue a domain event for delivery by the event loop.
    fn announce(&self, event: PlayerEvent) {
        if self.raw_tx.send(Some(LoopMessage::Announce(event))).is_err() {
            debug!("event loop gone, announcement dropped");
        }
    }

    fn engine_idle(&self) -> bool {
        self.backend.get_flag(Property::IdleActive).unwrap_or(true)
    }

    /// Unpause the engine so the next load is audible.
    fn clear_engine_pause(&self) {
        if self.backend.get_flag(Property::Pause).unwrap_or(false) {
            if let Err(e) = self.backend.set_pause(false) {
                warn!("unpause before load failed: {}", e);
            }
        }
    }

    /// Deliberately load the current head, if any.
    fn load_head(&self, core: &mut Core) -> Result<()> {
        let Some(locator) = core.queue.head().map(|item| item.locator.clone()) else {
            return Ok(());
        };

        core.transport.apply(Input::Load);
        info!(%locator, "loading");
        if let Err(e) = self.backend.load(&locator) {
            core.transport.apply(Input::LoadFailed);
            warn!(%locator, "load failed: {}", e);
            self.announce(PlayerEvent::Stopped);
            return Err(e.into());
        }
        Ok(())
    }

    /// Swap whatever the engine has loaded for the current head.
    fn replace_with_head(&self, core: &mut Core) -> Result<()> {
        if !self.engine_idle() {
            core.transport.apply(Input::Load);
            if let Err(e) = self.backend.stop() {
                core.transport.apply(Input::LoadFailed);
                warn!("stop before replace failed: {}", e);
                return Err(e.into());
            }
        }
        self.load_head(core)
    }

    fn stop_locked(&self, core: &mut Core) -> Result<()> {
        core.transport.apply(Input::Stop);
        info!("stopping");
        let result = self.backend.stop();
        self.announce(PlayerEvent::Stopped);
        result.map_err(|e| {
            warn!("stop failed: {}", e);
            e.into()
        })
    }

    /// Reload the head after a queue edit moved a different item to index 0.
    fn follow_head(&self, core: &mut Core, previous: Option<String>) -> Result<()> {
        let current = core.queue.head().map(|item| item.locator.clone());
        if current == previous || core.transport.is_stopped() {
            return Ok(());
        }
        match current {
            Some(_) => self.replace_with_head(core),
            None => self.stop_locked(core),
        }
    }

    pub fn play(&self, item: QueueItem) -> Result<()> {
        self.ensure_running()?;
        let mut core = self.core();

        self.clear_engine_pause();

        info!(id = %item.id, title = %item.title, "play");
        core.queue.replace_with(item);
        self.load_head(&mut core)
    }

    pub fn play_next_track(&self) -> Result<()> {
        self.ensure_running()?;
        let mut core = self.core();

        if core.queue.len() <= 1 {
            debug!(len = core.queue.len(), "no next track");
            return self.stop_locked(&mut core);
        }

        core.queue.pop_head();
        self.replace_with_head(&mut core)
    }

    /// Restarts the current head; there is no play history.
    pub fn previous_track(&self) -> Result<()> {
        self.ensure_running()?;
        let mut core = self.core();

        if core.queue.is_empty() {
            return self.stop_locked(&mut core);
        }
        self.replace_with_head(&mut core)
    }

    pub fn pause(&self) -> Result<()> {
        self.ensure_running()?;
        let mut core = self.core();

        if core.transport.is_stopped() {
            if core.queue.is_empty() {
                self.announce(PlayerEvent::Stopped);
                return Ok(());
            }
            // mpv keeps its pause flag across stop and loadfile
            self.clear_engine_pause();
            return self.load_head(&mut core);
        }

        let paused = self.backend.get_flag(Property::Pause).unwrap_or_else(|e| {
            warn!("pause flag unreadable: {}", e);
            false
        });
        self.backend.set_pause(!paused).map_err(|e| {
            warn!("toggle pause failed: {}", e);
            PlayerError::from(e)
        })?;

        core.transport.apply(Input::PauseToggled { paused: !paused });
        let head = core.queue.head().cloned();
        self.announce(if paused {
            PlayerEvent::Unpaused(head)
        } else {
            PlayerEvent::Paused(head)
        });
        Ok(())
    }

    /// Stop playback, keeping the queue.
    pub fn stop(&self) -> Result<()> {
        self.ensure_running()?;
        let mut core = self.core();
        self.stop_locked(&mut core)
    }

    pub fn seek_relative(&self, delta_seconds: f64) -> Result<()> {
        self.ensure_running()?;
        debug!(delta_seconds, "seek");
        self.backend
            .seek(delta_seconds, SeekMode::Relative)
            .map_err(|e| {
                warn!("seek failed: {}", e);
                e.into()
            })
    }

    pub fn seek_absolute(&self, seconds: f64) -> Result<()> {
        self.ensure_running()?;
        let seconds = seconds.max(0.0);
        debug!(seconds, "seek to");
        self.backend
            .seek(seconds, SeekMode::Absolute)
            .map_err(|e| {
                warn!("seek failed: {}", e);
                e.into()
            })
    }

    pub fn set_volume(&self, percent: i64) -> Result<()> {
        self.ensure_running()?;
        let mut core = self.core();
        self.set_volume_locked(&mut core, percent)
    }

    /// Relative change; read and write happen under one lock.
    pub fn adjust_volume(&self, delta: i64) -> Result<()> {
        self.ensure_running()?;
        let mut core = self.core();
        let target = (core.status.volume as i64).saturating_add(delta);
        self.set_volume_locked(&mut core, target)
    }

    fn set_volume_locked(&self, core: &mut Core, percent: i64) -> Result<()> {
        let volume = percent.clamp(0, 100) as u8;
        self.backend.set_volume(volume).map_err(|e| {
            warn!(volume, "set volume failed: {}", e);
            PlayerError::from(e)
        })?;
        core.status.volume = volume;
        Ok(())
    }

    /// Append without starting playback.
    pub fn add_to_queue(&self, item: QueueItem) {
        debug!(id = %item.id, "enqueue");
        self.core().queue.append(item);
    }

    pub fn clear_queue(&self) -> Result<()> {
        self.ensure_running()?;
        let mut core = self.core();
        core.queue.clear();
        self.stop_locked(&mut core)
    }

    /// Remove one entry. Removing the playing head moves playback on.
    pub fn delete_queue_item(&self, index: usize) -> Result<()> {
        self.ensure_running()?;
        let mut core = self.core();

        if index >= core.queue.len() {
            debug!(index, len = core.queue.len(), "delete ignored: index out of range");
            return Ok(());
        }

        if index == 0 && !core.transport.is_stopped() {
            if core.queue.len() > 1 {
                core.queue.pop_head();
                return self.replace_with_head(&mut core);
            }
            core.queue.pop_head();
            return self.stop_locked(&mut core);
        }

        core.queue.remove_at(index);
        Ok(())
    }

    pub fn move_song_up(&self, index: usize) -> Result<()> {
        self.ensure_running()?;
        let mut core = self.core();
        let head = core.queue.head().map(|item| item.locator.clone());
        if core.queue.move_up(index) {
            self.follow_head(&mut core, head)?;
        }
        Ok(())
    }

    pub fn move_song_down(&self, index: usize) -> Result<()> {
        self.ensure_running()?;
        let mut core = self.core();
        let head = core.queue.head().map(|item| item.locator.clone());
        if core.queue.move_down(index) {
            self.follow_head(&mut core, head)?;
        }
        Ok(())
    }

    pub fn shuffle(&self) -> Result<()> {
        self.ensure_running()?;
        let mut core = self.core();
        let head = core.queue.head().map(|item| item.locator.clone());
        core.queue.shuffle();
        self.follow_head(&mut core, head)
    }

    pub fn queue(&self) -> Vec<QueueItem> {
        self.core().queue.to_vec()
    }

    pub fn state(&self) -> PlaybackState {
        self.core().transport.state()
    }

    pub fn status(&self) -> StatusSnapshot {
        self.core().status
    }

    pub fn replace_in_progress(&self) -> bool {
        self.core().transport.replace_in_progress()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Push the shutdown sentinel and tear the engine down. Idempotent.
    ///
    /// Events already queued ahead of the sentinel are still delivered.
    pub fn quit(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("shutting down playback engine");
        if self.raw_tx.send(None).is_err() {
            debug!("event loop gone, shutdown sentinel dropped");
        }
        self.backend.terminate();
    }

    /// Wait for the engine threads to exit. Call after [`quit`](Self::quit).
    pub fn join(&self) {
        let handles: Vec<_> = lock(&self.threads).drain(..).collect();
        let me = thread::current().id();
        for handle in handles {
            if handle.thread().id() == me {
                continue;
            }
            if handle.join().is_err() {
                warn!("engine thread panicked");
            }
        }
    }
}

impl ControlledPlayer for PlaybackEngine {
    fn play(&self, item: QueueItem) -> Result<()> {
        PlaybackEngine::play(self, item)
    }

    fn pause(&self) -> Result<()> {
        PlaybackEngine::pause(self)
    }

    fn stop(&self) -> Result<()> {
        PlaybackEngine::stop(self)
    }

    fn play_next_track(&self) -> Result<()> {
        PlaybackEngine::play_next_track(self)
    }

    fn previous_track(&self) -> Result<()> {
        PlaybackEngine::previous_track(self)
    }

    fn seek_absolute(&self, seconds: f64) -> Result<()> {
        PlaybackEngine::seek_absolute(self, seconds)
    }

    fn seek_relative(&self, delta_seconds: f64) -> Result<()> {
        PlaybackEngine::seek_relative(self, delta_seconds)
    }

    fn set_volume(&self, percent: i64) -> Result<()> {
        PlaybackEngine::set_volume(self, percent)
    }

    fn adjust_volume(&self, delta: i64) -> Result<()> {
        PlaybackEngine::adjust_volume(self, delta)
    }

    fn volume(&self) -> u8 {
        self.core().status.volume
    }

    fn is_paused(&self) -> bool {
        self.state() == PlaybackState::Paused
    }

    fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    fn is_seeking(&self) -> bool {
        self.backend.get_flag(Property::Seeking).unwrap_or(false)
    }

    fn time_pos(&self) -> f64 {
        self.backend
            .get_number(Property::TimePos)
            .unwrap_or_else(|_| self.core().status.position)
    }

    fn current_track(&self) -> Option<QueueItem> {
        let core = self.core();
        if core.transport.is_stopped() {
            None
        } else {
            core.queue.head().cloned()
        }
    }

    fn on_playing(&self, cb: Callback) {
        self.observers.on_playing(cb);
    }

    fn on_paused(&self, cb: Callback) {
        self.observers.on_paused(cb);
    }

    fn on_stopped(&self, cb: Callback) {
        self.observers.on_stopped(cb);
    }

    fn on_seek(&self, cb: Callback) {
        self.observers.on_seek(cb);
    }

    fn on_song_change(&self, cb: SongCallback) {
        self.observers.on_song_change(cb);
    }
}
