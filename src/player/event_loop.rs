//! Event producer, event loop and the translation of raw engine events.
//!
//! The producer thread blocks on the engine and forwards whatever it emits.
//! The event loop is the only consumer: it handles one message at a time in
//! arrival order, translating under the engine lock and delivering to the UI
//! sink and observers after releasing it. `None` on the channel stops the loop.

use super::backend::MediaBackend;
use super::engine::{Core, PlaybackEngine};
use super::events::{EngineEvent, EndReason, PlayerEvent, Property};
use super::observer::Notification;
use super::state::{Input, Outcome};
use crate::error::BackendError;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, trace, warn};

/// What travels on the raw event channel.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopMessage {
    /// Emitted by the media engine
    Engine(EngineEvent),
    /// Produced by a command, delivered as-is
    Announce(PlayerEvent),
}

/// One delivery step, in order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Dispatch {
    Ui(PlayerEvent),
    Notify(Notification),
}

pub(crate) fn spawn_producer(
    backend: Arc<dyn MediaBackend>,
    tx: mpsc::UnboundedSender<Option<LoopMessage>>,
    shut_down: Arc<AtomicBool>,
    poll_interval: Duration,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("engine-events".to_string())
        .spawn(move || {
            while !shut_down.load(Ordering::SeqCst) {
                match backend.wait_event(poll_interval) {
                    Ok(Some(event)) => {
                        let last = event == EngineEvent::Shutdown;
                        if tx.send(Some(LoopMessage::Engine(event))).is_err() || last {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(BackendError::Closed) => break,
                    Err(e) => {
                        warn!("waiting for engine events failed: {}", e);
                        thread::sleep(poll_interval);
                    }
                }
            }
            debug!("event producer exited");
        })
}

pub struct EventLoop {
    engine: Arc<PlaybackEngine>,
    rx: mpsc::UnboundedReceiver<Option<LoopMessage>>,
    ui: mpsc::Sender<PlayerEvent>,
}

impl EventLoop {
    pub(crate) fn new(
        engine: Arc<PlaybackEngine>,
        rx: mpsc::UnboundedReceiver<Option<LoopMessage>>,
        ui: mpsc::Sender<PlayerEvent>,
    ) -> Self {
        Self { engine, rx, ui }
    }

    pub(crate) fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("event-loop".to_string())
            .spawn(move || self.run())
    }

    fn run(mut self) {
        while let Some(message) = self.rx.blocking_recv() {
            let Some(message) = message else {
                debug!("shutdown sentinel received");
                break;
            };

            let steps = match message {
                LoopMessage::Engine(event) => translate(&self.engine, event),
                LoopMessage::Announce(event) => announcement(event),
            };
            for step in steps {
                self.dispatch(step);
            }
        }
        info!("event loop exited");
    }

    fn dispatch(&self, step: Dispatch) {
        match step {
            Dispatch::Ui(PlayerEvent::StatusUpdate(status)) => {
                match self.ui.try_send(PlayerEvent::StatusUpdate(status)) {
                    Ok(()) | Err(TrySendError::Closed(_)) => {}
                    Err(TrySendError::Full(_)) => trace!("ui sink full, status update dropped"),
                }
            }
            Dispatch::Ui(event) => {
                if self.ui.blocking_send(event).is_err() {
                    trace!("ui sink closed");
                }
            }
            Dispatch::Notify(notification) => self.engine.observers().notify(&notification),
        }
    }
}

/// Delivery steps for a command announcement.
pub(crate) fn announcement(event: PlayerEvent) -> Vec<Dispatch> {
    let notification = match &event {
        PlayerEvent::Stopped => Some(Notification::Stopped),
        PlayerEvent::Playing(_) | PlayerEvent::Unpaused(_) => Some(Notification::Playing),
        PlayerEvent::Paused(_) => Some(Notification::Paused),
        PlayerEvent::StatusUpdate(_) => None,
    };

    let mut steps = vec![Dispatch::Ui(event)];
    steps.extend(notification.map(Dispatch::Notify));
    steps
}

fn stopped() -> Vec<Dispatch> {
    announcement(PlayerEvent::Stopped)
}

/// Apply one engine event to the engine state and derive what to deliver.
pub(crate) fn translate(engine: &PlaybackEngine, event: EngineEvent) -> Vec<Dispatch> {
    let backend = engine.backend();
    let mut core = engine.core();

    match event {
        EngineEvent::StartFile => {
            // A stop issued while the file was still opening
            if core.transport.is_stopped() && !core.transport.replace_in_progress() {
                debug!("start-file after stop ignored");
                return Vec::new();
            }

            let paused = match backend.get_flag(Property::Pause) {
                Ok(paused) => paused,
                Err(e) => {
                    warn!("pause flag unreadable: {}", e);
                    false
                }
            };
            core.transport.apply(Input::StartFile { paused });
            let head = core.queue.head().cloned();
            info!(state = %core.transport.state(), title = ?head.as_ref().map(|h| &h.title), "track started");

            let mut steps = vec![Dispatch::Ui(if paused {
                PlayerEvent::Paused(head.clone())
            } else {
                PlayerEvent::Playing(head.clone())
            })];
            if let Some(item) = head {
                steps.push(Dispatch::Notify(Notification::SongChange(item)));
            }
            steps.push(Dispatch::Notify(if paused {
                Notification::Paused
            } else {
                Notification::Playing
            }));
            steps
        }
        EngineEvent::EndFile(reason) => match core.transport.apply(Input::EndFile) {
            Outcome::Advance => advance(backend, &mut core, reason),
            _ => {
                debug!(?reason, "end-file ignored");
                Vec::new()
            }
        },
        EngineEvent::PropertyChange(property) => {
            trace!(property = property.name(), "property changed");
            core.status.position = read_number(backend, Property::TimePos);
            core.status.duration = read_number(backend, Property::Duration);
            core.status.volume = read_number(backend, Property::Volume)
                .round()
                .clamp(0.0, 100.0) as u8;
            vec![Dispatch::Ui(PlayerEvent::StatusUpdate(core.status))]
        }
        EngineEvent::Seek => vec![Dispatch::Notify(Notification::Seek)],
        EngineEvent::Idle => Vec::new(),
        EngineEvent::Shutdown => {
            if engine.is_shut_down() || core.transport.is_stopped() {
                return Vec::new();
            }
            warn!("media engine shut down unexpectedly");
            core.transport.apply(Input::Stop);
            stopped()
        }
    }
}

/// Natural end of track: move on, or stop at the end of the queue.
fn advance(backend: &dyn MediaBackend, core: &mut Core, reason: EndReason) -> Vec<Dispatch> {
    if core.queue.len() <= 1 {
        info!(?reason, "end of queue");
        core.transport.apply(Input::Stop);
        return stopped();
    }

    core.queue.pop_head();
    let Some(locator) = core.queue.head().map(|item| item.locator.clone()) else {
        return Vec::new();
    };
    info!(%locator, ?reason, "advancing");
    if let Err(e) = backend.load(&locator) {
        warn!(%locator, "load failed: {}", e);
        core.transport.apply(Input::LoadFailed);
        return stopped();
    }
    Vec::new()
}

fn read_number(backend: &dyn MediaBackend, property: Property) -> f64 {
    match backend.get_number(property) {
        Ok(value) => value,
        Err(BackendError::Unavailable(name)) => {
            debug!(property = name, "no value yet");
            0.0
        }
        Err(e) => {
            warn!(property = property.name(), "read failed: {}", e);
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::backend::fake::{Call, FakeBackend};
    use crate::player::queue::QueueItem;
    use crate::player::state::PlaybackState;
    use crate::player::traits::TrackInterface;
    use std::sync::Mutex;

    fn item(id: &str) -> QueueItem {
        QueueItem {
            id: id.to_string(),
            locator: format!("/music/{}.flac", id),
            title: id.to_uppercase(),
            ..Default::default()
        }
    }

    fn started(
        backend: &Arc<FakeBackend>,
        ids: &[&str],
    ) -> (PlaybackEngine, mpsc::UnboundedReceiver<Option<LoopMessage>>) {
        let (engine, rx) = PlaybackEngine::detached(backend.clone());
        for id in ids {
            engine.add_to_queue(item(id));
        }
        engine.pause().unwrap();
        translate(&engine, EngineEvent::StartFile);
        backend.clear_calls();
        (engine, rx)
    }

    #[test]
    fn test_start_file_announces_head() {
        let backend = Arc::new(FakeBackend::new());
        let (engine, _rx) = PlaybackEngine::detached(backend.clone());
        engine.add_to_queue(item("a"));
        engine.pause().unwrap();

        assert!(engine.replace_in_progress());
        let steps = translate(&engine, EngineEvent::StartFile);
        assert!(!engine.replace_in_progress());
        assert_eq!(
            steps,
            vec![
                Dispatch::Ui(PlayerEvent::Playing(Some(item("a")))),
                Dispatch::Notify(Notification::SongChange(item("a"))),
                Dispatch::Notify(Notification::Playing),
            ]
        );
    }

    #[test]
    fn test_start_file_paused_engine() {
        let backend = Arc::new(FakeBackend::new());
        let (engine, _rx) = PlaybackEngine::detached(backend.clone());
        engine.add_to_queue(item("a"));
        engine.pause().unwrap();
        backend.with(|s| s.paused = true);

        let steps = translate(&engine, EngineEvent::StartFile);
        assert_eq!(steps[0], Dispatch::Ui(PlayerEvent::Paused(Some(item("a")))));
        assert_eq!(engine.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_end_file_during_replace_is_ignored() {
        let backend = Arc::new(FakeBackend::new());
        let (engine, _rx) = started(&backend, &["a", "b", "c"]);

        engine.play_next_track().unwrap();
        backend.clear_calls();

        let steps = translate(&engine, EngineEvent::EndFile(EndReason::Stop));
        assert!(steps.is_empty());
        assert_eq!(engine.queue().len(), 2);
        assert!(backend.calls().is_empty());
        assert!(engine.replace_in_progress());
    }

    #[test]
    fn test_natural_end_advances() {
        let backend = Arc::new(FakeBackend::new());
        let (engine, _rx) = started(&backend, &["a", "b"]);

        let steps = translate(&engine, EngineEvent::EndFile(EndReason::Eof));
        assert!(steps.is_empty());
        assert_eq!(engine.queue()[0].id, "b");
        assert_eq!(backend.calls(), vec![Call::Load("/music/b.flac".into())]);
        assert!(!engine.replace_in_progress());
        assert_eq!(engine.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_natural_end_of_last_track_stops() {
        let backend = Arc::new(FakeBackend::new());
        let (engine, _rx) = started(&backend, &["a"]);

        let steps = translate(&engine, EngineEvent::EndFile(EndReason::Eof));
        assert_eq!(
            steps,
            vec![
                Dispatch::Ui(PlayerEvent::Stopped),
                Dispatch::Notify(Notification::Stopped)
            ]
        );
        assert_eq!(engine.state(), PlaybackState::Stopped);
        assert_eq!(engine.queue().len(), 1);
    }

    #[test]
    fn test_end_file_after_stop_is_ignored() {
        let backend = Arc::new(FakeBackend::new());
        let (engine, _rx) = started(&backend, &["a", "b"]);
        engine.stop().unwrap();

        assert!(translate(&engine, EngineEvent::EndFile(EndReason::Stop)).is_empty());
        assert_eq!(engine.queue().len(), 2);
    }

    #[test]
    fn test_property_change_refreshes_status() {
        let backend = Arc::new(FakeBackend::new());
        let (engine, _rx) = PlaybackEngine::detached(backend.clone());
        backend.with(|s| {
            s.time_pos = Some(12.5);
            s.volume = 64.4;
        });

        let steps = translate(&engine, EngineEvent::PropertyChange(Property::TimePos));
        let Dispatch::Ui(PlayerEvent::StatusUpdate(status)) = &steps[0] else {
            panic!("expected a status update, got {:?}", steps);
        };
        assert_eq!(status.position, 12.5);
        // Unavailable duration degrades to zero
        assert_eq!(status.duration, 0.0);
        assert_eq!(status.volume, 64);
    }

    #[test]
    fn test_seek_notifies_observers_only() {
        let backend = Arc::new(FakeBackend::new());
        let (engine, _rx) = PlaybackEngine::detached(backend.clone());
        assert_eq!(
            translate(&engine, EngineEvent::Seek),
            vec![Dispatch::Notify(Notification::Seek)]
        );
        assert!(translate(&engine, EngineEvent::Idle).is_empty());
    }

    #[test]
    fn test_loop_delivers_in_order_and_stops_at_sentinel() {
        let backend = Arc::new(FakeBackend::new());
        let (engine, rx) = PlaybackEngine::detached(backend.clone());
        let engine = Arc::new(engine);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        engine
            .observers()
            .on_stopped(Box::new(move || log.lock().unwrap().push("stopped".to_string())));
        let log = seen.clone();
        engine
            .observers()
            .on_song_change(Box::new(move |track: &dyn TrackInterface| {
                log.lock().unwrap().push(format!("song {}", track.id()))
            }));

        engine.pause().unwrap();
        engine.add_to_queue(item("a"));
        engine.pause().unwrap();
        engine.quit();

        let (ui_tx, mut ui_rx) = mpsc::channel(8);
        EventLoop::new(engine.clone(), rx, ui_tx).run();

        assert_eq!(ui_rx.try_recv().unwrap(), PlayerEvent::Stopped);
        assert!(ui_rx.try_recv().is_err());
        assert_eq!(*seen.lock().unwrap(), vec!["stopped".to_string()]);
    }

    #[test]
    fn test_status_updates_dropped_when_sink_full() {
        let backend = Arc::new(FakeBackend::new());
        let (engine, rx) = PlaybackEngine::detached(backend.clone());
        let (ui_tx, mut ui_rx) = mpsc::channel(1);
        let event_loop = EventLoop::new(Arc::new(engine), rx, ui_tx);

        for _ in 0..3 {
            event_loop.dispatch(Dispatch::Ui(PlayerEvent::StatusUpdate(Default::default())));
        }
        assert!(ui_rx.try_recv().is_ok());
        assert!(ui_rx.try_recv().is_err());
    }
}
