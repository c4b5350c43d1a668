//! The embedded media engine, seen as an opaque command/event box.

pub mod mpv;
pub mod protocol;

use super::events::{EngineEvent, Property};
use crate::error::BackendError;
use std::time::Duration;

pub use mpv::{MpvBackend, MpvOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMode {
    Relative,
    Absolute,
}

impl SeekMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SeekMode::Relative => "relative",
            SeekMode::Absolute => "absolute",
        }
    }
}

/// Command, property and event surface of a media engine.
///
/// Commands and property reads are synchronous and expected to be fast.
/// `wait_event` blocks up to `timeout` and is only ever called from the
/// single event producer thread.
pub trait MediaBackend: Send + Sync {
    /// Replace whatever is loaded with `locator` and start it.
    fn load(&self, locator: &str) -> Result<(), BackendError>;
    fn stop(&self) -> Result<(), BackendError>;
    fn set_pause(&self, paused: bool) -> Result<(), BackendError>;
    fn seek(&self, seconds: f64, mode: SeekMode) -> Result<(), BackendError>;
    fn set_volume(&self, percent: u8) -> Result<(), BackendError>;

    fn get_flag(&self, property: Property) -> Result<bool, BackendError>;
    fn get_number(&self, property: Property) -> Result<f64, BackendError>;

    /// Next engine event, or `None` when the timeout elapsed.
    fn wait_event(&self, timeout: Duration) -> Result<Option<EngineEvent>, BackendError>;

    /// Tear the engine down. Safe to call more than once.
    fn terminate(&self);
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scriptable in-memory engine for unit tests.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Load(String),
        Stop,
        SetPause(bool),
        Seek(f64, SeekMode),
        SetVolume(u8),
    }

    #[derive(Debug)]
    pub struct FakeState {
        pub calls: Vec<Call>,
        pub paused: bool,
        pub idle: bool,
        pub time_pos: Option<f64>,
        pub duration: Option<f64>,
        pub volume: f64,
        pub fail_loads: bool,
        pub events: VecDeque<EngineEvent>,
        pub terminated: bool,
    }

    impl Default for FakeState {
        fn default() -> Self {
            Self {
                calls: Vec::new(),
                paused: false,
                idle: true,
                time_pos: None,
                duration: None,
                volume: 100.0,
                fail_loads: false,
                events: VecDeque::new(),
                terminated: false,
            }
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeBackend {
        pub state: Mutex<FakeState>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<Call> {
            self.state.lock().unwrap().calls.clone()
        }

        pub fn clear_calls(&self) {
            self.state.lock().unwrap().calls.clear();
        }

        pub fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
            f(&mut self.state.lock().unwrap())
        }
    }

    impl MediaBackend for FakeBackend {
        fn load(&self, locator: &str) -> Result<(), BackendError> {
            let mut s = self.state.lock().unwrap();
            s.calls.push(Call::Load(locator.to_string()));
            if s.fail_loads {
                return Err(BackendError::Command {
                    command: "loadfile".to_string(),
                    message: "loading failed".to_string(),
                });
            }
            s.idle = false;
            Ok(())
        }

        fn stop(&self) -> Result<(), BackendError> {
            let mut s = self.state.lock().unwrap();
            s.calls.push(Call::Stop);
            s.idle = true;
            Ok(())
        }

        fn set_pause(&self, paused: bool) -> Result<(), BackendError> {
            let mut s = self.state.lock().unwrap();
            s.calls.push(Call::SetPause(paused));
            s.paused = paused;
            Ok(())
        }

        fn seek(&self, seconds: f64, mode: SeekMode) -> Result<(), BackendError> {
            self.state.lock().unwrap().calls.push(Call::Seek(seconds, mode));
            Ok(())
        }

        fn set_volume(&self, percent: u8) -> Result<(), BackendError> {
            let mut s = self.state.lock().unwrap();
            s.calls.push(Call::SetVolume(percent));
            s.volume = percent as f64;
            Ok(())
        }

        fn get_flag(&self, property: Property) -> Result<bool, BackendError> {
            let s = self.state.lock().unwrap();
            match property {
                Property::Pause => Ok(s.paused),
                Property::IdleActive => Ok(s.idle),
                Property::Seeking => Ok(false),
                other => Err(BackendError::Unavailable(other.name())),
            }
        }

        fn get_number(&self, property: Property) -> Result<f64, BackendError> {
            let s = self.state.lock().unwrap();
            let value = match property {
                Property::TimePos => s.time_pos,
                Property::Duration => s.duration,
                Property::Volume => Some(s.volume),
                _ => None,
            };
            value.ok_or(BackendError::Unavailable(property.name()))
        }

        fn wait_event(&self, timeout: Duration) -> Result<Option<EngineEvent>, BackendError> {
            let next = self.state.lock().unwrap().events.pop_front();
            if next.is_none() {
                std::thread::sleep(timeout.min(Duration::from_millis(2)));
            }
            Ok(next)
        }

        fn terminate(&self) {
            self.state.lock().unwrap().terminated = true;
        }
    }
}
