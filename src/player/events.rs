//! Raw engine events and the domain events derived from them.

use super::queue::QueueItem;
use serde::{Deserialize, Serialize};

/// Engine properties the core reads or observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    TimePos,
    Duration,
    Volume,
    Pause,
    IdleActive,
    Seeking,
}

impl Property {
    /// Properties refreshed into the status snapshot on every change.
    pub const OBSERVED: [Property; 3] = [Property::TimePos, Property::Duration, Property::Volume];

    pub fn name(self) -> &'static str {
        match self {
            Property::TimePos => "time-pos",
            Property::Duration => "duration",
            Property::Volume => "volume",
            Property::Pause => "pause",
            Property::IdleActive => "idle-active",
            Property::Seeking => "seeking",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "time-pos" => Some(Property::TimePos),
            "duration" => Some(Property::Duration),
            "volume" => Some(Property::Volume),
            "pause" => Some(Property::Pause),
            "idle-active" => Some(Property::IdleActive),
            "seeking" => Some(Property::Seeking),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Eof,
    Stop,
    Quit,
    Error,
    Redirect,
    Unknown,
}

impl EndReason {
    pub fn from_name(name: &str) -> Self {
        match name {
            "eof" => EndReason::Eof,
            "stop" => EndReason::Stop,
            "quit" => EndReason::Quit,
            "error" => EndReason::Error,
            "redirect" => EndReason::Redirect,
            _ => EndReason::Unknown,
        }
    }
}

/// Event as emitted by the media engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    StartFile,
    EndFile(EndReason),
    PropertyChange(Property),
    Seek,
    Idle,
    Shutdown,
}

/// Volume, elapsed and total time as last read from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// 0-100
    pub volume: u8,
    /// Elapsed seconds
    pub position: f64,
    /// Track length in seconds
    pub duration: f64,
}

/// Translated playback transition, as delivered to the UI sink.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Stopped,
    Playing(Option<QueueItem>),
    Paused(Option<QueueItem>),
    Unpaused(Option<QueueItem>),
    StatusUpdate(StatusSnapshot),
}

impl PlayerEvent {
    /// Head item carried by transport events.
    pub fn track(&self) -> Option<&QueueItem> {
        match self {
            PlayerEvent::Playing(item) | PlayerEvent::Paused(item) | PlayerEvent::Unpaused(item) => {
                item.as_ref()
            }
            PlayerEvent::Stopped | PlayerEvent::StatusUpdate(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_names_round_trip() {
        for prop in [
            Property::TimePos,
            Property::Duration,
            Property::Volume,
            Property::Pause,
            Property::IdleActive,
            Property::Seeking,
        ] {
            assert_eq!(Property::from_name(prop.name()), Some(prop));
        }
        assert_eq!(Property::from_name("speed"), None);
    }

    #[test]
    fn test_end_reason_parsing() {
        assert_eq!(EndReason::from_name("eof"), EndReason::Eof);
        assert_eq!(EndReason::from_name("error"), EndReason::Error);
        assert_eq!(EndReason::from_name("whatever"), EndReason::Unknown);
    }
}
