//! Playback state machine.
//!
//! | Input              | Guard                           | New state            |
//! |--------------------|---------------------------------|----------------------|
//! | `Load`             | -                               | Loading (replacing)  |
//! | `StartFile`        | -                               | Playing or Paused    |
//! | `EndFile`          | not stopped, not replacing      | unchanged, advance   |
//! | `EndFile`          | stopped or replacing            | unchanged, ignored   |
//! | `PauseToggled`     | not stopped                     | Playing <-> Paused   |
//! | `Stop`             | -                               | Stopped              |
//! | `LoadFailed`       | -                               | Stopped              |

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Stopped,
    /// A load was issued and the engine has not confirmed the file yet
    Loading,
    Playing,
    Paused,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Loading => "loading",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A deliberate, user-initiated load of a new head
    Load,
    /// Engine confirmed the new file; `paused` is the engine's pause flag
    StartFile { paused: bool },
    EndFile,
    /// Engine pause flag was flipped to `paused`
    PauseToggled { paused: bool },
    Stop,
    /// The load command never reached the engine
    LoadFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Entered(PlaybackState),
    /// Natural end of track; the queue should move on
    Advance,
    Ignored,
}

/// Explicit playback state plus the transient replace flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transport {
    state: PlaybackState,
    replace_in_progress: bool,
}

impl Transport {
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// True between a deliberate load and the engine's start-of-file.
    pub fn replace_in_progress(&self) -> bool {
        self.replace_in_progress
    }

    pub fn is_stopped(&self) -> bool {
        self.state == PlaybackState::Stopped
    }

    pub fn apply(&mut self, input: Input) -> Outcome {
        use PlaybackState::*;

        match (self.state, input) {
            (_, Input::Load) => {
                self.replace_in_progress = true;
                self.state = Loading;
                Outcome::Entered(Loading)
            }
            (_, Input::StartFile { paused }) => {
                self.replace_in_progress = false;
                self.state = if paused { Paused } else { Playing };
                Outcome::Entered(self.state)
            }
            (Stopped, Input::EndFile) => Outcome::Ignored,
            (Loading | Playing | Paused, Input::EndFile) => {
                if self.replace_in_progress {
                    Outcome::Ignored
                } else {
                    Outcome::Advance
                }
            }
            (Stopped, Input::PauseToggled { .. }) => Outcome::Ignored,
            (Loading | Playing | Paused, Input::PauseToggled { paused }) => {
                self.state = if paused { Paused } else { Playing };
                Outcome::Entered(self.state)
            }
            (_, Input::Stop) | (_, Input::LoadFailed) => {
                self.replace_in_progress = false;
                self.state = Stopped;
                Outcome::Entered(Stopped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_stopped() {
        let transport = Transport::default();
        assert_eq!(transport.state(), PlaybackState::Stopped);
        assert!(!transport.replace_in_progress());
    }

    #[test]
    fn test_load_then_start_clears_replace_once() {
        let mut t = Transport::default();
        assert_eq!(t.apply(Input::Load), Outcome::Entered(PlaybackState::Loading));
        assert!(t.replace_in_progress());

        // The swap's own end-of-file is an artifact
        assert_eq!(t.apply(Input::EndFile), Outcome::Ignored);
        assert_eq!(t.state(), PlaybackState::Loading);

        assert_eq!(
            t.apply(Input::StartFile { paused: false }),
            Outcome::Entered(PlaybackState::Playing)
        );
        assert!(!t.replace_in_progress());

        assert_eq!(t.apply(Input::EndFile), Outcome::Advance);
        assert_eq!(t.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_start_file_respects_engine_pause() {
        let mut t = Transport::default();
        t.apply(Input::Load);
        assert_eq!(
            t.apply(Input::StartFile { paused: true }),
            Outcome::Entered(PlaybackState::Paused)
        );
    }

    #[test]
    fn test_end_file_ignored_when_stopped() {
        let mut t = Transport::default();
        t.apply(Input::Load);
        t.apply(Input::StartFile { paused: false });
        t.apply(Input::Stop);
        assert_eq!(t.apply(Input::EndFile), Outcome::Ignored);
        assert!(t.is_stopped());
    }

    #[test]
    fn test_pause_toggle() {
        let mut t = Transport::default();
        assert_eq!(t.apply(Input::PauseToggled { paused: true }), Outcome::Ignored);

        t.apply(Input::Load);
        t.apply(Input::StartFile { paused: false });
        assert_eq!(
            t.apply(Input::PauseToggled { paused: true }),
            Outcome::Entered(PlaybackState::Paused)
        );
        assert_eq!(
            t.apply(Input::PauseToggled { paused: false }),
            Outcome::Entered(PlaybackState::Playing)
        );
    }

    #[test]
    fn test_load_failure_cancels_replace() {
        let mut t = Transport::default();
        t.apply(Input::Load);
        assert_eq!(t.apply(Input::LoadFailed), Outcome::Entered(PlaybackState::Stopped));
        assert!(!t.replace_in_progress());
    }
}
