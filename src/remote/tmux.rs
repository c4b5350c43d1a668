//! Now-playing surface for the tmux status line.
//!
//! Publishes `@cadence_status`, `@cadence_title` and `@cadence_artist` as
//! global user options, e.g. `set -g status-right '#{@cadence_title}'`.
//! Callbacks only enqueue; a worker thread runs `tmux`.

use super::RemoteAdapter;
use crate::error::RemoteError;
use crate::player::{ControlledPlayer, TrackInterface};
use std::process::Command;
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

type Runner = Box<dyn FnMut(&[(&'static str, String)]) + Send>;

#[derive(Debug, Clone, PartialEq)]
enum Update {
    Song { title: String, artist: String },
    Status(&'static str),
    Cleared,
}

fn options_for(update: &Update) -> Vec<(&'static str, String)> {
    match update {
        Update::Song { title, artist } => vec![
            ("@cadence_title", title.clone()),
            ("@cadence_artist", artist.clone()),
        ],
        Update::Status(status) => vec![("@cadence_status", status.to_string())],
        Update::Cleared => vec![
            ("@cadence_status", "stopped".to_string()),
            ("@cadence_title", String::new()),
            ("@cadence_artist", String::new()),
        ],
    }
}

fn run_tmux(options: &[(&'static str, String)]) {
    for (name, value) in options {
        match Command::new("tmux")
            .args(["set-option", "-gq", name, value])
            .status()
        {
            Ok(status) if status.success() => {}
            Ok(status) => debug!(option = name, %status, "tmux set-option failed"),
            Err(e) => {
                warn!("could not run tmux: {}", e);
                return;
            }
        }
    }
    let _ = Command::new("tmux").args(["refresh-client", "-S"]).status();
}

pub struct TmuxStatus {
    in_tmux: bool,
    runner: Option<Runner>,
}

impl TmuxStatus {
    pub fn new() -> Self {
        Self {
            in_tmux: std::env::var_os("TMUX").is_some(),
            runner: Some(Box::new(run_tmux)),
        }
    }

    #[cfg(test)]
    fn with_runner(runner: Runner) -> Self {
        Self {
            in_tmux: true,
            runner: Some(runner),
        }
    }
}

impl Default for TmuxStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteAdapter for TmuxStatus {
    fn name(&self) -> &'static str {
        "tmux-status"
    }

    fn register(&mut self, player: Arc<dyn ControlledPlayer>) -> Result<(), RemoteError> {
        if !self.in_tmux {
            return Err(RemoteError::Unavailable {
                adapter: self.name(),
                reason: "not running inside tmux".to_string(),
            });
        }
        let Some(mut runner) = self.runner.take() else {
            return Err(RemoteError::Unavailable {
                adapter: self.name(),
                reason: "already registered".to_string(),
            });
        };

        let (tx, rx) = mpsc::channel::<Update>();
        thread::Builder::new()
            .name("tmux-status".to_string())
            .spawn(move || {
                for update in rx {
                    runner(&options_for(&update));
                }
            })?;

        let send = |tx: &Sender<Update>, update: Update| {
            if tx.send(update).is_err() {
                debug!("tmux worker gone");
            }
        };

        let t = tx.clone();
        player.on_song_change(Box::new(move |track: &dyn TrackInterface| {
            send(
                &t,
                Update::Song {
                    title: track.title().to_string(),
                    artist: track.artist().to_string(),
                },
            )
        }));
        let t = tx.clone();
        player.on_playing(Box::new(move || send(&t, Update::Status("playing"))));
        let t = tx.clone();
        player.on_paused(Box::new(move || send(&t, Update::Status("paused"))));
        let t = tx;
        player.on_stopped(Box::new(move || send(&t, Update::Cleared)));

        Ok(())
    }
}
