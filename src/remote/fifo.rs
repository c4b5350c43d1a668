//! Named-pipe control surface.
//!
//! ```text
//! echo next > $XDG_RUNTIME_DIR/cadence.fifo
//! ```
//!
//! One command per line. `status` writes a JSON report to `<pipe>.status`.

use super::RemoteAdapter;
use crate::error::{PlayerError, RemoteError};
use crate::player::ControlledPlayer;
use nix::sys::stat::Mode;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader};
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FifoCommand {
    PlayPause,
    Pause,
    Play,
    Stop,
    Next,
    Prev,
    Seek(f64),
    SeekTo(f64),
    Volume(i64),
    VolumeBy(i64),
    Status,
}

impl FifoCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let verb = parts.next()?;
        let arg = parts.next();
        if parts.next().is_some() {
            return None;
        }

        let command = match (verb, arg) {
            ("play-pause", None) => FifoCommand::PlayPause,
            ("pause", None) => FifoCommand::Pause,
            ("play", None) => FifoCommand::Play,
            ("stop", None) => FifoCommand::Stop,
            ("next", None) => FifoCommand::Next,
            ("prev", None) => FifoCommand::Prev,
            ("status", None) => FifoCommand::Status,
            ("seek", Some(secs)) => FifoCommand::Seek(secs.parse().ok()?),
            ("seek-to", Some(secs)) => FifoCommand::SeekTo(secs.parse().ok()?),
            ("volume", Some(n)) if n.starts_with(['+', '-']) => FifoCommand::VolumeBy(n.parse().ok()?),
            ("volume", Some(n)) => FifoCommand::Volume(n.parse().ok()?),
            _ => return None,
        };
        Some(command)
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    state: &'static str,
    title: String,
    artist: String,
    album: String,
    position: f64,
    duration: u32,
    volume: u8,
}

fn status_report(player: &dyn ControlledPlayer) -> StatusReport {
    let state = if player.is_playing() {
        "playing"
    } else if player.is_paused() {
        "paused"
    } else {
        "stopped"
    };
    let track = player.current_track().unwrap_or_default();
    StatusReport {
        state,
        title: track.title,
        artist: track.artist,
        album: track.album,
        position: player.time_pos(),
        duration: track.duration,
        volume: player.volume(),
    }
}

fn execute(
    command: FifoCommand,
    player: &dyn ControlledPlayer,
    status_path: &Path,
) -> Result<(), PlayerError> {
    match command {
        FifoCommand::PlayPause => player.pause(),
        FifoCommand::Pause => player.hold(),
        FifoCommand::Play => player.resume(),
        FifoCommand::Stop => player.stop(),
        FifoCommand::Next => player.play_next_track(),
        FifoCommand::Prev => player.previous_track(),
        FifoCommand::Seek(delta) => player.seek_relative(delta),
        FifoCommand::SeekTo(secs) => player.seek_absolute(secs),
        FifoCommand::Volume(percent) => player.set_volume(percent),
        FifoCommand::VolumeBy(delta) => player.adjust_volume(delta),
        FifoCommand::Status => {
            let report = status_report(player);
            match serde_json::to_string(&report) {
                Ok(json) => {
                    if let Err(e) = std::fs::write(status_path, json + "\n") {
                        warn!(path = %status_path.display(), "could not write status: {}", e);
                    }
                }
                Err(e) => warn!("could not encode status: {}", e),
            }
            Ok(())
        }
    }
}

pub struct ControlFifo {
    path: PathBuf,
    created: bool,
}

impl ControlFifo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            created: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn status_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".status");
        PathBuf::from(name)
    }

    fn ensure_fifo(&self) -> Result<(), RemoteError> {
        match std::fs::metadata(&self.path) {
            Ok(meta) if meta.file_type().is_fifo() => Ok(()),
            Ok(_) => Err(RemoteError::Unavailable {
                adapter: "control-fifo",
                reason: format!("{} exists and is not a pipe", self.path.display()),
            }),
            Err(_) => {
                nix::unistd::mkfifo(&self.path, Mode::S_IRUSR | Mode::S_IWUSR)?;
                Ok(())
            }
        }
    }
}

impl RemoteAdapter for ControlFifo {
    fn name(&self) -> &'static str {
        "control-fifo"
    }

    fn register(&mut self, player: Arc<dyn ControlledPlayer>) -> Result<(), RemoteError> {
        self.ensure_fifo()?;
        self.created = true;

        // Holding a write end keeps reads from hitting EOF between writers
        let pipe = OpenOptions::new().read(true).write(true).open(&self.path)?;
        let status_path = self.status_path();
        let path = self.path.clone();

        thread::Builder::new()
            .name("control-fifo".to_string())
            .spawn(move || {
                for line in BufReader::new(pipe).lines() {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            warn!(path = %path.display(), "control pipe read failed: {}", e);
                            break;
                        }
                    };
                    if line.trim().is_empty() {
                        continue;
                    }

                    let Some(command) = FifoCommand::parse(&line) else {
                        warn!(%line, "unknown control command");
                        continue;
                    };
                    debug!(?command, "control command");
                    match execute(command, player.as_ref(), &status_path) {
                        Ok(()) => {}
                        Err(PlayerError::ShutDown) => break,
                        Err(e) => warn!(?command, "control command failed: {}", e),
                    }
                }
                debug!("control pipe reader exited");
            })?;

        info!(path = %self.path.display(), "listening for control commands");
        Ok(())
    }
}

impl Drop for ControlFifo {
    fn drop(&mut self) {
        if self.created {
            let _ = std::fs::remove_file(&self.path);
            let _ = std::fs::remove_file(self.status_path());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::backend::fake::{Call, FakeBackend};
    use crate::player::PlaybackEngine;
    use std::io::Write;
    use std::time::{Duration, Instant};

    #[test]
    fn test_parse_commands() {
        assert_eq!(FifoCommand::parse("play-pause"), Some(FifoCommand::PlayPause));
        assert_eq!(FifoCommand::parse("  next "), Some(FifoCommand::Next));
        assert_eq!(FifoCommand::parse("seek -10"), Some(FifoCommand::Seek(-10.0)));
        assert_eq!(FifoCommand::parse("seek-to 95.5"), Some(FifoCommand::SeekTo(95.5)));
        assert_eq!(FifoCommand::parse("volume 40"), Some(FifoCommand::Volume(40)));
        assert_eq!(FifoCommand::parse("volume +5"), Some(FifoCommand::VolumeBy(5)));
        assert_eq!(FifoCommand::parse("volume -5"), Some(FifoCommand::VolumeBy(-5)));

        assert_eq!(FifoCommand::parse("volume loud"), None);
        assert_eq!(FifoCommand::parse("next please"), None);
        assert_eq!(FifoCommand::parse("rewind"), None);
        assert_eq!(FifoCommand::parse(""), None);
    }

    #[test]
    fn test_rejects_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("control");
        std::fs::write(&path, b"").unwrap();

        let (engine, _rx) = PlaybackEngine::detached(Arc::new(FakeBackend::new()));
        let mut fifo = ControlFifo::new(&path);
        assert!(matches!(
            fifo.register(Arc::new(engine)),
            Err(RemoteError::Unavailable { .. })
        ));
        assert!(path.exists());
    }

    #[test]
    fn test_commands_reach_player() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("control");
        let backend = Arc::new(FakeBackend::new());
        let (engine, _rx) = PlaybackEngine::detached(backend.clone());

        let mut fifo = ControlFifo::new(&path);
        fifo.register(Arc::new(engine)).unwrap();

        let mut writer = OpenOptions::new().write(true).open(&path).unwrap();
        writeln!(writer, "volume 30").unwrap();
        writeln!(writer, "bogus").unwrap();
        writeln!(writer, "seek-to 12").unwrap();
        writeln!(writer, "status").unwrap();

        let status_path = fifo.status_path();
        let deadline = Instant::now() + Duration::from_secs(2);
        let written = |p: &Path| {
            std::fs::read_to_string(p)
                .map(|s| s.ends_with('\n'))
                .unwrap_or(false)
        };
        while !written(&status_path) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(
            backend.calls(),
            vec![
                Call::SetVolume(30),
                Call::Seek(12.0, crate::player::SeekMode::Absolute)
            ]
        );
        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&status_path).unwrap()).unwrap();
        assert_eq!(report["state"], "stopped");
        assert_eq!(report["volume"], 30);
    }
}
