//! mpv driven over its JSON IPC socket.
//!
//! A reader thread owns the read half of the socket: replies are routed to
//! the caller blocked in [`MpvBackend::command`] by `request_id`, events go
//! into a channel drained by [`MediaBackend::wait_event`].

use super::protocol::{encode_command, parse_line, IpcMessage};
use super::{MediaBackend, SeekMode};
use crate::error::BackendError;
use crate::player::events::{EngineEvent, Property};
use crate::player::lock;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

type Pending = Arc<Mutex<HashMap<u64, Sender<Result<Value, String>>>>>;

#[derive(Debug, Clone)]
pub struct MpvOptions {
    pub binary: String,
    pub socket_path: PathBuf,
    pub extra_args: Vec<String>,
    pub reply_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for MpvOptions {
    fn default() -> Self {
        Self {
            binary: "mpv".to_string(),
            socket_path: std::env::temp_dir()
                .join(format!("cadence-mpv-{}.sock", std::process::id())),
            extra_args: Vec::new(),
            reply_timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

pub struct MpvBackend {
    writer: Mutex<UnixStream>,
    pending: Pending,
    next_request: AtomicU64,
    events: Mutex<Receiver<EngineEvent>>,
    child: Mutex<Option<Child>>,
    socket_path: Option<PathBuf>,
    reply_timeout: Duration,
    terminated: AtomicBool,
}

impl std::fmt::Debug for MpvBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MpvBackend")
            .field("socket_path", &self.socket_path)
            .field("terminated", &self.terminated.load(Ordering::Relaxed))
            .finish()
    }
}

impl MpvBackend {
    /// Launch an idle mpv and connect to its IPC socket.
    pub fn spawn(options: &MpvOptions) -> Result<Self, BackendError> {
        let socket_path = &options.socket_path;
        let _ = std::fs::remove_file(socket_path);

        info!(binary = %options.binary, socket = %socket_path.display(), "spawning mpv");
        let mut child = Command::new(&options.binary)
            .arg("--idle=yes")
            .arg("--no-video")
            .arg("--no-terminal")
            .arg("--audio-display=no")
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .args(&options.extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| BackendError::Spawn {
                binary: options.binary.clone(),
                source,
            })?;

        let stream = match connect_with_retry(socket_path, options.connect_timeout) {
            Ok(stream) => stream,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        Self::attach(
            stream,
            Some(child),
            Some(socket_path.clone()),
            options.reply_timeout,
        )
    }

    /// Attach to an mpv that is already listening on `socket_path`.
    pub fn connect(socket_path: &Path, reply_timeout: Duration) -> Result<Self, BackendError> {
        let stream = UnixStream::connect(socket_path).map_err(|source| BackendError::Connect {
            path: socket_path.display().to_string(),
            source,
        })?;
        Self::attach(stream, None, None, reply_timeout)
    }

    fn attach(
        stream: UnixStream,
        child: Option<Child>,
        socket_path: Option<PathBuf>,
        reply_timeout: Duration,
    ) -> Result<Self, BackendError> {
        let reader = stream.try_clone()?;
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let (event_tx, event_rx) = mpsc::channel();

        let reader_pending = pending.clone();
        thread::Builder::new()
            .name("mpv-ipc-reader".to_string())
            .spawn(move || read_loop(reader, reader_pending, event_tx))?;

        let backend = Self {
            writer: Mutex::new(stream),
            pending,
            next_request: AtomicU64::new(1),
            events: Mutex::new(event_rx),
            child: Mutex::new(child),
            socket_path,
            reply_timeout,
            terminated: AtomicBool::new(false),
        };

        for (id, property) in Property::OBSERVED.iter().enumerate() {
            backend.command(&[
                json!("observe_property"),
                json!(id + 1),
                json!(property.name()),
            ])?;
        }

        Ok(backend)
    }

    /// Send one command and block for its reply.
    pub fn command(&self, args: &[Value]) -> Result<Value, BackendError> {
        if self.terminated.load(Ordering::SeqCst) {
            return Err(BackendError::Closed);
        }

        let name = args
            .first()
            .and_then(Value::as_str)
            .unwrap_or("?")
            .to_string();
        let request_id = self.next_request.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel();
        lock(&self.pending).insert(request_id, tx);

        let line = encode_command(request_id, args);
        trace!(request_id, command = %name, "mpv request");
        if let Err(e) = lock(&self.writer).write_all(line.as_bytes()) {
            lock(&self.pending).remove(&request_id);
            return Err(e.into());
        }

        match rx.recv_timeout(self.reply_timeout) {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(message)) => Err(BackendError::Command {
                command: name,
                message,
            }),
            Err(RecvTimeoutError::Timeout) => {
                lock(&self.pending).remove(&request_id);
                Err(BackendError::Timeout(name))
            }
            Err(RecvTimeoutError::Disconnected) => Err(BackendError::Closed),
        }
    }

    fn get_property(&self, property: Property) -> Result<Value, BackendError> {
        match self.command(&[json!("get_property"), json!(property.name())]) {
            Ok(Value::Null) => Err(BackendError::Unavailable(property.name())),
            Ok(value) => Ok(value),
            Err(BackendError::Command { message, .. }) if message == "property unavailable" => {
                Err(BackendError::Unavailable(property.name()))
            }
            Err(e) => Err(e),
        }
    }

    fn set_property(&self, property: Property, value: Value) -> Result<(), BackendError> {
        self.command(&[json!("set_property"), json!(property.name()), value])
            .map(|_| ())
    }
}

impl MediaBackend for MpvBackend {
    fn load(&self, locator: &str) -> Result<(), BackendError> {
        self.command(&[json!("loadfile"), json!(locator), json!("replace")])
            .map(|_| ())
    }

    fn stop(&self) -> Result<(), BackendError> {
        self.command(&[json!("stop")]).map(|_| ())
    }

    fn set_pause(&self, paused: bool) -> Result<(), BackendError> {
        self.set_property(Property::Pause, json!(paused))
    }

    fn seek(&self, seconds: f64, mode: SeekMode) -> Result<(), BackendError> {
        self.command(&[json!("seek"), json!(seconds), json!(mode.as_str())])
            .map(|_| ())
    }

    fn set_volume(&self, percent: u8) -> Result<(), BackendError> {
        self.set_property(Property::Volume, json!(percent))
    }

    fn get_flag(&self, property: Property) -> Result<bool, BackendError> {
        self.get_property(property)?
            .as_bool()
            .ok_or(BackendError::Unavailable(property.name()))
    }

    fn get_number(&self, property: Property) -> Result<f64, BackendError> {
        self.get_property(property)?
            .as_f64()
            .ok_or(BackendError::Unavailable(property.name()))
    }

    fn wait_event(&self, timeout: Duration) -> Result<Option<EngineEvent>, BackendError> {
        match lock(&self.events).recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(BackendError::Closed),
        }
    }

    fn terminate(&self) {
        if self.terminated.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("terminating mpv");

        {
            let mut writer = lock(&self.writer);
            let _ = writer.write_all(encode_command(0, &[json!("quit")]).as_bytes());
            let _ = writer.shutdown(Shutdown::Both);
        }

        if let Some(mut child) = lock(&self.child).take() {
            if !wait_for_exit(&mut child, Duration::from_millis(500)) {
                let pid = Pid::from_raw(child.id() as i32);
                if let Err(e) = signal::kill(pid, Signal::SIGTERM) {
                    debug!("SIGTERM to mpv failed: {}", e);
                }
                if !wait_for_exit(&mut child, Duration::from_millis(200)) {
                    warn!("mpv ignored quit, killing it");
                    let _ = child.kill();
                    let _ = child.wait();
                }
            }
        }

        if let Some(path) = &self.socket_path {
            let _ = std::fs::remove_file(path);
        }
    }
}

impl Drop for MpvBackend {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Poll the child until it exits or `timeout` passes.
fn wait_for_exit(child: &mut Child, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(_)) => return true,
            Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(20)),
            _ => return false,
        }
    }
}

fn connect_with_retry(path: &Path, timeout: Duration) -> Result<UnixStream, BackendError> {
    let deadline = Instant::now() + timeout;
    loop {
        match UnixStream::connect(path) {
            Ok(stream) => return Ok(stream),
            Err(source) if Instant::now() >= deadline => {
                return Err(BackendError::Connect {
                    path: path.display().to_string(),
                    source,
                })
            }
            Err(_) => thread::sleep(Duration::from_millis(50)),
        }
    }
}

fn read_loop(stream: UnixStream, pending: Pending, events: Sender<EngineEvent>) {
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                debug!("mpv socket read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(&line) {
            Ok(IpcMessage::Reply { request_id, result }) => {
                if let Some(tx) = lock(&pending).remove(&request_id) {
                    let _ = tx.send(result);
                }
            }
            Ok(IpcMessage::Event(event)) => {
                trace!(?event, "mpv event");
                if events.send(event).is_err() {
                    break;
                }
            }
            Ok(IpcMessage::Ignored) => trace!(%line, "mpv message ignored"),
            Err(e) => warn!("{}", e),
        }
    }

    // Dropping the senders wakes every caller still waiting for a reply
    lock(&pending).clear();
    let _ = events.send(EngineEvent::Shutdown);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Answers like mpv would: volume is 55, pause is unavailable,
    /// loadfile is followed by a start-file event.
    fn fake_mpv(stream: UnixStream) {
        let mut writer = stream.try_clone().unwrap();
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let Ok(line) = line else { break };
            let request: Value = serde_json::from_str(&line).unwrap();
            let id = request["request_id"].clone();
            let command = request["command"][0].as_str().unwrap_or_default().to_string();
            let reply = match (command.as_str(), request["command"][1].as_str()) {
                ("get_property", Some("volume")) => {
                    json!({"request_id": id, "error": "success", "data": 55.0})
                }
                ("get_property", Some("pause")) => {
                    json!({"request_id": id, "error": "property unavailable"})
                }
                ("quit", _) => break,
                _ => json!({"request_id": id, "error": "success"}),
            };
            writeln!(writer, "{}", reply).unwrap();
            if command == "loadfile" {
                writeln!(writer, "{}", json!({"event": "start-file"})).unwrap();
            }
        }
    }

    fn attached() -> MpvBackend {
        let (ours, theirs) = UnixStream::pair().unwrap();
        thread::spawn(move || fake_mpv(theirs));
        MpvBackend::attach(ours, None, None, Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_property_reads() {
        let backend = attached();
        assert_eq!(backend.get_number(Property::Volume).unwrap(), 55.0);
        assert!(matches!(
            backend.get_flag(Property::Pause),
            Err(BackendError::Unavailable("pause"))
        ));
    }

    #[test]
    fn test_load_produces_start_event() {
        let backend = attached();
        backend.load("/music/a.flac").unwrap();
        let event = backend.wait_event(Duration::from_secs(2)).unwrap();
        assert_eq!(event, Some(EngineEvent::StartFile));
    }

    #[test]
    fn test_terminate_is_idempotent() {
        let backend = attached();
        backend.terminate();
        backend.terminate();
        assert!(matches!(backend.stop(), Err(BackendError::Closed)));
    }
}
