//! Error types for the playback core and its remote surfaces.

use thiserror::Error;

/// Failures talking to the media engine process.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The engine binary could not be launched
    #[error("failed to launch `{binary}`: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The IPC socket never became reachable
    #[error("could not connect to engine socket {path}: {source}")]
    Connect {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Socket read/write errors
    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine answered with an error status
    #[error("engine rejected `{command}`: {message}")]
    Command { command: String, message: String },

    /// No reply arrived in time
    #[error("timed out waiting for reply to `{0}`")]
    Timeout(String),

    /// A line on the wire was not valid JSON
    #[error("malformed engine message: {0}")]
    Protocol(#[from] serde_json::Error),

    /// Property exists but currently has no value (e.g. nothing loaded)
    #[error("property `{0}` is unavailable")]
    Unavailable(&'static str),

    /// The engine has shut down
    #[error("engine connection closed")]
    Closed,
}

/// Errors returned by playback commands.
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A command was issued after `quit()`
    #[error("player has shut down")]
    ShutDown,
}

/// Errors raised while registering a remote control surface.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The transport the adapter needs is not present
    #[error("{adapter} unavailable: {reason}")]
    Unavailable {
        adapter: &'static str,
        reason: String,
    },

    #[error("remote I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote system error: {0}")]
    Nix(#[from] nix::Error),
}

/// Convenience Result type for playback commands
pub type Result<T> = std::result::Result<T, PlayerError>;
