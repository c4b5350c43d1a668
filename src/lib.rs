//! Queue-first terminal music player driving mpv over its JSON IPC socket.

pub mod app;
pub mod catalog;
pub mod error;
pub mod logging;
pub mod player;
pub mod remote;
pub mod ui;
