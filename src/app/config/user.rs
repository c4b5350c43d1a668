use crate::app::keys::KeyConfig;
use crate::catalog::SubsonicLocator;
use crate::player::MpvOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// User-editable configuration (read-only after load)
/// stored in `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub mpv: MpvConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub keys: KeyConfig,
}

/// Subsonic-compatible catalog. Leave `url` empty to play only files and URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub client_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            client_name: "cadence".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn locator(&self) -> Option<SubsonicLocator> {
        if self.url.trim().is_empty() {
            return None;
        }
        match SubsonicLocator::new(&self.url, &self.username, &self.password, &self.client_name) {
            Ok(locator) => Some(locator),
            Err(e) => {
                tracing::warn!(url = %self.url, "invalid server url: {}", e);
                None
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MpvConfig {
    pub binary: String,
    /// Defaults to a per-process socket in the temp dir
    pub socket_path: Option<PathBuf>,
    pub extra_args: Vec<String>,
    pub reply_timeout_ms: u64,
}

impl Default for MpvConfig {
    fn default() -> Self {
        Self {
            binary: "mpv".to_string(),
            socket_path: None,
            extra_args: Vec::new(),
            reply_timeout_ms: 2000,
        }
    }
}

impl MpvConfig {
    pub fn options(&self) -> MpvOptions {
        let defaults = MpvOptions::default();
        MpvOptions {
            binary: self.binary.clone(),
            socket_path: self.socket_path.clone().unwrap_or(defaults.socket_path),
            extra_args: self.extra_args.clone(),
            reply_timeout: Duration::from_millis(self.reply_timeout_ms.max(1)),
            connect_timeout: defaults.connect_timeout,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub volume_step: u8,
    pub seek_step_secs: u32,
    /// Capacity of the player -> UI event channel
    pub ui_event_buffer: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume_step: 5,
            seek_step_secs: 10,
            ui_event_buffer: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub tmux_status: bool,
    pub control_fifo: Option<PathBuf>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            tmux_status: true,
            control_fifo: None,
        }
    }
}
