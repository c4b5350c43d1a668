use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub mod persistence;
pub mod user;

pub use persistence::PersistentState;
pub use user::{MpvConfig, PlaybackConfig, RemoteConfig, ServerConfig, UserConfig};

pub struct AppConfig;

impl AppConfig {
    pub fn get_config_dir() -> PathBuf {
        let dir = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cadence");

        if !dir.exists() {
            let _ = fs::create_dir_all(&dir);
        }
        dir
    }

    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join("config.toml")
    }

    pub fn get_state_path() -> PathBuf {
        Self::get_config_dir().join("state.toml")
    }

    pub fn get_log_dir() -> PathBuf {
        Self::get_config_dir().join("logs")
    }

    /// Default configuration as written on first run.
    pub fn default_toml() -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(&UserConfig::default())?)
    }

    /// Load both files. `config_path` overrides the default location.
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<(UserConfig, PersistentState)> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::get_config_path);
        let user_config = Self::load_user_config(&config_path)?;
        let state = Self::load_state(&Self::get_state_path());
        Ok((user_config, state))
    }

    /// Parse `path`, creating it with defaults when missing.
    pub fn load_user_config(path: &Path) -> anyhow::Result<UserConfig> {
        if !path.exists() {
            let config = UserConfig::default();
            if let Err(e) = fs::write(path, Self::default_toml()?) {
                warn!(path = %path.display(), "could not write default config: {}", e);
            }
            return Ok(config);
        }

        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Session state is best effort: anything unreadable falls back to defaults.
    pub fn load_state(path: &Path) -> PersistentState {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), "ignoring unreadable state: {}", e);
                PersistentState::default()
            }),
            Err(_) => PersistentState::default(),
        }
    }
}
