use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Automatically saved session state
/// stored in `state.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistentState {
    #[serde(default = "default_volume")]
    pub volume: u8,
}

fn default_volume() -> u8 {
    100
}

impl Default for PersistentState {
    fn default() -> Self {
        Self {
            volume: default_volume(),
        }
    }
}

impl PersistentState {
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&super::AppConfig::get_state_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing {}", path.display()))
    }
}
