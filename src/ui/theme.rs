use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub base: Color,
    pub surface: Color,
    pub overlay: Color,
    pub text: Color,
    pub red: Color,
    pub green: Color,
    pub yellow: Color,
    pub blue: Color,
    pub magenta: Color,
    pub cyan: Color,
}

impl Default for Theme {
    /// Catppuccin Mocha
    fn default() -> Self {
        Self {
            base: Color::Rgb(30, 30, 46),
            surface: Color::Rgb(49, 50, 68),
            overlay: Color::Rgb(108, 112, 134),
            text: Color::Rgb(205, 214, 244),
            red: Color::Rgb(243, 139, 168),
            green: Color::Rgb(166, 227, 161),
            yellow: Color::Rgb(249, 226, 175),
            blue: Color::Rgb(137, 180, 250),
            magenta: Color::Rgb(203, 166, 247),
            cyan: Color::Rgb(148, 226, 213),
        }
    }
}

// Theme files nest everything under [theme]
#[derive(Serialize, Deserialize)]
struct ThemeFile {
    theme: Theme,
}

/// Read `theme.toml`, accepting both the nested and the flat layout.
pub fn load_theme(path: &Path) -> Theme {
    let Ok(content) = fs::read_to_string(path) else {
        return Theme::default();
    };
    if let Ok(wrapper) = toml::from_str::<ThemeFile>(&content) {
        return wrapper.theme;
    }
    match toml::from_str::<Theme>(&content) {
        Ok(theme) => theme,
        Err(e) => {
            warn!(path = %path.display(), "ignoring invalid theme: {}", e);
            Theme::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_layouts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.toml");
        assert_eq!(load_theme(&path), Theme::default());

        let mut custom = Theme::default();
        custom.blue = Color::Rgb(1, 2, 3);
        let nested = toml::to_string(&ThemeFile { theme: custom.clone() }).unwrap();
        fs::write(&path, nested).unwrap();
        assert_eq!(load_theme(&path), custom);

        fs::write(&path, toml::to_string(&custom).unwrap()).unwrap();
        assert_eq!(load_theme(&path), custom);
    }
}
