use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

/// Everything a key can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    PlayPause,
    Stop,
    NextTrack,
    PrevTrack,
    VolumeUp,
    VolumeDown,
    SeekForward,
    SeekBackward,
    NavUp,
    NavDown,
    PlaySelected,
    MoveUp,
    MoveDown,
    DeleteItem,
    Shuffle,
    ClearQueue,
    ToggleHelp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    // Transport
    pub quit: String,
    pub play_pause: String,
    pub stop: String,
    pub next_track: String,
    pub prev_track: String,
    pub volume_up: String,
    pub volume_down: String,
    pub seek_forward: String,
    pub seek_backward: String,

    // Queue
    pub nav_up: String,
    pub nav_up_alt: String,
    pub nav_down: String,
    pub nav_down_alt: String,
    pub play_selected: String,
    pub move_up: String,
    pub move_down: String,
    pub delete_item: String,
    pub shuffle: String,
    pub clear_queue: String,

    pub toggle_help: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            play_pause: "Space".to_string(),
            stop: "s".to_string(),
            next_track: "n".to_string(),
            prev_track: "p".to_string(),
            volume_up: "+".to_string(),
            volume_down: "-".to_string(),
            seek_forward: "l".to_string(),
            seek_backward: "h".to_string(),

            nav_up: "k".to_string(),
            nav_up_alt: "Up".to_string(),
            nav_down: "j".to_string(),
            nav_down_alt: "Down".to_string(),
            play_selected: "Enter".to_string(),
            move_up: "K".to_string(),
            move_down: "J".to_string(),
            delete_item: "d".to_string(),
            shuffle: "z".to_string(),
            clear_queue: "C".to_string(),

            toggle_help: "?".to_string(),
        }
    }
}

impl KeyConfig {
    pub fn matches(&self, event: KeyEvent, key_str: &str) -> bool {
        match key_str {
            "Space" => event.code == KeyCode::Char(' '),
            "Enter" => event.code == KeyCode::Enter,
            "Backspace" => event.code == KeyCode::Backspace,
            "Esc" => event.code == KeyCode::Esc,
            "Tab" => event.code == KeyCode::Tab,
            "BackTab" => event.code == KeyCode::BackTab,
            "Up" => event.code == KeyCode::Up,
            "Down" => event.code == KeyCode::Down,
            "Left" => event.code == KeyCode::Left,
            "Right" => event.code == KeyCode::Right,
            s if s.chars().count() == 1 => match s.chars().next() {
                // Terminals report Shift+j as either 'J' or 'j' with SHIFT
                Some(ch) if ch.is_uppercase() => {
                    event.code == KeyCode::Char(ch)
                        || (event.code == KeyCode::Char(ch.to_ascii_lowercase())
                            && event.modifiers.contains(KeyModifiers::SHIFT))
                }
                Some(ch) => {
                    event.code == KeyCode::Char(ch)
                        && (!ch.is_alphabetic() || !event.modifiers.contains(KeyModifiers::SHIFT))
                }
                None => false,
            },
            _ => false,
        }
    }

    /// First action bound to `event`, in declaration order.
    pub fn action_for(&self, event: KeyEvent) -> Option<Action> {
        self.bindings()
            .into_iter()
            .find(|(key, _)| self.matches(event, key))
            .map(|(_, action)| action)
    }

    /// (key, action) pairs; also drives the help overlay.
    pub fn bindings(&self) -> Vec<(&str, Action)> {
        vec![
            (self.quit.as_str(), Action::Quit),
            (self.play_pause.as_str(), Action::PlayPause),
            (self.stop.as_str(), Action::Stop),
            (self.next_track.as_str(), Action::NextTrack),
            (self.prev_track.as_str(), Action::PrevTrack),
            (self.volume_up.as_str(), Action::VolumeUp),
            (self.volume_down.as_str(), Action::VolumeDown),
            (self.seek_forward.as_str(), Action::SeekForward),
            (self.seek_backward.as_str(), Action::SeekBackward),
            (self.nav_up.as_str(), Action::NavUp),
            (self.nav_up_alt.as_str(), Action::NavUp),
            (self.nav_down.as_str(), Action::NavDown),
            (self.nav_down_alt.as_str(), Action::NavDown),
            (self.play_selected.as_str(), Action::PlaySelected),
            (self.move_up.as_str(), Action::MoveUp),
            (self.move_down.as_str(), Action::MoveDown),
            (self.delete_item.as_str(), Action::DeleteItem),
            (self.shuffle.as_str(), Action::Shuffle),
            (self.clear_queue.as_str(), Action::ClearQueue),
            (self.toggle_help.as_str(), Action::ToggleHelp),
        ]
    }

    // Helper for UI display
    pub fn display(&self, key_str: &str) -> String {
        match key_str {
            "Space" => "Space".to_string(),
            "Up" => "↑".to_string(),
            "Down" => "↓".to_string(),
            "Left" => "←".to_string(),
            "Right" => "→".to_string(),
            "BackTab" => "S-Tab".to_string(),
            "Backspace" => "Bksp".to_string(),
            _ => key_str.to_string(),
        }
    }
}

impl Action {
    pub fn describe(self) -> &'static str {
        match self {
            Action::Quit => "Quit",
            Action::PlayPause => "Play / pause",
            Action::Stop => "Stop",
            Action::NextTrack => "Next track",
            Action::PrevTrack => "Restart track",
            Action::VolumeUp => "Volume up",
            Action::VolumeDown => "Volume down",
            Action::SeekForward => "Seek forward",
            Action::SeekBackward => "Seek backward",
            Action::NavUp => "Cursor up",
            Action::NavDown => "Cursor down",
            Action::PlaySelected => "Play selected",
            Action::MoveUp => "Move item up",
            Action::MoveDown => "Move item down",
            Action::DeleteItem => "Remove item",
            Action::Shuffle => "Shuffle queue",
            Action::ClearQueue => "Clear queue",
            Action::ToggleHelp => "Toggle help",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_default_bindings() {
        let keys = KeyConfig::default();
        assert_eq!(
            keys.action_for(key(KeyCode::Char(' '), KeyModifiers::NONE)),
            Some(Action::PlayPause)
        );
        assert_eq!(
            keys.action_for(key(KeyCode::Down, KeyModifiers::NONE)),
            Some(Action::NavDown)
        );
        assert_eq!(
            keys.action_for(key(KeyCode::Char('+'), KeyModifiers::SHIFT)),
            Some(Action::VolumeUp)
        );
        assert_eq!(keys.action_for(key(KeyCode::Char('x'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_shifted_letters() {
        let keys = KeyConfig::default();
        assert_eq!(
            keys.action_for(key(KeyCode::Char('J'), KeyModifiers::SHIFT)),
            Some(Action::MoveDown)
        );
        assert_eq!(
            keys.action_for(key(KeyCode::Char('j'), KeyModifiers::SHIFT)),
            Some(Action::MoveDown)
        );
        assert_eq!(
            keys.action_for(key(KeyCode::Char('j'), KeyModifiers::NONE)),
            Some(Action::NavDown)
        );
    }

    #[test]
    fn test_display() {
        let keys = KeyConfig::default();
        assert_eq!(keys.display("Up"), "↑");
        assert_eq!(keys.display("q"), "q");
    }
}
