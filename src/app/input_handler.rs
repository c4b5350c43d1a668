use crate::app::keys::Action;
use crate::app::App;
use crate::error::PlayerError;
use crate::player::PlaybackEngine;
use crossterm::event::KeyEvent;
use tracing::debug;

/// Dispatch one key press to the player and refresh the mirrored queue.
pub fn handle_key(key: KeyEvent, app: &mut App, player: &PlaybackEngine) {
    let Some(action) = app.keys.action_for(key) else {
        return;
    };
    debug!(?action, "key action");

    // Close popups first, then quit (Neovim-style)
    if action == Action::Quit {
        if app.show_keyhints {
            app.show_keyhints = false;
        } else {
            app.is_running = false;
        }
        return;
    }

    let volume_step = app.playback.volume_step as i64;
    let seek_step = app.playback.seek_step_secs as f64;

    let result: Result<Option<String>, PlayerError> = match action {
        Action::Quit => Ok(None),
        Action::PlayPause => player.pause().map(|_| None),
        Action::Stop => player.stop().map(|_| Some("⏹ Stopped".to_string())),
        Action::NextTrack => player
            .play_next_track()
            .map(|_| Some("⏭ Next Track".to_string())),
        Action::PrevTrack => player
            .previous_track()
            .map(|_| Some("⏮ Restart Track".to_string())),
        Action::VolumeUp => player
            .adjust_volume(volume_step)
            .map(|_| Some(format!("🔊 Volume: {}%", player.status().volume))),
        Action::VolumeDown => player
            .adjust_volume(-volume_step)
            .map(|_| Some(format!("🔉 Volume: {}%", player.status().volume))),
        Action::SeekForward => player.seek_relative(seek_step).map(|_| None),
        Action::SeekBackward => player.seek_relative(-seek_step).map(|_| None),
        Action::NavUp => {
            app.cursor_up();
            Ok(None)
        }
        Action::NavDown => {
            app.cursor_down();
            Ok(None)
        }
        Action::PlaySelected => match app.selected().cloned() {
            Some(item) => player.play(item).map(|_| None),
            None => Ok(None),
        },
        Action::MoveUp => {
            let index = app.cursor;
            let moved = player.move_song_up(index);
            if moved.is_ok() {
                app.cursor_up();
            }
            moved.map(|_| None)
        }
        Action::MoveDown => {
            let index = app.cursor;
            let moved = player.move_song_down(index);
            if moved.is_ok() && index + 1 < app.queue.len() {
                app.cursor += 1;
            }
            moved.map(|_| None)
        }
        Action::DeleteItem => player
            .delete_queue_item(app.cursor)
            .map(|_| Some("🗑 Removed".to_string())),
        Action::Shuffle => player.shuffle().map(|_| Some("🔀 Shuffled".to_string())),
        Action::ClearQueue => player
            .clear_queue()
            .map(|_| Some("🧹 Queue cleared".to_string())),
        Action::ToggleHelp => {
            app.show_keyhints = !app.show_keyhints;
            Ok(None)
        }
    };

    match result {
        Ok(Some(message)) => app.show_toast(&message),
        Ok(None) => {}
        Err(e) => app.show_toast(&format!("⚠ {}", e)),
    }
    app.sync_queue(player.queue());
}
