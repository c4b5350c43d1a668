use crate::app::App;
use crate::ui::utils::truncate;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let max_width = area.width.saturating_sub(4) as usize;

    let lines = match &app.track {
        Some(track) => {
            let mut lines = vec![Line::from(Span::styled(
                format!("🎵 {}", truncate(&track.title, max_width.saturating_sub(2))),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ))];
            if !track.artist.is_empty() {
                lines.push(Line::from(vec![
                    Span::raw("🎤 "),
                    Span::styled(
                        truncate(&track.artist, max_width.saturating_sub(2)),
                        Style::default().fg(theme.magenta),
                    ),
                ]));
            }
            if !track.album.is_empty() {
                let album = if track.year > 0 {
                    format!("{} ({})", track.album, track.year)
                } else {
                    track.album.clone()
                };
                lines.push(Line::from(vec![
                    Span::raw("💿 "),
                    Span::styled(
                        truncate(&album, max_width.saturating_sub(2)),
                        Style::default().fg(theme.cyan).add_modifier(Modifier::DIM),
                    ),
                ]));
            }
            lines
        }
        None => vec![Line::from(Span::styled(
            "Nothing playing",
            Style::default().fg(theme.overlay),
        ))],
    };

    let info = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().style(Style::default().bg(Color::Reset)));
    f.render_widget(info, area);
}
