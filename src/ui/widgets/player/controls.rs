use crate::app::App;
use crate::player::PlaybackState;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

const VOLUME_BAR_WIDTH: usize = 20;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    let play_icon = match app.state {
        PlaybackState::Playing => "⏸",
        PlaybackState::Loading => "…",
        PlaybackState::Paused | PlaybackState::Stopped => "▶",
    };
    let btn_style = Style::default().fg(theme.text).add_modifier(Modifier::BOLD);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Buttons
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Volume
        ])
        .split(area);

    let buttons = Line::from(vec![
        Span::styled("   ⏮   ", btn_style),
        Span::raw("   "),
        Span::styled(format!("   {}   ", play_icon), btn_style),
        Span::raw("   "),
        Span::styled("   ⏭   ", btn_style),
    ]);
    f.render_widget(
        Paragraph::new(buttons)
            .alignment(Alignment::Center)
            .block(Block::default()),
        rows[0],
    );

    if rows[2].height == 0 {
        return;
    }

    let filled = (VOLUME_BAR_WIDTH as f64 * app.status.volume as f64 / 100.0).round() as usize;
    let mut bar = vec![Span::styled("- ", Style::default().fg(theme.overlay))];
    bar.extend((0..VOLUME_BAR_WIDTH).map(|i| {
        if i < filled {
            Span::styled("━", Style::default().fg(theme.magenta))
        } else {
            Span::styled("─", Style::default().fg(theme.surface))
        }
    }));
    bar.push(Span::styled(
        format!(" + {:>3}%", app.status.volume),
        Style::default().fg(theme.overlay),
    ));

    f.render_widget(
        Paragraph::new(Line::from(bar))
            .alignment(Alignment::Center)
            .block(Block::default()),
        rows[2],
    );
}
