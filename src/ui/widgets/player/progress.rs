use crate::app::App;
use crate::ui::utils::format_time;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

/// Filled share of the bar, 0 when the length is still unknown.
pub fn ratio(position: f64, duration: f64) -> f64 {
    if duration > 0.0 {
        (position / duration).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub fn render_progress(f: &mut Frame, area: Rect, app: &App) {
    if app.track.is_none() {
        return;
    }
    let theme = &app.theme;

    let gauge_area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Percentage(80),
            Constraint::Percentage(10),
        ])
        .split(area)[1];

    let width = gauge_area.width as usize;
    let occupied = (width as f64 * ratio(app.status.position, app.status.duration)) as usize;
    let fill_style = Style::default().fg(theme.magenta);
    let empty_style = Style::default().fg(theme.surface);

    let bar: Vec<Span> = (0..width)
        .map(|i| {
            if i + 1 == occupied {
                Span::styled("●", fill_style)
            } else if i < occupied {
                Span::styled("━", fill_style)
            } else {
                Span::styled("─", empty_style)
            }
        })
        .collect();

    let gauge = Paragraph::new(Line::from(bar))
        .alignment(Alignment::Left)
        .block(Block::default().style(Style::default().bg(Color::Reset)));
    f.render_widget(gauge, gauge_area);
}

pub fn render_time(f: &mut Frame, area: Rect, app: &App) {
    if app.track.is_none() {
        return;
    }
    let time = format!(
        "{} / {}",
        format_time(app.status.position),
        format_time(app.status.duration)
    );
    let label = Paragraph::new(time)
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.overlay));
    f.render_widget(label, area);
}
