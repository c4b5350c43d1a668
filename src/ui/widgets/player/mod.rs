use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders},
    Frame,
};

pub mod controls;
pub mod info;
pub mod progress;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    // --- MUSIC CARD ---
    let title = Line::from(vec![Span::styled(
        format!(" Now Playing · {} ", app.state),
        Style::default().fg(theme.blue).add_modifier(Modifier::BOLD),
    )]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(theme.blue))
        .style(Style::default().bg(Color::Reset));

    let inner = block.inner(area);
    f.render_widget(block, area);

    // Below 8 rows only the title line and the buttons survive
    let constraints = if inner.height < 8 {
        vec![
            Constraint::Min(0),
            Constraint::Length(inner.height.saturating_sub(1).min(1)),
            Constraint::Length(0),
            Constraint::Length(0),
            Constraint::Length(1),
        ]
    } else {
        vec![
            Constraint::Min(0),    // Padding
            Constraint::Length(3), // Info
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Time
            Constraint::Length(3), // Controls
        ]
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    info::render(f, chunks[1], app);
    if chunks[2].height > 0 {
        progress::render_progress(f, chunks[2], app);
    }
    if chunks[3].height > 0 {
        progress::render_time(f, chunks[3], app);
    }
    controls::render(f, chunks[4], app);
}
