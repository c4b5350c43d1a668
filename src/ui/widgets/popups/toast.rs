use crate::app::App;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};

const SLIDE: Duration = Duration::from_millis(300);

/// Horizontal offset from the resting position: slides in, holds, slides out.
pub fn slide_offset(width: u16, since_start: Duration, until_deadline: Duration) -> u16 {
    if since_start < SLIDE {
        let t = since_start.as_secs_f32() / SLIDE.as_secs_f32();
        let ease = 1.0 - (1.0 - t).powi(3); // Cubic Out
        (width as f32 * (1.0 - ease)) as u16
    } else if until_deadline < SLIDE {
        let t = 1.0 - until_deadline.as_secs_f32() / SLIDE.as_secs_f32();
        let ease = t.powi(3); // Cubic In
        (width as f32 * ease) as u16
    } else {
        0
    }
}

pub fn render(f: &mut Frame, app: &App) {
    let Some(toast) = &app.toast else {
        return;
    };
    let theme = &app.theme;
    let now = Instant::now();
    let screen = f.area();

    let width = (toast.message.chars().count() as u16 + 6).min(screen.width.saturating_sub(4));
    let x = screen.width.saturating_sub(width + 1)
        + slide_offset(
            width,
            now.duration_since(toast.start_time),
            toast.deadline.saturating_duration_since(now),
        );
    if x >= screen.width {
        return;
    }

    // Clip to screen bounds
    let area = Rect::new(x, 1, width, 3).intersection(screen);
    if area.is_empty() {
        return;
    }
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.blue))
        .style(Style::default().bg(Color::Reset));
    let text = Paragraph::new(Line::from(Span::styled(
        toast.message.as_str(),
        Style::default().fg(theme.blue).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(block);
    f.render_widget(text, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_offset() {
        let long = Duration::from_secs(2);
        assert_eq!(slide_offset(20, Duration::ZERO, long), 20);
        assert_eq!(slide_offset(20, Duration::from_secs(1), long), 0);
        assert_eq!(slide_offset(20, Duration::from_secs(1), Duration::ZERO), 20);
    }
}
