use crate::app::App;
use crate::player::PlaybackState;
use crate::ui::utils::{format_time, truncate};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

/// First visible row, keeping the cursor roughly centred.
pub fn scroll_offset(cursor: usize, len: usize, rows: usize) -> usize {
    cursor
        .saturating_sub(rows / 2)
        .min(len.saturating_sub(rows))
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(Line::from(Span::styled(
            format!(" Queue · {} ", app.queue.len()),
            Style::default().fg(theme.green).add_modifier(Modifier::BOLD),
        )))
        .border_style(Style::default().fg(theme.surface))
        .style(Style::default().bg(Color::Reset));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.queue.is_empty() {
        let hint = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("Empty queue", Style::default().fg(theme.overlay))),
            Line::from(Span::styled(
                "Pass tracks on the command line to add them",
                Style::default().fg(theme.surface),
            )),
        ])
        .alignment(Alignment::Center);
        f.render_widget(hint, inner);
        return;
    }

    let width = inner.width as usize;
    let time_w = 7;
    let artist_w = width / 4;
    let title_w = width.saturating_sub(artist_w + time_w + 10);
    let rows = inner.height as usize;
    let start = scroll_offset(app.cursor, app.queue.len(), rows);
    let head_active = app.state != PlaybackState::Stopped;

    let green = theme.green;
    let pink = theme.red;
    let muted = theme.overlay;

    let lines: Vec<Line> = app
        .queue
        .iter()
        .enumerate()
        .skip(start)
        .take(rows)
        .map(|(idx, item)| {
            let is_sel = idx == app.cursor;
            let is_current = idx == 0 && head_active;

            // ● cursor, ◉ loaded head, ○ everything else
            let (marker, marker_color, title_style, other_style) = if is_sel {
                (
                    "●",
                    theme.yellow,
                    Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
                    Style::default().fg(theme.text),
                )
            } else if is_current {
                ("◉", pink, Style::default().fg(pink), Style::default().fg(pink))
            } else {
                (
                    "○",
                    theme.surface,
                    Style::default().fg(theme.text),
                    Style::default().fg(muted),
                )
            };

            let title = truncate(&item.title, title_w.saturating_sub(2));
            let artist = truncate(&item.artist, artist_w.saturating_sub(1));
            let time = if item.duration > 0 {
                format_time(item.duration as f64)
            } else {
                String::new()
            };

            Line::from(vec![
                Span::styled(format!(" {} ", marker), Style::default().fg(marker_color)),
                Span::styled(
                    format!("{:>2}  ", idx + 1),
                    Style::default().fg(if is_sel { green } else { muted }),
                ),
                Span::styled(
                    format!("{:w$}", title, w = title_w.saturating_sub(2)),
                    title_style,
                ),
                Span::styled(format!("{:w$}", artist, w = artist_w), other_style),
                Span::styled(format!("{:>w$}", time, w = time_w), other_style),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_offset() {
        assert_eq!(scroll_offset(0, 50, 10), 0);
        assert_eq!(scroll_offset(20, 50, 10), 15);
        assert_eq!(scroll_offset(49, 50, 10), 40);
        assert_eq!(scroll_offset(3, 5, 10), 0);
    }
}
