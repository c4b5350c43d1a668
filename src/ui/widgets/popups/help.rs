use crate::app::keys::Action;
use crate::app::App;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

/// Bindings grouped per action, so `k/↑` shares one row.
pub fn rows(app: &App) -> Vec<(String, &'static str)> {
    let mut rows: Vec<(Action, Vec<String>)> = Vec::new();
    for (key, action) in app.keys.bindings() {
        let shown = app.keys.display(key);
        match rows.iter_mut().find(|(a, _)| *a == action) {
            Some((_, keys)) => keys.push(shown),
            None => rows.push((action, vec![shown])),
        }
    }
    rows.into_iter()
        .map(|(action, keys)| (keys.join("/"), action.describe()))
        .collect()
}

pub fn render(f: &mut Frame, app: &App) {
    let theme = &app.theme;

    // 🎹 WhichKey-style floating popup
    let entries = rows(app);
    let lines: Vec<Line> = entries
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(
                    format!(" {:<7} ", key),
                    Style::default().fg(theme.green).add_modifier(Modifier::BOLD),
                ),
                Span::styled("  ", Style::default().fg(theme.overlay)),
                Span::styled(*desc, Style::default().fg(theme.text)),
            ])
        })
        .collect();

    let content_width = entries
        .iter()
        .map(|(k, d)| 2 + k.chars().count().max(7) + 2 + d.len())
        .max()
        .unwrap_or(20);

    let max_height = f.area().height.saturating_sub(4);
    let popup_height = (lines.len() as u16 + 2).min(max_height);
    let popup_width = (content_width as u16 + 4).min(f.area().width.saturating_sub(2));

    // Bottom-right, above the footer hint
    let popup_x = f.area().width.saturating_sub(popup_width + 1);
    let popup_y = f.area().height.saturating_sub(popup_height + 2);
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    f.render_widget(Clear, popup_area);

    let popup = Paragraph::new(lines).alignment(Alignment::Left).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.blue))
            .title(" Keys ")
            .title_alignment(Alignment::Left)
            .style(Style::default().bg(Color::Reset)),
    );
    f.render_widget(popup, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::UserConfig;

    #[test]
    fn test_alternate_keys_share_a_row() {
        let app = App::new(&UserConfig::default());
        let rows = rows(&app);
        assert!(rows.contains(&("k/↑".to_string(), "Cursor up")));
        assert!(rows.contains(&("Space".to_string(), "Play / pause")));
        assert_eq!(rows.iter().filter(|(_, d)| *d == "Cursor down").count(), 1);
    }
}
