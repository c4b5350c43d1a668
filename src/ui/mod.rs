pub mod layout;
pub mod theme;
pub mod utils;
pub mod widgets;

pub use theme::Theme;

use crate::app::App;
use ratatui::{
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn ui(f: &mut Frame, app: &App) {
    let main_layout = layout::get_main_layout(f.area());
    let content = layout::get_content_layout(main_layout.body_area);

    widgets::player::render(f, content.card, app);
    if let Some(queue_area) = content.queue {
        widgets::queue::render(f, queue_area, app);
    }

    // Footer hint, hidden while the help popup is open
    if !app.show_keyhints {
        let theme = &app.theme;
        let hint = Line::from(vec![
            Span::styled(
                " ? ",
                Style::default().fg(theme.overlay).add_modifier(Modifier::BOLD),
            ),
            Span::styled("keys", Style::default().fg(theme.overlay)),
        ]);
        f.render_widget(
            Paragraph::new(hint).alignment(Alignment::Right),
            main_layout.footer_area,
        );
    }

    widgets::popups::render(f, app);
}
