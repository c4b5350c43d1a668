use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct MainLayout {
    pub body_area: Rect,
    pub footer_area: Rect,
}

pub fn get_main_layout(area: Rect) -> MainLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(area);

    MainLayout {
        body_area: chunks[0],
        footer_area: chunks[1],
    }
}

pub struct ContentLayout {
    pub card: Rect,
    pub queue: Option<Rect>,
}

/// Card and queue side by side when wide, stacked when tall, card only when cramped.
pub fn get_content_layout(area: Rect) -> ContentLayout {
    if area.width >= 90 {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Min(30)])
            .split(area);
        ContentLayout {
            card: chunks[0],
            queue: Some(chunks[1]),
        }
    } else if area.height >= 24 {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(11), Constraint::Min(0)])
            .split(area);
        ContentLayout {
            card: chunks[0],
            queue: Some(chunks[1]),
        }
    } else {
        ContentLayout {
            card: area,
            queue: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_layout_modes() {
        let wide = get_content_layout(Rect::new(0, 0, 120, 30));
        assert!(wide.queue.is_some_and(|q| q.x > 0));

        let tall = get_content_layout(Rect::new(0, 0, 60, 40));
        assert!(tall.queue.is_some_and(|q| q.y > 0));

        let cramped = get_content_layout(Rect::new(0, 0, 60, 12));
        assert!(cramped.queue.is_none());
    }
}
