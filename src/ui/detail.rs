use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::screens::DetailScreen;
use crate::storage::KeyValueStore;

use super::lines::detail_lines;

/// Render the detail view, or its placeholder when opened without an item.
pub fn render<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let detail = &app.detail;
    let text = match detail.item() {
        Ok(item) => Text::from(detail_lines(item, detail.is_favorite())),
        Err(_) => Text::from(Line::styled(
            DetailScreen::<S>::PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        )),
    };

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Detail"))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
