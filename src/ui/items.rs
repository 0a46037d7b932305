use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::catalog::FlaggedItem;
use crate::screens::{FavoritesScreen, FeaturedScreen};
use crate::storage::KeyValueStore;

use super::lines::{category_line, item_line, load_state_line};

/// Columns taken by everything on a row except the name.
const ROW_CHROME: u16 = 28;

fn panel(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title)
}

/// Render an item list, or `empty_text` when there are no rows.
fn render_rows(
    f: &mut Frame,
    area: Rect,
    title: String,
    rows: &[FlaggedItem<'_>],
    selected: usize,
    empty_text: &str,
) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    if rows.is_empty() {
        let paragraph = Paragraph::new(Line::styled(
            empty_text.to_string(),
            Style::default().fg(Color::DarkGray),
        ))
        .block(panel(title));
        f.render_widget(paragraph, area);
        return;
    }

    let name_width = area.width.saturating_sub(ROW_CHROME).max(8) as usize;
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| ListItem::new(item_line(row, name_width)))
        .collect();

    let list = List::new(items)
        .block(panel(title))
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}

/// Split off one line above `area` for the catalog load state, if any.
fn with_load_state(f: &mut Frame, area: Rect, line: Option<Line<'static>>) -> Rect {
    let Some(line) = line else {
        return area;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    f.render_widget(Paragraph::new(line), chunks[0]);
    chunks[1]
}

/// Category bar plus the filtered catalog.
pub fn render_home<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let home = &app.home;
    let bar = Paragraph::new(category_line(home.categories(), home.selected_category()))
        .block(Block::default().borders(Borders::ALL).title("Categories"));
    f.render_widget(bar, chunks[0]);

    let list_area = with_load_state(f, chunks[1], load_state_line(home.load_state()));
    let rows = home.visible();
    render_rows(
        f,
        list_area,
        format!("Items ({})", rows.len()),
        &rows,
        app.selected,
        "No items in this category",
    );
}

pub fn render_favorites<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let favorites = app.favorites.favorites();
    let rows: Vec<FlaggedItem<'_>> = favorites
        .iter()
        .map(|item| FlaggedItem {
            item,
            is_favorite: true,
        })
        .collect();
    render_rows(
        f,
        area,
        format!("Favorites ({})", rows.len()),
        &rows,
        app.selected,
        FavoritesScreen::<S>::EMPTY_TEXT,
    );
}

pub fn render_featured<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let featured = &app.featured;
    let list_area = with_load_state(f, area, load_state_line(featured.load_state()));
    let rows = featured.visible();
    render_rows(
        f,
        list_area,
        "Featured".to_string(),
        &rows,
        app.selected,
        FeaturedScreen::<S>::EMPTY_TEXT,
    );
}
