use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};
use crate::storage::KeyValueStore;

use super::lines::notice_line;

/// Key hints for the current view.
fn hints<S: KeyValueStore>(app: &App<S>) -> &'static str {
    match app.view {
        View::Home => "[h/l]category [j/k]move [Enter]details [f]avorite [r]eload [Tab]switch [q]uit",
        View::Favorites if app.favorites.shows_remove_all() => {
            "[j/k]move [Enter]details [d]elete [D]elete all [Tab]switch [q]uit"
        }
        View::Favorites => "[j/k]move [Enter]details [d]elete [Tab]switch [q]uit",
        View::Featured if app.featured.shows_remove_all() => {
            "[j/k]move [Enter]details [f]avorite [D]elete all favorites [Tab]switch [q]uit"
        }
        View::Featured => "[j/k]move [Enter]details [f]avorite [r]eload [Tab]switch [q]uit",
        View::Detail => "[Esc]back [f]avorite [Tab]switch [q]uit",
    }
}

/// Render the status bar: the latest notice, else key hints.
pub fn render<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let line = match &app.status_message {
        Some((notice, _)) => notice_line(notice),
        None => Line::from(hints(app)),
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(line).style(style), area);
}
