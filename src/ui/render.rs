//! Render dispatch for the TUI.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, ConfirmAction, View};
use crate::storage::KeyValueStore;
use crate::util::sanitize_line;

use super::{detail, items, status};

/// Minimum terminal dimensions required for normal operation.
const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 10;

const TAB_TITLES: [&str; 4] = ["1 Home", "2 Favorites", "3 Featured", "Detail"];

fn tab_index(view: View) -> usize {
    match view {
        View::Home => 0,
        View::Favorites => 1,
        View::Featured => 2,
        View::Detail => 3,
    }
}

/// Main render dispatch function.
pub(super) fn render<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let tabs = Tabs::new(TAB_TITLES)
        .select(tab_index(app.view))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, chunks[0]);

    match app.view {
        View::Home => items::render_home(f, app, chunks[1]),
        View::Favorites => items::render_favorites(f, app, chunks[1]),
        View::Featured => items::render_featured(f, app, chunks[1]),
        View::Detail => detail::render(f, app, chunks[1]),
    }
    status::render(f, app, chunks[2]);

    if let Some(confirm) = &app.pending_confirm {
        render_confirm_overlay(f, confirm);
    }
}

fn confirm_text(confirm: &ConfirmAction) -> String {
    match confirm {
        ConfirmAction::RemoveFavorite { name, .. } => format!(
            "Remove \"{}\" from favorites?\n\n(y) Confirm  (n/Esc) Cancel",
            sanitize_line(name)
        ),
        ConfirmAction::RemoveAll { count, .. } => format!(
            "Remove all {} favorites?\n\n(y) Confirm  (n/Esc) Cancel",
            count
        ),
    }
}

/// Render the confirmation dialog centered on screen.
fn render_confirm_overlay(f: &mut Frame, confirm: &ConfirmAction) {
    let area = f.area();

    // At most 50 chars wide, 7 lines tall
    let width = 50u16.min(area.width.saturating_sub(4));
    let height = 7u16.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);

    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(confirm_text(confirm))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Confirm "),
        )
        .alignment(Alignment::Center);

    f.render_widget(paragraph, overlay);
}
