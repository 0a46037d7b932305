//! Styled lines shared by the TUI widgets and the one-shot commands.
//!
//! Every string that came from the catalog is scrubbed of control characters
//! before it becomes a span. Lines print as plain text through `Display`.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::catalog::{Category, FlaggedItem, Item, LoadState};
use crate::screens::{Notice, NoticeKind};
use crate::util::{sanitize_line, truncate_to_width};

/// Column budget for item names outside the TUI.
pub const NAME_WIDTH: usize = 32;

const FAVORITE_MARK: &str = "♥";
const NOT_FAVORITE_MARK: &str = "♡";
const FEATURED_BADGE: &str = "featured";

fn clean(s: &str) -> String {
    sanitize_line(s).into_owned()
}

fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

fn favorite_mark(is_favorite: bool) -> Span<'static> {
    if is_favorite {
        Span::styled(FAVORITE_MARK, Style::default().fg(Color::Red))
    } else {
        Span::raw(NOT_FAVORITE_MARK)
    }
}

/// The category bar, with the selected entry bracketed.
pub fn category_line(categories: &[Category], selected: &Category) -> Line<'static> {
    let mut spans = Vec::with_capacity(categories.len() * 2);
    for (i, category) in categories.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let label = clean(category.key());
        if category == selected {
            spans.push(Span::styled(
                format!("[{}]", label),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(label));
        }
    }
    Line::from(spans)
}

/// One list row: favorite mark, name, price and featured badge.
pub fn item_line(row: &FlaggedItem<'_>, name_width: usize) -> Line<'static> {
    let name = clean(&row.item.name);
    let name = truncate_to_width(&name, name_width).into_owned();

    let mut spans = Vec::with_capacity(6);
    spans.push(favorite_mark(row.is_favorite));
    spans.push(Span::raw(" "));
    spans.push(Span::raw(name));
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format_price(row.item.price),
        Style::default().fg(Color::Green),
    ));
    if row.item.is_featured {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            FEATURED_BADGE,
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}

/// Status line for a catalog-backed screen; `None` once loaded.
pub fn load_state_line(state: &LoadState) -> Option<Line<'static>> {
    match state {
        LoadState::Idle => Some(Line::styled(
            "Catalog not loaded",
            Style::default().fg(Color::DarkGray),
        )),
        LoadState::Loading => Some(Line::styled(
            "Loading catalog...",
            Style::default().fg(Color::Yellow),
        )),
        LoadState::Loaded => None,
        LoadState::FetchFailed { error } => Some(Line::styled(
            format!("Failed to load catalog: {}", clean(error)),
            Style::default().fg(Color::Red),
        )),
    }
}

pub fn notice_line(notice: &Notice) -> Line<'static> {
    match notice.kind {
        NoticeKind::Success => Line::styled(
            format!("✓ {}", notice.message),
            Style::default().fg(Color::Green),
        ),
        NoticeKind::Error => Line::styled(
            format!("✗ {}", notice.message),
            Style::default().fg(Color::Red),
        ),
    }
}

/// Header and body of the detail view. Empty fields are left out.
pub fn detail_lines(item: &Item, is_favorite: bool) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::DarkGray);

    let mut title = vec![
        favorite_mark(is_favorite),
        Span::raw(" "),
        Span::styled(
            clean(&item.name),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    if item.is_featured {
        title.push(Span::raw("  "));
        title.push(Span::styled(
            FEATURED_BADGE,
            Style::default().fg(Color::Yellow),
        ));
    }

    let mut lines = vec![
        Line::from(title),
        Line::from(vec![
            Span::styled("Price: ", label),
            Span::raw(format_price(item.price)),
        ]),
    ];
    if !item.category.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Category: ", label),
            Span::raw(clean(&item.category)),
        ]));
    }
    if !item.image_url.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Image: ", label),
            Span::raw(clean(&item.image_url)),
        ]));
    }
    if !item.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(clean(&item.description)));
    }
    lines
}
