//! Keyboard input handling.
//!
//! A pending confirmation captures every key; otherwise keys dispatch on the
//! visible view.

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::app::{App, View};
use crate::screens::ScreenEvent;
use crate::storage::KeyValueStore;

use super::Action;

/// Answer to a y/n prompt, or `None` for keys the prompt ignores.
fn confirm_key(code: KeyCode, modifiers: KeyModifiers) -> Option<bool> {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Some(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(false),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(false),
        _ => None,
    }
}

/// Wait for a y/n key press. The terminal must already be in raw mode.
///
/// End of input counts as "no".
pub async fn read_confirmation() -> Result<bool> {
    let mut events = EventStream::new();
    while let Some(event) = events.next().await {
        if let Event::Key(key) = event? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(answer) = confirm_key(key.code, key.modifiers) {
                return Ok(answer);
            }
        }
    }
    Ok(false)
}

/// Main input dispatch function.
pub(super) async fn handle_input<S: KeyValueStore>(
    app: &mut App<S>,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<ScreenEvent>,
) -> Action {
    // Raw mode swallows SIGINT
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    if app.pending_confirm.is_some() {
        match confirm_key(code, modifiers) {
            Some(true) => app.confirm().await,
            Some(false) => app.cancel_confirm(),
            None => {}
        }
        return Action::Continue;
    }

    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('1') => app.switch_to(View::Home, event_tx),
        KeyCode::Char('2') => app.switch_to(View::Favorites, event_tx),
        KeyCode::Char('3') => app.switch_to(View::Featured, event_tx),
        KeyCode::Tab => app.switch_to(app.view.next_tab(), event_tx),
        KeyCode::BackTab => app.switch_to(app.view.prev_tab(), event_tx),
        _ if app.view == View::Detail => handle_detail_input(app, code, event_tx).await,
        _ => handle_list_input(app, code, event_tx).await,
    }
    Action::Continue
}

async fn handle_detail_input<S: KeyValueStore>(
    app: &mut App<S>,
    code: KeyCode,
    event_tx: &mpsc::Sender<ScreenEvent>,
) {
    match code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => app.close_detail(event_tx),
        KeyCode::Char('f') | KeyCode::Char(' ') => app.toggle_selected().await,
        KeyCode::Char('r') => app.reload(event_tx),
        _ => {}
    }
}

async fn handle_list_input<S: KeyValueStore>(
    app: &mut App<S>,
    code: KeyCode,
    event_tx: &mpsc::Sender<ScreenEvent>,
) {
    match code {
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),
        KeyCode::Char('h') | KeyCode::Left => app.cycle_category(false),
        KeyCode::Char('l') | KeyCode::Right => app.cycle_category(true),
        KeyCode::Enter => app.open_detail(event_tx),
        KeyCode::Char('f') | KeyCode::Char(' ') => app.toggle_selected().await,
        KeyCode::Char('d') | KeyCode::Delete => app.request_remove(),
        KeyCode::Char('D') => app.request_remove_all(),
        KeyCode::Char('r') => app.reload(event_tx),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogClient, Item};
    use crate::favorites::FavoritesStore;
    use crate::storage::Database;
    use std::time::Duration;

    async fn test_app() -> (FavoritesStore<Database>, App<Database>) {
        let db = Database::open(":memory:").await.unwrap();
        let store = FavoritesStore::new(db);
        let client = CatalogClient::new("http://127.0.0.1:9", Duration::from_secs(1), 0).unwrap();
        (store.clone(), App::new(store, client, false))
    }

    async fn settle(app: &mut App<Database>, rx: &mut mpsc::Receiver<ScreenEvent>) {
        while !app.is_settled() {
            let event = rx.recv().await.unwrap();
            app.handle_screen_event(event);
        }
    }

    async fn press(
        app: &mut App<Database>,
        code: KeyCode,
        tx: &mpsc::Sender<ScreenEvent>,
    ) -> Action {
        handle_input(app, code, KeyModifiers::NONE, tx).await
    }

    #[tokio::test]
    async fn test_keys_move_between_views() {
        let (_store, mut app) = test_app().await;
        let (tx, _rx) = mpsc::channel(32);
        app.start(&tx);

        press(&mut app, KeyCode::Char('2'), &tx).await;
        assert_eq!(app.view, View::Favorites);
        press(&mut app, KeyCode::Tab, &tx).await;
        assert_eq!(app.view, View::Featured);

        // empty list: detail opens on its placeholder
        press(&mut app, KeyCode::Enter, &tx).await;
        assert_eq!(app.view, View::Detail);
        assert!(app.detail.item().is_err());

        press(&mut app, KeyCode::Esc, &tx).await;
        assert_eq!(app.view, View::Featured);
        assert!(matches!(
            press(&mut app, KeyCode::Char('q'), &tx).await,
            Action::Quit
        ));
    }

    #[tokio::test]
    async fn test_remove_all_waits_for_confirmation() {
        let (store, mut app) = test_app().await;
        store.add(Item::new("1", "Robot", "Tech", 25.0)).await.unwrap();
        store.add(Item::new("2", "Train", "Wooden", 40.0)).await.unwrap();

        let (tx, mut rx) = mpsc::channel(32);
        app.view = View::Favorites;
        app.start(&tx);
        settle(&mut app, &mut rx).await;

        press(&mut app, KeyCode::Char('D'), &tx).await;
        assert!(app.pending_confirm.is_some());

        // unrelated keys leave the dialog up, 'n' dismisses it
        press(&mut app, KeyCode::Char('j'), &tx).await;
        assert!(app.pending_confirm.is_some());
        press(&mut app, KeyCode::Char('n'), &tx).await;
        assert!(app.pending_confirm.is_none());
        assert_eq!(store.load().await.len(), 2);

        press(&mut app, KeyCode::Char('D'), &tx).await;
        press(&mut app, KeyCode::Char('y'), &tx).await;
        assert!(app.favorites.is_empty());
        assert!(store.load().await.is_empty());
        let (notice, _) = app.status_message.as_ref().unwrap();
        assert_eq!(notice.message, "All items removed from favorites!");
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_even_with_dialog_open() {
        let (_store, mut app) = test_app().await;
        let (tx, _rx) = mpsc::channel(32);
        app.pending_confirm = Some(crate::app::ConfirmAction::RemoveAll {
            from: View::Favorites,
            count: 2,
        });
        assert!(matches!(
            handle_input(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL, &tx).await,
            Action::Quit
        ));
    }

    #[test]
    fn test_confirm_keys() {
        assert_eq!(confirm_key(KeyCode::Char('y'), KeyModifiers::NONE), Some(true));
        assert_eq!(confirm_key(KeyCode::Char('N'), KeyModifiers::SHIFT), Some(false));
        assert_eq!(confirm_key(KeyCode::Esc, KeyModifiers::NONE), Some(false));
        assert_eq!(
            confirm_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(false)
        );
        assert_eq!(confirm_key(KeyCode::Char('c'), KeyModifiers::NONE), None);
        assert_eq!(confirm_key(KeyCode::Enter, KeyModifiers::NONE), None);
    }
}
