//! Interactive session state.
//!
//! Owns one instance of every screen and tracks which one is visible. Moving
//! between views blurs the old screen and focuses the new one, so each screen
//! reloads its snapshots exactly as it would when navigated to.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::catalog::{CatalogClient, Item};
use crate::favorites::FavoritesStore;
use crate::screens::{
    DetailScreen, FavoritesScreen, FeaturedScreen, HomeScreen, Notice, Screen, ScreenEvent,
};
use crate::storage::KeyValueStore;

/// How long a status message stays in the status bar.
const STATUS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Favorites,
    Featured,
    Detail,
}

impl View {
    /// The tab after this one, wrapping around. Detail counts as Home.
    pub fn next_tab(self) -> View {
        match self {
            View::Home | View::Detail => View::Favorites,
            View::Favorites => View::Featured,
            View::Featured => View::Home,
        }
    }

    pub fn prev_tab(self) -> View {
        match self {
            View::Home | View::Detail => View::Featured,
            View::Favorites => View::Home,
            View::Featured => View::Favorites,
        }
    }
}

/// A destructive action waiting for a y/n answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Remove one favorite from the Favorites view.
    RemoveFavorite { id: String, name: String },
    /// Clear every favorite, asked from the Favorites or Featured view.
    RemoveAll { from: View, count: usize },
}

pub struct App<S> {
    pub home: HomeScreen<S>,
    pub favorites: FavoritesScreen<S>,
    pub featured: FeaturedScreen<S>,
    pub detail: DetailScreen<S>,
    store: FavoritesStore<S>,

    pub view: View,
    /// Where closing the detail view goes back to, with its selection.
    return_to: (View, usize),
    /// Selected row in the current list view.
    pub selected: usize,

    pub pending_confirm: Option<ConfirmAction>,
    pub status_message: Option<(Notice, Instant)>,
    pub needs_redraw: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: FavoritesStore<S>, client: CatalogClient, refetch_on_focus: bool) -> Self {
        Self {
            home: HomeScreen::new(store.clone(), client.clone(), refetch_on_focus),
            favorites: FavoritesScreen::new(store.clone()),
            featured: FeaturedScreen::new(store.clone(), client, refetch_on_focus),
            detail: DetailScreen::new(store.clone(), None),
            store,
            view: View::Home,
            return_to: (View::Home, 0),
            selected: 0,
            pending_confirm: None,
            status_message: None,
            needs_redraw: true,
        }
    }

    fn screen(&self, view: View) -> &dyn Screen {
        match view {
            View::Home => &self.home,
            View::Favorites => &self.favorites,
            View::Featured => &self.featured,
            View::Detail => &self.detail,
        }
    }

    fn screen_mut(&mut self, view: View) -> &mut dyn Screen {
        match view {
            View::Home => &mut self.home,
            View::Favorites => &mut self.favorites,
            View::Featured => &mut self.featured,
            View::Detail => &mut self.detail,
        }
    }

    /// Focus the initial view.
    pub fn start(&mut self, event_tx: &mpsc::Sender<ScreenEvent>) {
        let current = self.view;
        self.screen_mut(current).on_focus(event_tx);
    }

    /// Blur the visible screen; results still in flight are dropped.
    pub fn stop(&mut self) {
        let current = self.view;
        self.screen_mut(current).on_blur();
    }

    /// Whether the visible screen has no loads outstanding.
    pub fn is_settled(&self) -> bool {
        self.screen(self.view).is_settled()
    }

    /// Show `view`, blurring the current screen and focusing the new one.
    pub fn switch_to(&mut self, view: View, event_tx: &mpsc::Sender<ScreenEvent>) {
        if view == self.view {
            return;
        }
        let current = self.view;
        self.screen_mut(current).on_blur();
        self.view = view;
        self.selected = 0;
        self.screen_mut(view).on_focus(event_tx);
        tracing::debug!(from = ?current, to = ?view, "Switched view");
    }

    /// Blur and refocus the current screen, reloading its snapshots.
    pub fn reload(&mut self, event_tx: &mpsc::Sender<ScreenEvent>) {
        let current = self.view;
        let screen = self.screen_mut(current);
        screen.on_blur();
        screen.on_focus(event_tx);
    }

    /// Open the detail view for the selected row.
    ///
    /// An empty list opens it without an item, which shows the placeholder.
    pub fn open_detail(&mut self, event_tx: &mpsc::Sender<ScreenEvent>) {
        if self.view == View::Detail {
            return;
        }
        let item = self.selected_item();
        let current = self.view;
        self.screen_mut(current).on_blur();
        self.return_to = (current, self.selected);
        self.detail = DetailScreen::new(self.store.clone(), item);
        self.view = View::Detail;
        self.detail.on_focus(event_tx);
    }

    /// Leave the detail view for the list it was opened from.
    pub fn close_detail(&mut self, event_tx: &mpsc::Sender<ScreenEvent>) {
        if self.view != View::Detail {
            return;
        }
        let (view, selected) = self.return_to;
        self.switch_to(view, event_tx);
        self.selected = selected;
        self.clamp_selection();
    }

    /// Apply a background load result to the visible screen.
    ///
    /// Results belonging to screens that lost focus carry a generation the
    /// visible screen does not recognize, so it drops them.
    pub fn handle_screen_event(&mut self, event: ScreenEvent) {
        let current = self.view;
        self.screen_mut(current).handle_event(event);
        self.after_change();
    }

    fn after_change(&mut self) {
        let current = self.view;
        if let Some(notice) = self.screen_mut(current).take_notice() {
            self.set_status(notice);
        }
        self.clamp_selection();
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn row_count(&self) -> usize {
        match self.view {
            View::Home => self.home.visible().len(),
            View::Favorites => self.favorites.favorites().len(),
            View::Featured => self.featured.visible().len(),
            View::Detail => 0,
        }
    }

    /// The item under the cursor, or the item shown in the detail view.
    pub fn selected_item(&self) -> Option<Item> {
        match self.view {
            View::Home => self
                .home
                .visible()
                .get(self.selected)
                .map(|row| row.item.clone()),
            View::Favorites => self.favorites.favorites().items().get(self.selected).cloned(),
            View::Featured => self
                .featured
                .visible()
                .get(self.selected)
                .map(|row| row.item.clone()),
            View::Detail => self.detail.item().ok().cloned(),
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.row_count() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.row_count().saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let count = self.row_count();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
    }

    /// Move the Home category filter one step, wrapping around.
    pub fn cycle_category(&mut self, forward: bool) {
        if self.view != View::Home {
            return;
        }
        let categories = self.home.categories();
        let len = categories.len();
        if len == 0 {
            return;
        }
        let current = categories
            .iter()
            .position(|c| c == self.home.selected_category())
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        let category = categories[next].clone();
        self.home.select_category(&category);
        self.selected = 0;
    }

    // ========================================================================
    // Favorites actions
    // ========================================================================

    /// Toggle the favorite under the cursor (or in the detail view).
    ///
    /// In the Favorites view every entry is a favorite, so this asks to
    /// remove it instead.
    pub async fn toggle_selected(&mut self) {
        match self.view {
            View::Home => {
                if let Some(item) = self.selected_item() {
                    self.home.toggle_favorite(item.id.as_str()).await;
                }
            }
            View::Featured => {
                if let Some(item) = self.selected_item() {
                    self.featured.toggle_favorite(item.id.as_str()).await;
                }
            }
            View::Detail => {
                if let Err(e) = self.detail.toggle_favorite().await {
                    self.set_status(Notice::error(e.to_string()));
                }
            }
            View::Favorites => self.request_remove(),
        }
        self.after_change();
    }

    /// Ask before removing the selected favorite.
    pub fn request_remove(&mut self) {
        if self.view != View::Favorites {
            return;
        }
        if let Some(item) = self.selected_item() {
            self.pending_confirm = Some(ConfirmAction::RemoveFavorite {
                id: item.id.as_str().to_owned(),
                name: item.name,
            });
        }
    }

    /// Ask before clearing all favorites, where the view offers it.
    pub fn request_remove_all(&mut self) {
        let (offered, count) = match self.view {
            View::Favorites => (
                self.favorites.shows_remove_all(),
                self.favorites.favorites().len(),
            ),
            View::Featured => (
                self.featured.shows_remove_all(),
                self.featured.favorites().len(),
            ),
            View::Home | View::Detail => return,
        };
        if offered {
            self.pending_confirm = Some(ConfirmAction::RemoveAll {
                from: self.view,
                count,
            });
        }
    }

    /// Run the pending action.
    pub async fn confirm(&mut self) {
        let Some(action) = self.pending_confirm.take() else {
            return;
        };
        match action {
            ConfirmAction::RemoveFavorite { id, .. } => {
                self.favorites.remove(&id).await;
            }
            ConfirmAction::RemoveAll {
                from: View::Featured,
                ..
            } => {
                self.featured.remove_all().await;
            }
            ConfirmAction::RemoveAll { .. } => {
                self.favorites.remove_all().await;
            }
        }
        self.after_change();
    }

    pub fn cancel_confirm(&mut self) {
        self.pending_confirm = None;
    }

    // ========================================================================
    // Status bar
    // ========================================================================

    pub fn set_status(&mut self, notice: Notice) {
        self.status_message = Some((notice, Instant::now()));
    }

    /// Clear the status message once it has been shown long enough.
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, shown_at)) = &self.status_message {
            if shown_at.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use tokio::time;

    async fn test_app() -> App<Database> {
        let db = Database::open(":memory:").await.unwrap();
        let client = CatalogClient::new("http://127.0.0.1:9", Duration::from_secs(1), 0).unwrap();
        App::new(FavoritesStore::new(db), client, false)
    }

    #[test]
    fn test_tab_cycle_wraps() {
        assert_eq!(View::Home.next_tab(), View::Favorites);
        assert_eq!(View::Featured.next_tab(), View::Home);
        assert_eq!(View::Home.prev_tab(), View::Featured);
        assert_eq!(View::Detail.next_tab(), View::Favorites);
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        let mut app = test_app().await;
        time::pause();

        app.set_status(Notice::success("Item added to favorites!"));
        time::advance(Duration::from_secs(2)).await;
        assert!(!app.clear_expired_status());
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_remove_all_not_offered_without_favorites() {
        let mut app = test_app().await;
        app.view = View::Favorites;
        app.request_remove_all();
        assert_eq!(app.pending_confirm, None);
    }

    #[tokio::test]
    async fn test_remove_needs_a_selected_favorite() {
        let mut app = test_app().await;
        app.view = View::Favorites;
        app.request_remove();
        assert_eq!(app.pending_confirm, None);

        app.view = View::Home;
        app.request_remove();
        assert_eq!(app.pending_confirm, None);
    }

    #[tokio::test]
    async fn test_selection_stays_in_bounds_on_empty_list() {
        let mut app = test_app().await;
        app.select_next();
        app.select_last();
        app.select_prev();
        assert_eq!(app.selected, 0);
        assert_eq!(app.selected_item(), None);
    }

    #[tokio::test]
    async fn test_cancel_clears_pending_confirm() {
        let mut app = test_app().await;
        app.pending_confirm = Some(ConfirmAction::RemoveAll {
            from: View::Favorites,
            count: 2,
        });
        app.cancel_confirm();
        assert!(app.pending_confirm.is_none());
    }
}
