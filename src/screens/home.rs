use tokio::sync::mpsc;

use super::shared::{CatalogState, FavoritesState};
use super::{Lifecycle, Notice, Screen, ScreenEvent};
use crate::catalog::{
    with_favorite_flags, CatalogClient, CatalogView, Category, FlaggedItem, Item, LoadState,
};
use crate::favorites::{FavoritesSet, FavoritesStore};
use crate::storage::KeyValueStore;

/// The catalog screen: category bar plus the filtered item grid.
pub struct HomeScreen<S> {
    catalog: CatalogState,
    favorites: FavoritesState<S>,
    lifecycle: Lifecycle,
    notice: Option<Notice>,
}

impl<S: KeyValueStore> HomeScreen<S> {
    pub fn new(store: FavoritesStore<S>, client: CatalogClient, refetch_on_focus: bool) -> Self {
        Self {
            catalog: CatalogState::new(client, refetch_on_focus),
            favorites: FavoritesState::new(store),
            lifecycle: Lifecycle::default(),
            notice: None,
        }
    }

    pub fn catalog(&self) -> &CatalogView {
        self.catalog.view()
    }

    pub fn load_state(&self) -> &LoadState {
        self.catalog.view().state()
    }

    pub fn favorites(&self) -> &FavoritesSet {
        self.favorites.set()
    }

    pub fn categories(&self) -> &[Category] {
        self.catalog.view().categories()
    }

    pub fn selected_category(&self) -> &Category {
        self.catalog.view().selected()
    }

    pub fn select_category(&mut self, category: &Category) -> &Category {
        self.catalog.view_mut().select_category(category)
    }

    pub fn select_category_by_key(&mut self, key: &str) -> &Category {
        self.catalog.view_mut().select_category_by_key(key)
    }

    /// Visible items with their favorite flags.
    pub fn visible(&self) -> Vec<FlaggedItem<'_>> {
        with_favorite_flags(self.catalog.view().visible(), self.favorites.set())
    }

    /// Payload for the detail screen.
    pub fn open(&self, id: &str) -> Option<Item> {
        self.catalog.view().find(id).cloned()
    }

    /// Toggle the favorite status of a catalog item.
    ///
    /// Returns whether it was added, or `None` when the id is not in the
    /// catalog or the write failed (the latter leaves a notice).
    pub async fn toggle_favorite(&mut self, id: &str) -> Option<bool> {
        let item = self.open(id)?;
        let (was_added, notice) = self.favorites.toggle(item).await;
        self.notice = Some(notice);
        was_added
    }
}

impl<S: KeyValueStore> Screen for HomeScreen<S> {
    fn on_focus(&mut self, event_tx: &mpsc::Sender<ScreenEvent>) {
        self.lifecycle.focus();
        let generation = self.lifecycle.start_load();
        self.favorites.spawn_load(generation, event_tx);
        if self.catalog.needs_fetch() {
            let generation = self.lifecycle.start_load();
            self.catalog.spawn_fetch(generation, event_tx);
        }
    }

    fn on_blur(&mut self) {
        self.lifecycle.blur();
        self.catalog.cancel_fetch();
    }

    fn handle_event(&mut self, event: ScreenEvent) {
        if !self.lifecycle.accept(event.generation()) {
            return;
        }
        let notice = match event {
            ScreenEvent::FavoritesLoaded {
                revision, result, ..
            } => self.favorites.apply_loaded(revision, result),
            ScreenEvent::CatalogFetched { result, .. } => self.catalog.apply_fetched(result),
        };
        if notice.is_some() {
            self.notice = notice;
        }
    }

    fn is_settled(&self) -> bool {
        self.lifecycle.is_settled()
    }

    fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}
