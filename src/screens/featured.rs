use tokio::sync::mpsc;

use super::shared::{CatalogState, FavoritesState};
use super::{Lifecycle, Notice, Screen, ScreenEvent};
use crate::catalog::{
    featured_by_price, with_favorite_flags, CatalogClient, FlaggedItem, Item, LoadState,
};
use crate::favorites::{FavoritesSet, FavoritesStore};
use crate::storage::KeyValueStore;

/// Featured items only, most expensive first.
pub struct FeaturedScreen<S> {
    catalog: CatalogState,
    favorites: FavoritesState<S>,
    lifecycle: Lifecycle,
    notice: Option<Notice>,
}

impl<S: KeyValueStore> FeaturedScreen<S> {
    pub const EMPTY_TEXT: &'static str = "No featured items available";

    pub fn new(store: FavoritesStore<S>, client: CatalogClient, refetch_on_focus: bool) -> Self {
        Self {
            catalog: CatalogState::new(client, refetch_on_focus),
            favorites: FavoritesState::new(store),
            lifecycle: Lifecycle::default(),
            notice: None,
        }
    }

    pub fn load_state(&self) -> &LoadState {
        self.catalog.view().state()
    }

    pub fn favorites(&self) -> &FavoritesSet {
        self.favorites.set()
    }

    pub fn visible(&self) -> Vec<FlaggedItem<'_>> {
        with_favorite_flags(
            featured_by_price(self.catalog.view().items()),
            self.favorites.set(),
        )
    }

    pub fn shows_remove_all(&self) -> bool {
        self.favorites.set().len() > 1
    }

    pub fn open(&self, id: &str) -> Option<Item> {
        self.catalog.view().find(id).cloned()
    }

    pub async fn toggle_favorite(&mut self, id: &str) -> Option<bool> {
        let item = self.open(id)?;
        let (was_added, notice) = self.favorites.toggle(item).await;
        self.notice = Some(notice);
        was_added
    }

    pub async fn remove_all(&mut self) -> bool {
        let (ok, notice) = self.favorites.clear().await;
        self.notice = Some(notice);
        ok
    }
}

impl<S: KeyValueStore> Screen for FeaturedScreen<S> {
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
