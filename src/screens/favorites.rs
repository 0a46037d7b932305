use tokio::sync::mpsc;

use super::shared::FavoritesState;
use super::{Lifecycle, Notice, Screen, ScreenEvent};
use crate::catalog::Item;
use crate::favorites::{FavoritesSet, FavoritesStore};
use crate::storage::KeyValueStore;

/// The favorites list.
pub struct FavoritesScreen<S> {
    favorites: FavoritesState<S>,
    lifecycle: Lifecycle,
    notice: Option<Notice>,
}

impl<S: KeyValueStore> FavoritesScreen<S> {
    pub const EMPTY_TEXT: &'static str = "No favorite items yet";

    pub fn new(store: FavoritesStore<S>) -> Self {
        Self {
            favorites: FavoritesState::new(store),
            lifecycle: Lifecycle::default(),
            notice: None,
        }
    }

    pub fn favorites(&self) -> &FavoritesSet {
        self.favorites.set()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.set().is_empty()
    }

    /// "Remove all" is only offered once there is more than one favorite.
    pub fn shows_remove_all(&self) -> bool {
        self.favorites.set().len() > 1
    }

    pub fn open(&self, id: &str) -> Option<Item> {
        self.favorites.set().get(id).cloned()
    }

    /// Remove one favorite. Returns `false` if the write failed.
    pub async fn remove(&mut self, id: &str) -> bool {
        let (ok, notice) = self.favorites.remove(id).await;
        self.notice = Some(notice);
        ok
    }

    /// Remove every favorite. Returns `false` if the write failed.
    pub async fn remove_all(&mut self) -> bool {
        let (ok, notice) = self.favorites.clear().await;
        self.notice = Some(notice);
        ok
    }
}

impl<S: KeyValueStore> Screen for FavoritesScreen<S> {
    fn on_focus(&mut self, event_tx: &mpsc::Sender<ScreenEvent>) {
        self.lifecycle.focus();
        let generation = self.lifecycle.start_load();
        self.favorites.spawn_load(generation, event_tx);
    }

    fn on_blur(&mut self) {
        self.lifecycle.blur();
    }

    fn handle_event(&mut self, event: ScreenEvent) {
        if !self.lifecycle.accept(event.generation()) {
            return;
        }
        if let ScreenEvent::FavoritesLoaded {
            revision, result, ..
        } = event
        {
            if let Some(notice) = self.favorites.apply_loaded(revision, result) {
                self.notice = Some(notice);
            }
        }
    }

    fn is_settled(&self) -> bool {
        self.lifecycle.is_settled()
    }

    fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}
