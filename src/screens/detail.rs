use thiserror::Error;
use tokio::sync::mpsc;

use super::shared::FavoritesState;
use super::{Lifecycle, Notice, Screen, ScreenEvent};
use crate::catalog::Item;
use crate::favorites::FavoritesStore;
use crate::storage::KeyValueStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetailError {
    /// The detail view was opened without an item payload
    #[error("No item selected")]
    NotFound,
}

/// Detail view of a single item. A leaf: it navigates nowhere.
pub struct DetailScreen<S> {
    item: Option<Item>,
    is_favorite: bool,
    favorites: FavoritesState<S>,
    lifecycle: Lifecycle,
    notice: Option<Notice>,
}

impl<S: KeyValueStore> DetailScreen<S> {
    pub const PLACEHOLDER: &'static str = "Please select the item you want to see details!";

    pub fn new(store: FavoritesStore<S>, item: Option<Item>) -> Self {
        Self {
            item,
            is_favorite: false,
            favorites: FavoritesState::new(store),
            lifecycle: Lifecycle::default(),
            notice: None,
        }
    }

    pub fn item(&self) -> Result<&Item, DetailError> {
        self.item.as_ref().ok_or(DetailError::NotFound)
    }

    pub fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    /// Toggle the shown item. Returns its favorite status afterwards, which
    /// is unchanged when the write failed.
    pub async fn toggle_favorite(&mut self) -> Result<bool, DetailError> {
        let item = self.item()?.clone();
        let (was_added, notice) = self.favorites.toggle(item).await;
        if let Some(was_added) = was_added {
            self.is_favorite = was_added;
        }
        self.notice = Some(notice);
        Ok(self.is_favorite)
    }
}

impl<S: KeyValueStore> Screen for DetailScreen<S> {
    fn on_focus(&mut self, event_tx: &mpsc::Sender<ScreenEvent>) {
        self.lifecycle.focus();
        if self.item.is_some() {
            let generation = self.lifecycle.start_load();
            self.favorites.spawn_load(generation, event_tx);
        }
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
            if let Some(item) = &self.item {
                self.is_favorite = self.favorites.set().contains(item.id.as_str());
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
