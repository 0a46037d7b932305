use tokio::sync::mpsc;

use super::{Notice, ScreenEvent};
use crate::catalog::{CatalogClient, CatalogView, FetchError, Item};
use crate::favorites::{FavoritesSet, FavoritesStore, StoreError};
use crate::storage::KeyValueStore;

/// A screen's view of the persisted favorites.
///
/// `set` only advances after the store confirms a write. `revision` counts
/// local mutations so a focus load that read the blob before a mutation
/// cannot overwrite the newer snapshot when it lands.
pub(super) struct FavoritesState<S> {
    store: FavoritesStore<S>,
    set: FavoritesSet,
    revision: u64,
}

impl<S: KeyValueStore> FavoritesState<S> {
    pub(super) fn new(store: FavoritesStore<S>) -> Self {
        Self {
            store,
            set: FavoritesSet::new(),
            revision: 0,
        }
    }

    pub(super) fn set(&self) -> &FavoritesSet {
        &self.set
    }

    pub(super) fn spawn_load(&self, generation: u64, event_tx: &mpsc::Sender<ScreenEvent>) {
        let store = self.store.clone();
        let revision = self.revision;
        let tx = event_tx.clone();
        tokio::spawn(async move {
            let result = store.try_load().await;
            if let Err(e) = tx
                .send(ScreenEvent::FavoritesLoaded {
                    generation,
                    revision,
                    result,
                })
                .await
            {
                tracing::debug!(error = %e, "Favorites load finished after screen closed");
            }
        });
    }

    /// Apply a focus load. Returns a notice when the read failed.
    pub(super) fn apply_loaded(
        &mut self,
        revision: u64,
        result: Result<FavoritesSet, StoreError>,
    ) -> Option<Notice> {
        if revision != self.revision {
            tracing::debug!(
                load_revision = revision,
                current = self.revision,
                "Favorites load superseded by a local change"
            );
            return None;
        }
        match result {
            Ok(set) => {
                self.set = set;
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load favorites");
                Some(Notice::error("Failed to load favorites!"))
            }
        }
    }

    fn commit(&mut self, set: FavoritesSet) {
        self.set = set;
        self.revision += 1;
    }

    /// Toggle `item`, returning whether it was added (`None` on failure).
    pub(super) async fn toggle(&mut self, item: Item) -> (Option<bool>, Notice) {
        match self.store.toggle(item).await {
            Ok((set, was_added)) => {
                self.commit(set);
                let message = if was_added {
                    "Item added to favorites!"
                } else {
                    "Item removed from favorites!"
                };
                (Some(was_added), Notice::success(message))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to toggle favorite");
                (None, Notice::error("Failed to update favorites!"))
            }
        }
    }

    pub(super) async fn remove(&mut self, id: &str) -> (bool, Notice) {
        match self.store.remove(id).await {
            Ok(set) => {
                self.commit(set);
                (true, Notice::success("Item removed from favorites!"))
            }
            Err(e) => {
                tracing::warn!(error = %e, id = %id, "Failed to remove favorite");
                (false, Notice::error("Failed to remove item from favorites!"))
            }
        }
    }

    pub(super) async fn clear(&mut self) -> (bool, Notice) {
        match self.store.clear().await {
            Ok(set) => {
                self.commit(set);
                (true, Notice::success("All items removed from favorites!"))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to clear favorites");
                (
                    false,
                    Notice::error("Failed to remove all items from favorites!"),
                )
            }
        }
    }
}

/// A screen's copy of the remote catalog.
pub(super) struct CatalogState {
    client: CatalogClient,
    view: CatalogView,
    refetch_on_focus: bool,
}

impl CatalogState {
    pub(super) fn new(client: CatalogClient, refetch_on_focus: bool) -> Self {
        Self {
            client,
            view: CatalogView::new(),
            refetch_on_focus,
        }
    }

    pub(super) fn view(&self) -> &CatalogView {
        &self.view
    }

    pub(super) fn view_mut(&mut self) -> &mut CatalogView {
        &mut self.view
    }

    pub(super) fn needs_fetch(&self) -> bool {
        self.view.needs_fetch(self.refetch_on_focus)
    }

    pub(super) fn spawn_fetch(&mut self, generation: u64, event_tx: &mpsc::Sender<ScreenEvent>) {
        self.view.begin_fetch();
        let client = self.client.clone();
        let tx = event_tx.clone();
        tokio::spawn(async move {
            let result = client.fetch_catalog().await;
            if let Err(e) = tx
                .send(ScreenEvent::CatalogFetched { generation, result })
                .await
            {
                tracing::debug!(error = %e, "Catalog fetch finished after screen closed");
            }
        });
    }

    pub(super) fn cancel_fetch(&mut self) {
        self.view.cancel_fetch();
    }

    /// Apply a fetch result. Returns a notice when the fetch failed.
    pub(super) fn apply_fetched(&mut self, result: Result<Vec<Item>, FetchError>) -> Option<Notice> {
        let notice = result
            .as_ref()
            .err()
            .map(|e| Notice::error(format!("Failed to load catalog: {}", e)));
        self.view.apply_fetch(result);
        notice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    async fn test_state() -> FavoritesState<Database> {
        let db = Database::open(":memory:").await.unwrap();
        FavoritesState::new(FavoritesStore::new(db))
    }

    #[tokio::test]
    async fn test_load_from_before_a_toggle_is_ignored() {
        let mut state = test_state().await;
        let stale_revision = state.revision;

        let (added, _) = state.toggle(Item::new("1", "Robot", "Tech", 30.0)).await;
        assert_eq!(added, Some(true));

        assert!(state
            .apply_loaded(stale_revision, Ok(FavoritesSet::new()))
            .is_none());
        assert!(state.set().contains("1"));

        // a load spawned after the toggle replaces the snapshot
        assert!(state
            .apply_loaded(state.revision, Ok(FavoritesSet::new()))
            .is_none());
        assert!(state.set().is_empty());
    }
}
