use thiserror::Error;

use super::set::FavoritesSet;
use crate::catalog::Item;
use crate::storage::KeyValueStore;

/// Storage key of the serialized favorites snapshot.
pub const FAVORITES_KEY: &str = "favorites";

/// Persistence failures surfaced to screens.
///
/// A failed operation never leaves a half-applied snapshot: the caller keeps
/// the set it had before the call.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read favorites: {0}")]
    Read(String),
    #[error("Failed to save favorites: {0}")]
    Write(String),
    #[error("Failed to encode favorites: {0}")]
    Encode(String),
}

/// The single read/mutate/write contract for the persisted favorites.
///
/// Every mutation re-reads the stored snapshot, applies the change and
/// rewrites the whole blob in one write. Nothing is cached between calls, so
/// each operation starts from whatever another screen last wrote. Mutations
/// from different screens are not serialized against each other: the last
/// write wins.
#[derive(Clone)]
pub struct FavoritesStore<S> {
    kv: S,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Current favorites; never fails.
    ///
    /// A missing, unparsable or unreadable blob yields an empty set.
    pub async fn load(&self) -> FavoritesSet {
        match self.try_load().await {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load favorites, using empty set");
                FavoritesSet::new()
            }
        }
    }

    /// Like [`load`](Self::load), but reports a storage read failure.
    ///
    /// A missing key or a corrupt blob is still an empty set, not an error.
    pub async fn try_load(&self) -> Result<FavoritesSet, StoreError> {
        let raw = self
            .kv
            .get_value(FAVORITES_KEY)
            .await
            .map_err(|e| StoreError::Read(e.to_string()))?;

        let Some(raw) = raw else {
            return Ok(FavoritesSet::new());
        };

        match serde_json::from_str::<FavoritesSet>(&raw) {
            Ok(set) => Ok(set),
            Err(e) => {
                tracing::warn!(error = %e, "Stored favorites are unparsable, treating as empty");
                Ok(FavoritesSet::new())
            }
        }
    }

    /// Add `item` unless its id is already a favorite.
    ///
    /// Already present: returns the current set without writing.
    pub async fn add(&self, item: Item) -> Result<FavoritesSet, StoreError> {
        let mut set = self.try_load().await?;
        let id = item.id.clone();
        if !set.insert(item) {
            tracing::debug!(id = %id, "Item already a favorite");
            return Ok(set);
        }
        self.persist(&set).await?;
        tracing::debug!(id = %id, count = set.len(), "Favorite added");
        Ok(set)
    }

    /// Remove the favorite with `id`; absent ids are a no-op without a write.
    pub async fn remove(&self, id: &str) -> Result<FavoritesSet, StoreError> {
        let mut set = self.try_load().await?;
        if !set.remove(id) {
            return Ok(set);
        }
        self.persist(&set).await?;
        tracing::debug!(id = %id, count = set.len(), "Favorite removed");
        Ok(set)
    }

    /// Add `item` if absent, remove it if present.
    ///
    /// The flag is `true` when the item was added.
    pub async fn toggle(&self, item: Item) -> Result<(FavoritesSet, bool), StoreError> {
        let mut set = self.try_load().await?;
        let id = item.id.clone();
        let was_added = if set.remove(id.as_str()) {
            false
        } else {
            set.insert(item)
        };
        self.persist(&set).await?;
        tracing::debug!(id = %id, added = was_added, count = set.len(), "Favorite toggled");
        Ok((set, was_added))
    }

    /// Persist an empty set unconditionally.
    pub async fn clear(&self) -> Result<FavoritesSet, StoreError> {
        let set = FavoritesSet::new();
        self.persist(&set).await?;
        tracing::debug!("Favorites cleared");
        Ok(set)
    }

    async fn persist(&self, set: &FavoritesSet) -> Result<(), StoreError> {
        let raw = serde_json::to_string(set).map_err(|e| StoreError::Encode(e.to_string()))?;
        self.kv
            .set_value(FAVORITES_KEY, &raw)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to persist favorites");
                StoreError::Write(e.to_string())
            })
    }
}
