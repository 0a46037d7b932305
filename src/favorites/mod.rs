//! Persisted favorites.
//!
//! [`FavoritesSet`] is the in-memory snapshot; [`FavoritesStore`] is the only
//! code that reads or writes the persisted blob.

mod set;
mod store;

pub use set::FavoritesSet;
pub use store::{FavoritesStore, StoreError, FAVORITES_KEY};
