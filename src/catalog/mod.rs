//! Catalog retrieval and the catalog view model.
//!
//! - `fetcher` - One-shot HTTP retrieval of the remote item list
//! - `parser` - Best-effort JSON parsing with legacy field names
//! - `categories` - Category derivation and filtering
//! - `view` - Per-screen catalog state, favorite merging and sorting
//!
//! # Example
//!
//! ```ignore
//! use shelf::catalog::{derive_categories, filter_by_category, CatalogClient};
//!
//! let items = client.fetch_catalog().await?;
//! let categories = derive_categories(&items);
//! let visible = filter_by_category(&items, &categories[1]);
//! ```

mod categories;
mod fetcher;
mod item;
mod parser;
mod view;

pub use categories::{derive_categories, filter_by_category, revalidate, Category, CategoryId};
pub use fetcher::{CatalogClient, FetchError};
pub use item::{Item, ItemId};
pub use parser::{parse_catalog, ParseError, ParseResult};
pub use view::{
    featured_by_price, sort_by_subtype, with_favorite_flags, CatalogView, FlaggedItem, LoadState,
};
