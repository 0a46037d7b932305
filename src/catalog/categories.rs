use std::collections::HashSet;
use std::fmt;

use super::item::Item;

/// Synthetic identifier of a category within one fetched snapshot.
///
/// `0` is reserved for the "All" sentinel; derived categories are numbered
/// from `1` in first-occurrence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryId(u32);

impl CategoryId {
    pub const ALL: CategoryId = CategoryId(0);

    pub fn get(self) -> u32 {
        self.0
    }
}

/// A grouping key used to filter the catalog view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    id: CategoryId,
    key: String,
}

impl Category {
    /// Display label of the sentinel that matches every item.
    pub const ALL_KEY: &'static str = "All";

    pub fn all() -> Self {
        Self {
            id: CategoryId::ALL,
            key: Self::ALL_KEY.to_owned(),
        }
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Identity is the sentinel id, not the label: an item whose category is
    /// literally "All" still gets its own derived category.
    pub fn is_all(&self) -> bool {
        self.id == CategoryId::ALL
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.is_all() || item.category == self.key
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Derive the category bar for one catalog snapshot.
///
/// The first entry is always [`Category::all`]; the rest are the distinct
/// non-empty `category` values in first-occurrence order. Every call returns
/// a fresh list.
pub fn derive_categories(items: &[Item]) -> Vec<Category> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut categories = vec![Category::all()];

    for item in items {
        let key = item.category.as_str();
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        categories.push(Category {
            id: CategoryId(categories.len() as u32),
            key: key.to_owned(),
        });
    }

    categories
}

/// Items visible under `category`, preserving their original relative order.
pub fn filter_by_category<'a>(items: &'a [Item], category: &Category) -> Vec<&'a Item> {
    if category.is_all() {
        return items.iter().collect();
    }
    items.iter().filter(|item| category.matches(item)).collect()
}

/// Re-validate a category reference against a (possibly newer) category list.
///
/// An exact match is kept as-is. A reference from an older snapshot is mapped
/// by key onto the current list; if the key no longer exists the selection
/// falls back to "All" instead of silently matching nothing.
pub fn revalidate(selected: &Category, categories: &[Category]) -> Category {
    if selected.is_all() {
        return Category::all();
    }
    if categories.contains(selected) {
        return selected.clone();
    }
    match categories
        .iter()
        .find(|c| !c.is_all() && c.key == selected.key)
    {
        Some(current) => current.clone(),
        None => {
            tracing::debug!(category = %selected.key, "Selected category no longer exists, showing all");
            Category::all()
        }
    }
}
