use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use super::categories::{derive_categories, filter_by_category, revalidate, Category};
use super::fetcher::FetchError;
use super::item::Item;
use crate::favorites::FavoritesSet;

/// An item as rendered in a list, with its favorite status merged in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlaggedItem<'a> {
    pub item: &'a Item,
    pub is_favorite: bool,
}

/// Merge favorite status into `items`.
///
/// Builds one id lookup set from `favorites`, so the merge is
/// O(items + favorites).
pub fn with_favorite_flags<'a, I>(items: I, favorites: &FavoritesSet) -> Vec<FlaggedItem<'a>>
where
    I: IntoIterator<Item = &'a Item>,
{
    let favorite_ids: HashSet<&str> = favorites.iter().map(|f| f.id.as_str()).collect();
    items
        .into_iter()
        .map(|item| FlaggedItem {
            item,
            is_favorite: favorite_ids.contains(item.id.as_str()),
        })
        .collect()
}

/// Subset of `items` matching `predicate`, sorted by price.
///
/// The sort is stable: items with equal prices keep their original order in
/// both directions.
pub fn sort_by_subtype<'a, I, P>(items: I, predicate: P, descending: bool) -> Vec<&'a Item>
where
    I: IntoIterator<Item = &'a Item>,
    P: Fn(&Item) -> bool,
{
    let mut subset: Vec<&Item> = items.into_iter().filter(|item| predicate(*item)).collect();
    subset.sort_by(|a, b| {
        let ord = a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
    subset
}

/// Featured items, most expensive first.
pub fn featured_by_price(items: &[Item]) -> Vec<&Item> {
    sort_by_subtype(items, |item| item.is_featured, true)
}

/// Catalog loading state of one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    /// The last fetch failed; any previously loaded catalog is still shown.
    FetchFailed { error: String },
}

/// Fetched catalog snapshot plus the active category filter.
///
/// Owns the item list and the categories derived from it. A failed fetch
/// never clears what was loaded before.
#[derive(Debug, Clone)]
pub struct CatalogView {
    state: LoadState,
    items: Arc<Vec<Item>>,
    categories: Vec<Category>,
    selected: Category,
}

impl Default for CatalogView {
    fn default() -> Self {
        Self {
            state: LoadState::Idle,
            items: Arc::new(Vec::new()),
            categories: vec![Category::all()],
            selected: Category::all(),
        }
    }
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Whether focusing the screen should start a catalog fetch.
    ///
    /// With `refetch_on_focus` off, a loaded catalog is reused; idle and
    /// failed views always fetch. A fetch already in flight is never doubled.
    pub fn needs_fetch(&self, refetch_on_focus: bool) -> bool {
        match self.state {
            LoadState::Loading => false,
            LoadState::Loaded => refetch_on_focus,
            LoadState::Idle | LoadState::FetchFailed { .. } => true,
        }
    }

    pub fn begin_fetch(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Fetch was abandoned before it completed (screen lost focus).
    ///
    /// Returns to `Loaded` if a catalog was already shown, else `Idle`.
    pub fn cancel_fetch(&mut self) {
        if self.is_loading() {
            self.state = if self.items.is_empty() {
                LoadState::Idle
            } else {
                LoadState::Loaded
            };
        }
    }

    /// Apply the outcome of a fetch.
    ///
    /// On success the item list and categories are replaced and the current
    /// selection is re-validated against the new categories. On failure only
    /// the state changes.
    pub fn apply_fetch(&mut self, result: Result<Vec<Item>, FetchError>) {
        match result {
            Ok(items) => {
                self.categories = derive_categories(&items);
                self.selected = revalidate(&self.selected, &self.categories);
                self.items = Arc::new(items);
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Catalog fetch failed, keeping previous snapshot");
                self.state = LoadState::FetchFailed {
                    error: e.to_string(),
                };
            }
        }
    }

    /// The full fetched list, regardless of the filter.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn selected(&self) -> &Category {
        &self.selected
    }

    /// Select `category`, re-validating references that came from an older
    /// snapshot. Returns the category actually selected.
    pub fn select_category(&mut self, category: &Category) -> &Category {
        self.selected = revalidate(category, &self.categories);
        &self.selected
    }

    /// Select by label; unknown labels select "All".
    pub fn select_category_by_key(&mut self, key: &str) -> &Category {
        let category = self
            .categories
            .iter()
            .find(|c| c.key() == key)
            .cloned()
            .unwrap_or_else(Category::all);
        self.selected = category;
        &self.selected
    }

    /// Items visible under the current filter, in catalog order.
    pub fn visible(&self) -> Vec<&Item> {
        filter_by_category(&self.items, &self.selected)
    }

    pub fn find(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id.as_str() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn favorites_of(items: &[Item]) -> FavoritesSet {
        FavoritesSet::from(items.to_vec())
    }

    fn ids(items: &[&Item]) -> Vec<String> {
        items.iter().map(|i| i.id.to_string()).collect()
    }

    #[test]
    fn test_flags_follow_favorite_ids() {
        let catalog = vec![
            Item::new("1", "One", "A", 1.0),
            Item::new("2", "Two", "A", 2.0),
            Item::new("3", "Three", "B", 3.0),
        ];
        let favorites = favorites_of(&[catalog[2].clone()]);

        let flagged = with_favorite_flags(&catalog, &favorites);
        let flags: Vec<bool> = flagged.iter().map(|f| f.is_favorite).collect();
        assert_eq!(flags, vec![false, false, true]);
    }

    #[test]
    fn test_flags_match_by_id_not_by_value() {
        // A favorite copied from an older catalog still matches by id
        let catalog = vec![Item::new("1", "Renamed", "A", 99.0)];
        let favorites = favorites_of(&[Item::new("1", "Original", "Z", 1.0)]);
        assert!(with_favorite_flags(&catalog, &favorites)[0].is_favorite);
    }

    #[test]
    fn test_featured_sorted_by_price_descending() {
        let catalog = vec![
            Item::new("1", "a", "A", 10.0).featured(true),
            Item::new("2", "b", "A", 50.0),
            Item::new("3", "c", "A", 30.0).featured(true),
            Item::new("4", "d", "A", 30.0).featured(true),
            Item::new("5", "e", "A", 40.0).featured(true),
        ];
        assert_eq!(ids(&featured_by_price(&catalog)), vec!["5", "3", "4", "1"]);
    }

    #[test]
    fn test_sort_ascending_is_stable() {
        let catalog = vec![
            Item::new("1", "a", "A", 5.0),
            Item::new("2", "b", "A", 1.0),
            Item::new("3", "c", "A", 5.0),
        ];
        let sorted = sort_by_subtype(&catalog, |_| true, false);
        assert_eq!(ids(&sorted), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_view_starts_idle_and_needs_fetch() {
        let view = CatalogView::new();
        assert_eq!(view.state(), &LoadState::Idle);
        assert!(view.needs_fetch(false));
        assert_eq!(view.categories(), &[Category::all()]);
    }

    #[test]
    fn test_loaded_view_refetches_only_when_configured() {
        let mut view = CatalogView::new();
        view.begin_fetch();
        assert!(!view.needs_fetch(true));
        view.apply_fetch(Ok(vec![Item::new("1", "a", "A", 1.0)]));
        assert_eq!(view.state(), &LoadState::Loaded);
        assert!(!view.needs_fetch(false));
        assert!(view.needs_fetch(true));
    }

    #[test]
    fn test_failed_fetch_keeps_previous_items() {
        let mut view = CatalogView::new();
        view.apply_fetch(Ok(vec![
            Item::new("1", "a", "A", 1.0),
            Item::new("2", "b", "B", 2.0),
        ]));
        view.select_category_by_key("B");

        view.begin_fetch();
        view.apply_fetch(Err(FetchError::HttpStatus(500)));

        assert!(matches!(view.state(), LoadState::FetchFailed { .. }));
        assert_eq!(view.items().len(), 2);
        assert_eq!(view.selected().key(), "B");
        assert_eq!(ids(&view.visible()), vec!["2"]);
        assert!(view.needs_fetch(false));
    }

    #[test]
    fn test_refetch_revalidates_selection() {
        let mut view = CatalogView::new();
        view.apply_fetch(Ok(vec![
            Item::new("1", "a", "A", 1.0),
            Item::new("2", "b", "B", 2.0),
        ]));
        let stale_b = view.select_category_by_key("B").clone();
        assert_eq!(stale_b.id().get(), 2);

        // B moves to id 1 in the new snapshot
        view.apply_fetch(Ok(vec![Item::new("3", "c", "B", 3.0)]));
        assert_eq!(view.selected().key(), "B");
        assert_eq!(view.selected().id().get(), 1);

        // Category disappears entirely: fall back to All
        view.apply_fetch(Ok(vec![Item::new("4", "d", "C", 4.0)]));
        assert!(view.selected().is_all());
        assert_eq!(ids(&view.visible()), vec!["4"]);

        // Stale reference from the first snapshot
        assert!(view.select_category(&stale_b).is_all());
    }

    #[test]
    fn test_cancel_fetch_restores_state() {
        let mut view = CatalogView::new();
        view.begin_fetch();
        view.cancel_fetch();
        assert_eq!(view.state(), &LoadState::Idle);

        view.apply_fetch(Ok(vec![Item::new("1", "a", "A", 1.0)]));
        view.begin_fetch();
        view.cancel_fetch();
        assert_eq!(view.state(), &LoadState::Loaded);
    }

    #[test]
    fn test_unknown_key_selects_all() {
        let mut view = CatalogView::new();
        view.apply_fetch(Ok(vec![Item::new("1", "a", "A", 1.0)]));
        assert!(view.select_category_by_key("Nope").is_all());
    }

    proptest! {
        #[test]
        fn merge_flag_iff_id_in_favorites(
            catalog_ids in prop::collection::vec(0u8..20, 0..30),
            favorite_ids in prop::collection::vec(0u8..20, 0..10),
        ) {
            let catalog: Vec<Item> = catalog_ids
                .iter()
                .map(|id| Item::new(id.to_string(), "x", "A", 1.0))
                .collect();
            let favorites = FavoritesSet::from(
                favorite_ids
                    .iter()
                    .map(|id| Item::new(id.to_string(), "f", "B", 2.0))
                    .collect::<Vec<_>>(),
            );

            let flagged = with_favorite_flags(&catalog, &favorites);
            prop_assert_eq!(flagged.len(), catalog.len());
            for (flag, item) in flagged.iter().zip(&catalog) {
                prop_assert!(std::ptr::eq(flag.item, item));
                prop_assert_eq!(flag.is_favorite, favorites.contains(item.id.as_str()));
            }
        }
    }
}
