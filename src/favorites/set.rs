use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::catalog::Item;

/// Ordered collection of favorited items, unique by id.
///
/// Serializes as a plain JSON array of full items. Duplicate ids in a
/// deserialized array keep their first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Item>", into = "Vec<Item>")]
pub struct FavoritesSet {
    items: Vec<Item>,
}

impl From<Vec<Item>> for FavoritesSet {
    fn from(items: Vec<Item>) -> Self {
        let mut seen = HashSet::with_capacity(items.len());
        let items = items
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .collect();
        Self { items }
    }
}

impl From<FavoritesSet> for Vec<Item> {
    fn from(set: FavoritesSet) -> Self {
        set.items
    }
}

impl FavoritesSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id.as_str() == id)
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id.as_str() == id)
    }

    /// Append `item` unless its id is already present. Returns whether it was added.
    pub(crate) fn insert(&mut self, item: Item) -> bool {
        if self.contains(item.id.as_str()) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Drop the entry with `id`. Returns whether anything was removed.
    pub(crate) fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id.as_str() != id);
        self.items.len() != before
    }
}

impl<'a> IntoIterator for &'a FavoritesSet {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_unique_by_id() {
        let mut set = FavoritesSet::new();
        assert!(set.insert(Item::new("1", "a", "A", 1.0)));
        assert!(!set.insert(Item::new("1", "changed", "B", 2.0)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.items()[0].name, "a");
    }

    #[test]
    fn test_remove_reports_change() {
        let mut set = FavoritesSet::from(vec![Item::new("1", "a", "A", 1.0)]);
        assert!(!set.remove("2"));
        assert!(set.remove("1"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_deserialize_drops_duplicate_ids() {
        let json = r#"[
            {"id":"1","name":"first","price":1},
            {"id":"2","name":"other","price":2},
            {"id":"1","name":"second","price":3}
        ]"#;
        let set: FavoritesSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("1").unwrap().name, "first");
    }

    #[test]
    fn test_serializes_as_array() {
        let set = FavoritesSet::from(vec![Item::new("1", "a", "A", 1.0)]);
        let value = serde_json::to_value(&set).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["id"], "1");
    }
}
