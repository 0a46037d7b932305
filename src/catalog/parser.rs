use serde::Deserialize;
use thiserror::Error;

use super::item::{Item, ItemId};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected a JSON array of items")]
    NotAnArray,
}

/// Result of parsing a catalog payload, including skip statistics.
#[derive(Debug)]
pub struct ParseResult {
    /// Successfully parsed items, in payload order
    pub items: Vec<Item>,
    /// Number of entries skipped (missing id, bad price, wrong shape)
    pub skipped: usize,
}

/// Wire shape of one catalog entry.
///
/// Accepts both the canonical names and the legacy ones some catalog
/// deployments still send (`toyName`, `toyDescription`, `address`, `modern`).
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    id: Option<ItemId>,
    name: Option<String>,
    toy_name: Option<String>,
    price: Option<RawPrice>,
    image: Option<String>,
    image_url: Option<String>,
    description: Option<String>,
    toy_description: Option<String>,
    category: Option<String>,
    address: Option<String>,
    is_featured: Option<bool>,
    modern: Option<bool>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
}

impl RawPrice {
    fn value(&self) -> Option<f64> {
        let price = match self {
            RawPrice::Number(n) => *n,
            RawPrice::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        (price.is_finite() && price >= 0.0).then_some(price)
    }
}

impl RawItem {
    fn into_item(self) -> Option<Item> {
        let id = self.id.filter(|id| !id.as_str().trim().is_empty())?;
        let price = self.price.as_ref().and_then(RawPrice::value)?;

        Some(Item {
            id,
            name: self.name.or(self.toy_name).unwrap_or_default(),
            price,
            image_url: self.image.or(self.image_url).unwrap_or_default(),
            description: self.description.or(self.toy_description).unwrap_or_default(),
            category: self.category.or(self.address).unwrap_or_default(),
            is_featured: self.is_featured.or(self.modern).unwrap_or(false),
        })
    }
}

/// Parse a catalog payload with best-effort recovery for malformed entries.
///
/// The payload must be a JSON array. Entries that cannot be turned into an
/// [`Item`] are counted in [`ParseResult::skipped`] instead of failing the
/// whole catalog.
pub fn parse_catalog(bytes: &[u8]) -> Result<ParseResult, ParseError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let serde_json::Value::Array(entries) = value else {
        return Err(ParseError::NotAnArray);
    };

    let total = entries.len();
    let items: Vec<Item> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawItem>(entry).ok())
        .filter_map(RawItem::into_item)
        .collect();

    let skipped = total - items.len();
    Ok(ParseResult { items, skipped })
}
