//! Product inclusion predicate.

use ogag_core::Element;
use serde::Serialize;

use super::state::{parse_price, FilterState};

/// A product card's filterable attributes, read from its `data-*` attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductCard {
    pub id: String,
    pub tags: Vec<String>,
    pub price: f64,
    pub available: bool,
}

impl ProductCard {
    pub fn new(id: impl Into<String>, tags: &[&str], price: f64, available: bool) -> Self {
        Self {
            id: id.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            price,
            available,
        }
    }

    /// Read `data-product-id`, `data-product-tags` (comma separated),
    /// `data-product-price` and `data-product-available`. A missing or
    /// malformed price reads as 0.
    pub fn from_element(element: &Element) -> Self {
        let tags = element
            .data("product-tags")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: element.data("product-id").unwrap_or_default().to_string(),
            tags,
            price: element
                .data("product-price")
                .and_then(parse_price)
                .unwrap_or(0.0),
            available: element
                .data("product-available")
                .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1"),
        }
    }

    /// Whether any product tag contains `needle`, ignoring case.
    fn has_tag_containing(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
    }
}

/// Whether `product` passes every active criterion in `state`.
pub fn matches(product: &ProductCard, state: &FilterState) -> bool {
    let tags_ok = state.tags.is_empty() || state.tags.iter().any(|t| product.has_tag_containing(t));

    let min_ok = state.price_min.map_or(true, |min| product.price >= min);
    let max_ok = state.price_max.map_or(true, |max| product.price <= max);

    let availability_ok = state.availability.is_none() || product.available;

    let metal_ok =
        state.metal.is_empty() || state.metal.iter().any(|m| product.has_tag_containing(m));

    tags_ok && min_ok && max_ok && availability_ok && metal_ok
}
