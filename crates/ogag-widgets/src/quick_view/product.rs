//! Product JSON served by `/products/<handle>.js`.

use serde::{Deserialize, Serialize};

use crate::money::{Currency, Money};

/// The subset of the product payload the modal renders. Prices are in cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickViewProduct {
    #[serde(default)]
    pub id: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub handle: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub compare_at_price: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Option names (`Size`, `Metal`), in option1..option3 order.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: u64,
    #[serde(default)]
    pub option1: Option<String>,
    #[serde(default)]
    pub option2: Option<String>,
    #[serde(default)]
    pub option3: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub compare_at_price: Option<i64>,
}

impl ProductVariant {
    /// Option values by position.
    pub fn option_values(&self) -> [Option<&str>; 3] {
        [
            self.option1.as_deref(),
            self.option2.as_deref(),
            self.option3.as_deref(),
        ]
    }

    pub fn price_display(&self, currency: Currency) -> PriceDisplay {
        PriceDisplay::new(self.price, self.compare_at_price, currency)
    }
}

/// One option select: its position, label and distinct values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup {
    pub index: usize,
    pub name: String,
    pub values: Vec<String>,
}

/// Current price, plus the compare-at price when the item is on sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceDisplay {
    pub price: Money,
    pub compare_at: Option<Money>,
}

impl PriceDisplay {
    pub fn new(price: i64, compare_at: Option<i64>, currency: Currency) -> Self {
        let price = Money::new(price, currency);
        let compare_at = compare_at
            .map(|c| Money::new(c, currency))
            .filter(|c| price.is_discounted_from(c));
        Self { price, compare_at }
    }

    pub fn on_sale(&self) -> bool {
        self.compare_at.is_some()
    }
}

impl QuickViewProduct {
    /// Featured image, else the first image.
    pub fn image(&self) -> Option<&str> {
        self.featured_image
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
    }

    pub fn price_display(&self, currency: Currency) -> PriceDisplay {
        PriceDisplay::new(self.price, self.compare_at_price, currency)
    }

    /// Distinct values per option position, in first-seen order. Positions no
    /// variant uses are skipped.
    pub fn option_groups(&self) -> Vec<OptionGroup> {
        (0..3)
            .filter_map(|index| {
                let mut values: Vec<String> = Vec::new();
                for variant in &self.variants {
                    if let Some(value) = variant.option_values()[index] {
                        if !values.iter().any(|v| v == value) {
                            values.push(value.to_string());
                        }
                    }
                }
                if values.is_empty() {
                    return None;
                }
                let name = self
                    .options
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| format!("Option {}", index + 1));
                Some(OptionGroup { index, name, values })
            })
            .collect()
    }

    /// The variant whose options equal `selected` at every position it uses.
    pub fn find_variant(&self, selected: &[Option<&str>; 3]) -> Option<&ProductVariant> {
        self.variants.iter().find(|variant| {
            variant
                .option_values()
                .iter()
                .zip(selected.iter())
                .all(|(own, chosen)| own.is_none() || own == chosen)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> QuickViewProduct {
        serde_json::from_str(
            r#"{
                "id": 123, "title": "Stacking Ring", "handle": "stacking-ring",
                "price": 2999, "compare_at_price": 3999,
                "images": ["/a.jpg", "/b.jpg"],
                "options": ["Size", "Metal"],
                "variants": [
                    {"id": 1, "option1": "6", "option2": "Gold", "price": 2999, "compare_at_price": 3999},
                    {"id": 2, "option1": "7", "option2": "Gold", "price": 2999},
                    {"id": 3, "option1": "6", "option2": "Silver", "price": 1999, "compare_at_price": null}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_option_groups() {
        let groups = ring().option_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Size");
        assert_eq!(groups[0].values, vec!["6", "7"]);
        assert_eq!(groups[1].name, "Metal");
        assert_eq!(groups[1].values, vec!["Gold", "Silver"]);
    }

    #[test]
    fn test_find_variant() {
        let product = ring();
        let found = product.find_variant(&[Some("6"), Some("Silver"), None]).unwrap();
        assert_eq!(found.id, 3);
        assert!(product.find_variant(&[Some("7"), Some("Silver"), None]).is_none());
    }

    #[test]
    fn test_price_display() {
        let product = ring();
        let display = product.price_display(Currency::USD);
        assert!(display.on_sale());
        assert_eq!(display.price.display(), "$29.99");
        assert_eq!(display.compare_at.unwrap().display(), "$39.99");

        let plain = PriceDisplay::new(2999, Some(2999), Currency::USD);
        assert!(!plain.on_sale());
    }

    #[test]
    fn test_image_fallback() {
        let mut product = ring();
        assert_eq!(product.image(), Some("/a.jpg"));
        product.featured_image = Some("/featured.jpg".to_string());
        assert_eq!(product.image(), Some("/featured.jpg"));
    }

    #[test]
    fn test_unnamed_options() {
        let mut product = ring();
        product.options.clear();
        assert_eq!(product.option_groups()[1].name, "Option 2");
    }
}
