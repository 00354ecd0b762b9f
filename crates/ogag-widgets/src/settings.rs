//! Theme settings and locale messages.
//!
//! Settings are read from the JSON the theme renders into the page (or a
//! file, for tooling). Every field has a default so partial documents work.

use serde::{Deserialize, Serialize};

use crate::error::WidgetError;
use crate::money::Currency;

/// All widget settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    pub currency: Currency,
    pub wishlist: WishlistSettings,
    pub reviews: ReviewsSettings,
    pub lazy_load: LazyLoadSettings,
    pub quick_view: QuickViewSettings,
    pub performance: PerformanceSettings,
    pub messages: Messages,
}

impl ThemeSettings {
    /// Parse settings JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, WidgetError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Wishlist persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WishlistSettings {
    /// Local storage key holding the JSON array of handles.
    pub storage_key: String,
    /// How long a toggle button stays in its loading state.
    pub button_reset_ms: u64,
}

impl Default for WishlistSettings {
    fn default() -> Self {
        Self {
            storage_key: "ogag:wishlist".to_string(),
            button_reset_ms: 300,
        }
    }
}

/// Reviews widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewsSettings {
    /// URL of the static reviews JSON asset.
    pub source_url: String,
    pub per_page: usize,
}

impl Default for ReviewsSettings {
    fn default() -> Self {
        Self {
            source_url: "/assets/reviews.json".to_string(),
            per_page: 5,
        }
    }
}

/// Lazy loader observer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LazyLoadSettings {
    /// Start loading this many pixels before an element enters the viewport.
    pub root_margin_px: u32,
    /// Fraction of the element that must be visible.
    pub threshold: f64,
}

impl Default for LazyLoadSettings {
    fn default() -> Self {
        Self {
            root_margin_px: 100,
            threshold: 0.1,
        }
    }
}

/// Quick view modal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickViewSettings {
    pub max_quantity: u32,
    /// Lifetime of the "added to cart" notification.
    pub notification_ms: u64,
    /// How long the add button shows its error label.
    pub error_reset_ms: u64,
}

impl Default for QuickViewSettings {
    fn default() -> Self {
        Self {
            max_quantity: 99,
            notification_ms: 3000,
            error_reset_ms: 2000,
        }
    }
}

/// Core Web Vitals thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSettings {
    pub lcp_good_ms: f64,
    pub lcp_ok_ms: f64,
    pub cls_good: f64,
    pub cls_ok: f64,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            lcp_good_ms: 2500.0,
            lcp_ok_ms: 4000.0,
            cls_good: 0.1,
            cls_ok: 0.25,
        }
    }
}

/// Translated strings. `{name}` placeholders are filled by [`Messages::format`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub product_added_to_cart: String,
    pub products_added_to_cart: String,
    pub product_added_to_wishlist: String,
    pub product_removed_from_wishlist: String,
    pub cart_updated: String,
    pub filter_applied_singular: String,
    pub filters_applied: String,
    pub search_result_found: String,
    pub search_results_found: String,
    pub skip_link_activated: String,
    pub add_to_wishlist: String,
    pub remove_from_wishlist: String,
    pub results_count_singular: String,
    pub results_count: String,
    pub reviews_error: String,
    pub reviews_range: String,
    pub verified_purchase: String,
    pub quick_view_error: String,
    pub add_to_cart: String,
    pub adding_to_cart: String,
    pub add_to_cart_error: String,
    pub added_to_cart_notification: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            product_added_to_cart: "{product} added to cart".to_string(),
            products_added_to_cart: "{count} of {product} added to cart".to_string(),
            product_added_to_wishlist: "{product} added to wishlist".to_string(),
            product_removed_from_wishlist: "{product} removed from wishlist".to_string(),
            cart_updated: "Cart updated".to_string(),
            filter_applied_singular: "{filter} filter applied".to_string(),
            filters_applied: "{count} filters applied".to_string(),
            search_result_found: "1 result found for {query}".to_string(),
            search_results_found: "{count} results found for {query}".to_string(),
            skip_link_activated: "{link} navigation activated".to_string(),
            add_to_wishlist: "add to wishlist".to_string(),
            remove_from_wishlist: "remove from wishlist".to_string(),
            results_count_singular: "1 product".to_string(),
            results_count: "{count} products".to_string(),
            reviews_error: "Unable to load reviews at this time. Please try again later."
                .to_string(),
            reviews_range: "Showing {start}-{end} of {total} reviews".to_string(),
            verified_purchase: "\u{2713} Verified Purchase".to_string(),
            quick_view_error: "Unable to load this product. Please try again later.".to_string(),
            add_to_cart: "Add to Cart".to_string(),
            adding_to_cart: "Adding...".to_string(),
            add_to_cart_error: "Error - Try Again".to_string(),
            added_to_cart_notification: "Item added to cart!".to_string(),
        }
    }
}

impl Messages {
    /// Replace each `{key}` in `template` with its value.
    pub fn format(template: &str, args: &[(&str, &str)]) -> String {
        args.iter().fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{}}}", key), value)
        })
    }
}
