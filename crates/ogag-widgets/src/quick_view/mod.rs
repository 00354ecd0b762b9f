//! Quick view modal.

mod product;
mod widget;

pub use product::{OptionGroup, PriceDisplay, ProductVariant, QuickViewProduct};
pub use widget::{CartOutcome, QuickView};
