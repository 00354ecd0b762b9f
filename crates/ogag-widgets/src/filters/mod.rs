//! Collection filtering.
//!
//! Contains the filter state mirrored to the URL, the product predicate and
//! the widget that applies both to the product grid.

mod predicate;
mod state;
mod widget;

pub use predicate::{matches, ProductCard};
pub use state::{Availability, FilterState, FilterUpdate, FILTER_PARAMS};
pub use widget::{CollectionFilters, FiltersChanged};
