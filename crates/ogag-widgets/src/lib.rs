//! Storefront theme widgets for Of Gold and Grace.
//!
//! Every widget is an explicitly constructed service operating on the page
//! values from `ogag-core`:
//!
//! - **Announcements**: screen reader live region
//! - **Filters**: collection filtering with URL synchronisation
//! - **Reviews**: rating filter, sort and pagination over a reviews feed
//! - **Wishlist**: persisted product handles with toggle buttons
//! - **Quick view**: product modal with variant selection and add to cart
//! - **Focus trap**, **skip links**, **lazy loading**, **performance**
//!
//! # Example
//!
//! ```rust,ignore
//! use ogag_core::{Document, Location, MemoryStorage, StructuredLogger};
//! use ogag_widgets::prelude::*;
//!
//! let settings = ThemeSettings::default();
//! let logger = StructuredLogger::new("theme");
//! let mut doc = Document::new();
//! let mut announcer = Announcer::attach(&mut doc, settings.messages.clone(), &logger);
//!
//! let mut location = Location::parse("/collections/rings?tag=gold");
//! let mut filters = CollectionFilters::init(&mut doc, &mut location, settings.messages.clone(), &logger);
//! filters.toggle_tag(&mut doc, &mut location, "silver", true);
//!
//! let mut wishlist = WishlistManager::load(MemoryStorage::new(), &settings.wishlist, &logger);
//! wishlist.toggle("gold-hoop-earrings");
//! ```

pub mod announcements;
pub mod error;
pub mod filters;
pub mod focus_trap;
pub mod lazyload;
pub mod money;
pub mod performance;
pub mod quick_view;
pub mod reviews;
pub mod settings;
pub mod skip_links;
pub mod wishlist;

pub use error::WidgetError;
pub use settings::ThemeSettings;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::announcements::{Announcer, Politeness};
    pub use crate::error::WidgetError;
    pub use crate::filters::{matches, Availability, CollectionFilters, FilterState, FilterUpdate, FiltersChanged, ProductCard};
    pub use crate::focus_trap::{FocusTrap, FocusTrapOptions, FocusTrapRegistry, Key, KeyEvent, KeyOutcome, TrapEscape};
    pub use crate::lazyload::{LazyLoader, LazyOptions};
    pub use crate::money::{Currency, Money};
    pub use crate::performance::{PerformanceMonitor, VitalRating};
    pub use crate::quick_view::{CartOutcome, QuickView, QuickViewProduct};
    pub use crate::reviews::{select_page, PageInfo, RatingFilter, Review, ReviewSort, ReviewsDocument, ReviewsWidget};
    pub use crate::settings::{Messages, ThemeSettings};
    pub use crate::skip_links::SkipLinks;
    pub use crate::wishlist::{WishlistAction, WishlistButtons, WishlistManager, WishlistUpdated};
}
