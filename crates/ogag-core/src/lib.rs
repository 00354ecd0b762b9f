//! Page platform for the Of Gold and Grace storefront theme.
//!
//! This crate provides the browser-facing primitives the theme widgets run on:
//! - `Document` - In-memory element tree with attribute/class/style access
//! - `EventBus` - Typed handler registration for widget notifications
//! - `Storage` - Key/value persistence (local storage)
//! - `Location` - Page URL with query parameters and history replacement
//! - `Fetcher` - Outbound JSON requests
//! - `StructuredLogger` - Structured logging with component context
//!
//! Nothing here is global: a host constructs these values and hands them to
//! the widgets that need them.

mod dom;
mod events;
mod fetch;
mod location;
mod logging;
mod storage;

pub use dom::*;
pub use events::*;
pub use fetch::*;
pub use location::*;
pub use logging::*;
pub use storage::*;
