//! Product reviews.
//!
//! Contains the reviews feed model, the filter/sort/paginate pipeline and the
//! widget rendering it.

mod data;
mod pipeline;
mod widget;

pub use data::{AggregateRating, Author, Review, ReviewRating, ReviewsDocument, ValidationIssue};
pub use pipeline::{filter_and_sort, select_page, PageInfo, RatingFilter, ReviewSort};
pub use widget::{star_fill, ReviewsWidget, StarFill};
