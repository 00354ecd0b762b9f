//! Widget error types.
//!
//! Widgets degrade instead of failing the page: these errors are logged at the
//! point they occur and only surface to callers through `Result`-returning
//! loaders.

use ogag_core::{FetchError, StorageError};
use thiserror::Error;

/// Errors that can occur in theme widgets.
#[derive(Error, Debug)]
pub enum WidgetError {
    /// Required element is not in the page.
    #[error("Element not found: {0}")]
    MissingElement(String),

    /// Storage read or write failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Network request failed.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Settings or data document could not be parsed.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<serde_json::Error> for WidgetError {
    fn from(e: serde_json::Error) -> Self {
        WidgetError::InvalidData(e.to_string())
    }
}
