//! Error types for per-item resolution.

use thiserror::Error;

use crate::api::ApiError;

/// Why an entry could not be turned into a download task.
///
/// Both variants are item-scoped: the run records a warning and moves on.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No rendition matched the requested label or the default order.
    #[error("no matching size for item {item_id} (requested: {requested}; available: {available})")]
    NoMatchingSize {
        /// Item id.
        item_id: String,
        /// Requested label, or `default` when none was given.
        requested: String,
        /// Labels the service offered, comma separated.
        available: String,
    },

    /// Fetching the item's renditions failed.
    #[error("failed to fetch sizes for item {item_id}: {source}")]
    Api {
        /// Item id.
        item_id: String,
        /// Underlying gateway error.
        #[source]
        source: ApiError,
    },
}

impl ResolveError {
    /// Creates a no-match error from the offered variants' labels.
    pub fn no_matching_size<'a>(
        item_id: impl Into<String>,
        requested: Option<&str>,
        available: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let available: Vec<&str> = available.into_iter().collect();
        Self::NoMatchingSize {
            item_id: item_id.into(),
            requested: requested.unwrap_or("default").to_string(),
            available: if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            },
        }
    }

    /// Wraps a gateway failure for an item.
    pub fn api(item_id: impl Into<String>, source: ApiError) -> Self {
        Self::Api {
            item_id: item_id.into(),
            source,
        }
    }
}
