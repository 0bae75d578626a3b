//! Item resolution: from a catalog entry to a concrete download task.
//!
//! # Architecture
//!
//! - [`ItemResolver`] - fetches an entry's renditions and builds its [`DownloadTask`]
//! - [`select_variant`] - pure size selection over one entry's renditions
//! - [`ResolveError`] - item-scoped failures, reported as run warnings
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use setget_core::{ApiCredentials, CatalogEntry, FlickrClient, ItemResolver, MediaKind};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(FlickrClient::new(ApiCredentials::new("key"))?);
//! let resolver = ItemResolver::new(api, Some("Large".to_string()));
//! let entry = CatalogEntry::new("5310215001", "Harbour at dusk", MediaKind::Photo);
//! let task = resolver.resolve(&entry, Path::new("./harbour")).await?;
//! println!("{} -> {}", task.variant.url, task.destination.display());
//! # Ok(())
//! # }
//! ```

mod error;
mod sizes;

pub use error::ResolveError;
pub use sizes::{photo_size_labels, select_variant, size_labels, video_size_labels};

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::api::{CatalogEntry, PhotoApi};
use crate::download::DownloadTask;
use crate::download::filename::{default_extension, extension_from_url, item_file_name};

/// Resolves catalog entries against the gateway with a fixed size request.
#[derive(Clone)]
pub struct ItemResolver {
    api: Arc<dyn PhotoApi>,
    size: Option<String>,
}

impl ItemResolver {
    /// Creates a resolver. `size` is the requested label; `None` uses the
    /// best-first default order of each media kind.
    #[must_use]
    pub fn new(api: Arc<dyn PhotoApi>, size: Option<String>) -> Self {
        Self { api, size }
    }

    /// The requested size label, if any.
    #[must_use]
    pub fn requested_size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    /// Picks a rendition for `entry` and its destination under `destination_dir`.
    ///
    /// Makes exactly one size fetch; there is no fallback retry.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Api`] when the size fetch fails,
    /// [`ResolveError::NoMatchingSize`] when no rendition fits.
    #[instrument(skip(self, destination_dir), fields(item_id = %entry.id, kind = %entry.kind))]
    pub async fn resolve(
        &self,
        entry: &CatalogEntry,
        destination_dir: &Path,
    ) -> Result<DownloadTask, ResolveError> {
        let variants = self
            .api
            .size_variants(&entry.id)
            .await
            .map_err(|source| ResolveError::api(&entry.id, source))?;

        let requested = self.requested_size();
        let Some(variant) = select_variant(entry.kind, &variants, requested) else {
            return Err(ResolveError::no_matching_size(
                &entry.id,
                requested,
                variants.iter().map(|v| v.label.as_str()),
            ));
        };

        let extension = extension_from_url(&variant.url)
            .unwrap_or_else(|| default_extension(entry.kind).to_string());
        let file_name = item_file_name(&entry.title, &entry.id, &extension);
        let destination = destination_dir.join(file_name);

        debug!(label = %variant.label, destination = %destination.display(), "resolved item");
        Ok(DownloadTask::new(entry.clone(), variant.clone(), destination))
    }
}

impl std::fmt::Debug for ItemResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemResolver")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use async_trait::async_trait;

    use super::*;
    use crate::api::{ApiError, CollectionPage, MediaKind, SizeVariant, TokenGrant};

    #[derive(Default)]
    struct SizesOnly {
        sizes: HashMap<String, Vec<SizeVariant>>,
    }

    #[async_trait]
    impl PhotoApi for SizesOnly {
        async fn collection_page(
            &self,
            _set_id: &str,
            _user_id: &str,
            _page: u32,
        ) -> Result<CollectionPage, ApiError> {
            Err(ApiError::NotFound {
                message: "unused".to_string(),
            })
        }

        async fn size_variants(&self, item_id: &str) -> Result<Vec<SizeVariant>, ApiError> {
            self.sizes.get(item_id).cloned().ok_or(ApiError::NotFound {
                message: format!("photo {item_id} not found"),
            })
        }

        async fn exchange_mini_token(
            &self,
            _api_key: &str,
            _secret: &str,
            _mini_token: &str,
        ) -> Result<TokenGrant, ApiError> {
            Err(ApiError::NotFound {
                message: "unused".to_string(),
            })
        }
    }

    fn api_with(item_id: &str, variants: Vec<SizeVariant>) -> Arc<dyn PhotoApi> {
        let mut api = SizesOnly::default();
        api.sizes.insert(item_id.to_string(), variants);
        Arc::new(api)
    }

    fn photo_sizes() -> Vec<SizeVariant> {
        vec![
            SizeVariant::new("Small", "https://live.example/1_m.jpg", MediaKind::Photo),
            SizeVariant::new("Large", "https://live.example/1_b.jpg", MediaKind::Photo),
            SizeVariant::new("Original", "https://live.example/1_o.png", MediaKind::Photo),
        ]
    }

    #[tokio::test]
    async fn test_resolve_requested_original() {
        let resolver = ItemResolver::new(api_with("1", photo_sizes()), Some("Original".into()));
        let entry = CatalogEntry::new("1", "Sunset", MediaKind::Photo);

        let task = resolver.resolve(&entry, Path::new("/out")).await.unwrap();

        assert_eq!(task.variant.url, "https://live.example/1_o.png");
        assert_eq!(task.destination, PathBuf::from("/out/Sunset.png"));
    }

    #[tokio::test]
    async fn test_resolve_unknown_size_is_no_match() {
        let resolver = ItemResolver::new(api_with("1", photo_sizes()), Some("Huge".into()));
        let entry = CatalogEntry::new("1", "Sunset", MediaKind::Photo);

        let error = resolver.resolve(&entry, Path::new("/out")).await.unwrap_err();

        assert!(matches!(error, ResolveError::NoMatchingSize { .. }));
        assert!(error.to_string().contains("Original"));
    }

    #[tokio::test]
    async fn test_resolve_untitled_video_uses_id_and_default_extension() {
        let variants = vec![SizeVariant::new(
            "Site MP4",
            "https://www.example.com/photos/u/9/play/site/abc/",
            MediaKind::Video,
        )];
        let resolver = ItemResolver::new(api_with("9", variants), None);
        let entry = CatalogEntry::new("9", "", MediaKind::Video);

        let task = resolver.resolve(&entry, Path::new("out")).await.unwrap();

        assert_eq!(task.destination, PathBuf::from("out/9.mp4"));
    }

    #[tokio::test]
    async fn test_resolve_size_fetch_failure_is_api_error() {
        let resolver = ItemResolver::new(Arc::new(SizesOnly::default()), None);
        let entry = CatalogEntry::new("404", "gone", MediaKind::Photo);

        let error = resolver.resolve(&entry, Path::new("out")).await.unwrap_err();

        assert!(matches!(error, ResolveError::Api { ref item_id, .. } if item_id == "404"));
    }

    #[tokio::test]
    async fn test_resolve_sanitizes_title() {
        let resolver = ItemResolver::new(api_with("1", photo_sizes()), None);
        let entry = CatalogEntry::new("1", "a/b: c?", MediaKind::Photo);

        let task = resolver.resolve(&entry, Path::new("out")).await.unwrap();

        assert_eq!(task.variant.label, "Original");
        assert_eq!(task.destination, PathBuf::from("out/a_b_c.png"));
    }
}
