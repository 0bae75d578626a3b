//! Remote API gateway for the photo-hosting service.
//!
//! The orchestrator and the auth flow only talk to the service through the
//! [`PhotoApi`] trait. [`FlickrClient`] is the production implementation
//! over the Flickr REST endpoint; tests substitute in-memory fakes.
//!
//! # Example
//!
//! ```no_run
//! use setget_core::api::{ApiCredentials, FlickrClient, PhotoApi};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FlickrClient::new(ApiCredentials::new("my-api-key"))?;
//! let page = client.collection_page("72157600000000000", "12345678@N00", 1).await?;
//! println!("{} has {} items", page.info.title, page.info.total);
//! # Ok(())
//! # }
//! ```

mod error;
mod flickr;
pub mod signing;

pub use error::ApiError;
pub use flickr::{DEFAULT_BASE_URL, FlickrClient, PAGE_SIZE};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Kind of media an item is, as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image.
    Photo,
    /// Video clip.
    Video,
}

impl MediaKind {
    /// Maps the service's `media` attribute to a kind.
    ///
    /// Anything other than `video` is treated as a photo, which is what the
    /// service reports for images of every format.
    #[must_use]
    pub fn from_api(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("video") {
            Self::Video
        } else {
            Self::Photo
        }
    }

    /// Returns the stable lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item of a collection as listed by pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Service-assigned item id.
    pub id: String,
    /// Item title, may be empty.
    pub title: String,
    /// Photo or video.
    pub kind: MediaKind,
}

impl CatalogEntry {
    /// Creates a catalog entry.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
        }
    }
}

/// One downloadable rendition of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeVariant {
    /// Size label, e.g. `Original`, `Large`, `HD MP4`.
    pub label: String,
    /// Direct URL of the rendition.
    pub url: String,
    /// Media kind of this rendition.
    pub kind: MediaKind,
}

impl SizeVariant {
    /// Creates a size variant.
    #[must_use]
    pub fn new(label: impl Into<String>, url: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            kind,
        }
    }
}

/// Collection metadata, known after the first page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Set id.
    pub set_id: String,
    /// Owner's user id.
    pub user_id: String,
    /// Set title.
    pub title: String,
    /// Owner's display name.
    pub owner_name: String,
    /// Total number of items in the set.
    pub total: u64,
}

/// One page of a collection listing.
#[derive(Debug, Clone)]
pub struct CollectionPage {
    /// Entries on this page, in service order.
    pub entries: Vec<CatalogEntry>,
    /// Collection metadata (repeated on every page).
    pub info: CollectionInfo,
    /// Whether a further page exists.
    pub has_more: bool,
}

/// Durable credential returned by the mini-token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    /// Authentication token for signed calls.
    pub auth_token: String,
    /// Authenticated user's id.
    pub user_id: String,
    /// Authenticated user's display name.
    pub user_name: String,
}

/// Key material for API calls.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiCredentials {
    /// Application API key.
    pub api_key: String,
    /// Shared secret used to sign calls.
    pub secret: Option<String>,
    /// Auth token for private content; only sent when a secret is present.
    pub auth_token: Option<String>,
}

impl ApiCredentials {
    /// Creates unsigned credentials with only an API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: None,
            auth_token: None,
        }
    }

    /// Adds a secret and auth token for signed, authenticated calls.
    #[must_use]
    pub fn with_auth(mut self, secret: impl Into<String>, auth_token: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self.auth_token = Some(auth_token.into());
        self
    }

    /// Returns true when calls will carry an auth token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.secret.is_some() && self.auth_token.is_some()
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Calls the core needs from the remote service.
///
/// # Object Safety
///
/// This trait uses `async_trait` so the orchestrator can hold an
/// `Arc<dyn PhotoApi>`.
#[async_trait]
pub trait PhotoApi: Send + Sync {
    /// Lists one page (1-based) of a user's set.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown set or user,
    /// [`ApiError::Unauthorized`] for rejected credentials, and transport or
    /// decode errors otherwise.
    async fn collection_page(
        &self,
        set_id: &str,
        user_id: &str,
        page: u32,
    ) -> Result<CollectionPage, ApiError>;

    /// Lists every rendition available for an item.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call fails.
    async fn size_variants(&self, item_id: &str) -> Result<Vec<SizeVariant>, ApiError>;

    /// Exchanges a mini-token for a durable auth token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] when the service rejects the code.
    async fn exchange_mini_token(
        &self,
        api_key: &str,
        secret: &str,
        mini_token: &str,
    ) -> Result<TokenGrant, ApiError>;
}
