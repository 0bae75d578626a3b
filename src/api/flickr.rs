//! Flickr REST client implementing [`PhotoApi`].
//!
//! All calls go to a single REST endpoint with the method name passed as a
//! query parameter and JSON output requested. Failures are reported inside a
//! `200 OK` body as `{"stat":"fail","code":..,"message":..}` and mapped onto
//! [`ApiError`] variants here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::signing::sign_params;
use super::{
    ApiCredentials, ApiError, CatalogEntry, CollectionInfo, CollectionPage, MediaKind, PhotoApi,
    SizeVariant, TokenGrant,
};
use crate::user_agent;

/// Default Flickr REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.flickr.com/services/rest/";

/// Items requested per page (the service maximum).
pub const PAGE_SIZE: u32 = 500;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

const METHOD_GET_PHOTOS: &str = "flickr.photosets.getPhotos";
const METHOD_GET_SIZES: &str = "flickr.photos.getSizes";
const METHOD_GET_FULL_TOKEN: &str = "flickr.auth.getFullToken";

// ==================== Flickr API Response Types ====================

/// Fields that the service sometimes sends as numbers and sometimes as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberField {
    Int(u64),
    Text(String),
}

impl NumberField {
    fn value(&self) -> u64 {
        match self {
            Self::Int(value) => *value,
            Self::Text(text) => text.trim().parse().unwrap_or(0),
        }
    }
}

/// Text fields are either plain strings or `{"_content": "..."}` objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextField {
    Plain(String),
    Content {
        #[serde(rename = "_content")]
        content: String,
    },
}

impl TextField {
    fn into_string(self) -> String {
        match self {
            Self::Plain(text) | Self::Content { content: text } => text,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    stat: Option<String>,
    code: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotosetEnvelope {
    photoset: RawPhotoset,
}

#[derive(Debug, Deserialize)]
struct RawPhotoset {
    title: Option<TextField>,
    ownername: Option<String>,
    total: Option<NumberField>,
    page: Option<NumberField>,
    pages: Option<NumberField>,
    #[serde(default)]
    photo: Vec<RawPhoto>,
}

#[derive(Debug, Deserialize)]
struct RawPhoto {
    id: String,
    title: Option<TextField>,
    media: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SizesEnvelope {
    sizes: RawSizes,
}

#[derive(Debug, Deserialize)]
struct RawSizes {
    #[serde(default)]
    size: Vec<RawSize>,
}

#[derive(Debug, Deserialize)]
struct RawSize {
    label: String,
    source: String,
    media: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthEnvelope {
    auth: RawAuth,
}

#[derive(Debug, Deserialize)]
struct RawAuth {
    token: TextField,
    user: RawUser,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    nsid: String,
    username: Option<String>,
    fullname: Option<String>,
}

// ==================== FlickrClient ====================

/// Flickr REST client.
///
/// Created once per run and shared behind an `Arc<dyn PhotoApi>`; the
/// underlying reqwest client pools connections.
#[derive(Clone)]
pub struct FlickrClient {
    client: Client,
    base_url: String,
    credentials: ApiCredentials,
}

impl FlickrClient {
    /// Creates a client against the public Flickr endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if the HTTP client cannot be built.
    pub fn new(credentials: ApiCredentials) -> Result<Self, ApiError> {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom endpoint (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if the HTTP client cannot be built.
    #[tracing::instrument(level = "debug", skip(credentials), fields(base_url = %base_url.as_ref()))]
    pub fn with_base_url(
        credentials: ApiCredentials,
        base_url: impl AsRef<str>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .gzip(true)
            .user_agent(user_agent::default_api_user_agent())
            .build()
            .map_err(|error| ApiError::InvalidRequest {
                method: "client".to_string(),
                reason: format!("HTTP client construction failed: {error}"),
            })?;

        debug!(
            authenticated = credentials.is_authenticated(),
            "creating Flickr client"
        );

        Ok(Self {
            client,
            base_url: base_url.as_ref().to_string(),
            credentials,
        })
    }

    /// Returns the configured credentials.
    #[must_use]
    pub fn credentials(&self) -> &ApiCredentials {
        &self.credentials
    }

    /// Base parameters for calls made with the configured credentials.
    fn credential_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("api_key".to_string(), self.credentials.api_key.clone())];
        if self.credentials.is_authenticated()
            && let Some(token) = &self.credentials.auth_token
        {
            params.push(("auth_token".to_string(), token.clone()));
        }
        params
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        mut params: Vec<(String, String)>,
        secret: Option<&str>,
    ) -> Result<T, ApiError> {
        params.push(("method".to_string(), method.to_string()));
        params.push(("format".to_string(), "json".to_string()));
        params.push(("nojsoncallback".to_string(), "1".to_string()));
        if let Some(secret) = secret {
            sign_params(secret, &mut params);
        }

        let url = Url::parse_with_params(&self.base_url, &params).map_err(|error| {
            ApiError::InvalidRequest {
                method: method.to_string(),
                reason: format!("bad endpoint URL '{}': {error}", self.base_url),
            }
        })?;

        // The URL carries the API key and token, so only the method is logged.
        debug!(method, signed = secret.is_some(), "calling Flickr API");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| ApiError::transport(method, error))?;

        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            debug!(method, status = code, "Flickr API returned error status");
            return Err(match code {
                401 | 403 => ApiError::Unauthorized {
                    message: format!("HTTP {code}"),
                },
                404 => ApiError::NotFound {
                    message: format!("HTTP {code} from {method}"),
                },
                _ => ApiError::HttpStatus {
                    method: method.to_string(),
                    status: code,
                },
            });
        }

        let body = response
            .text()
            .await
            .map_err(|error| ApiError::transport(method, error))?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|error| ApiError::decode(method, error))?;

        check_status(method, &value)?;

        serde_json::from_value(value).map_err(|error| ApiError::decode(method, error))
    }
}

impl std::fmt::Debug for FlickrClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlickrClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Maps a `stat=fail` body onto an [`ApiError`].
fn check_status(method: &str, value: &serde_json::Value) -> Result<(), ApiError> {
    let envelope: StatusEnvelope = serde_json::from_value(value.clone())
        .map_err(|error| ApiError::decode(method, error))?;

    match envelope.stat.as_deref() {
        None | Some("ok") => Ok(()),
        Some(_) => {
            let code = envelope.code.unwrap_or(-1);
            let message = envelope
                .message
                .unwrap_or_else(|| "no message provided".to_string());
            warn!(method, code, %message, "Flickr API call failed");
            Err(classify_failure(method, code, message))
        }
    }
}

fn classify_failure(method: &str, code: i64, message: String) -> ApiError {
    match (method, code) {
        // 96-99 are signature/token/permission failures, 100 is a bad API key.
        (_, 96..=100) => ApiError::Unauthorized { message },
        // 1 = set not found, 2 = unknown user
        (METHOD_GET_PHOTOS, 1 | 2) | (METHOD_GET_SIZES, 1) => ApiError::NotFound { message },
        _ => ApiError::Remote {
            method: method.to_string(),
            code,
            message,
        },
    }
}

#[async_trait]
impl PhotoApi for FlickrClient {
    #[instrument(skip(self), fields(method = METHOD_GET_PHOTOS))]
    async fn collection_page(
        &self,
        set_id: &str,
        user_id: &str,
        page: u32,
    ) -> Result<CollectionPage, ApiError> {
        let mut params = self.credential_params();
        params.push(("photoset_id".to_string(), set_id.to_string()));
        params.push(("user_id".to_string(), user_id.to_string()));
        params.push(("page".to_string(), page.to_string()));
        params.push(("per_page".to_string(), PAGE_SIZE.to_string()));
        params.push(("extras".to_string(), "media".to_string()));

        let envelope: PhotosetEnvelope = self
            .call(METHOD_GET_PHOTOS, params, self.credentials.secret.as_deref())
            .await?;
        let raw = envelope.photoset;

        let current_page = raw.page.as_ref().map_or(u64::from(page), NumberField::value);
        let pages = raw.pages.as_ref().map_or(current_page, NumberField::value);

        let entries: Vec<CatalogEntry> = raw
            .photo
            .into_iter()
            .map(|photo| CatalogEntry {
                id: photo.id,
                title: photo.title.map(TextField::into_string).unwrap_or_default(),
                kind: photo
                    .media
                    .as_deref()
                    .map_or(MediaKind::Photo, MediaKind::from_api),
            })
            .collect();

        debug!(
            page = current_page,
            pages,
            entries = entries.len(),
            "fetched collection page"
        );

        Ok(CollectionPage {
            info: CollectionInfo {
                set_id: set_id.to_string(),
                user_id: user_id.to_string(),
                title: raw.title.map(TextField::into_string).unwrap_or_default(),
                owner_name: raw.ownername.unwrap_or_default(),
                total: raw
                    .total
                    .as_ref()
                    .map_or(entries.len() as u64, NumberField::value),
            },
            entries,
            has_more: current_page < pages,
        })
    }

    #[instrument(skip(self), fields(method = METHOD_GET_SIZES))]
    async fn size_variants(&self, item_id: &str) -> Result<Vec<SizeVariant>, ApiError> {
        let mut params = self.credential_params();
        params.push(("photo_id".to_string(), item_id.to_string()));

        let envelope: SizesEnvelope = self
            .call(METHOD_GET_SIZES, params, self.credentials.secret.as_deref())
            .await?;

        Ok(envelope
            .sizes
            .size
            .into_iter()
            .map(|size| SizeVariant {
                label: size.label,
                url: size.source,
                kind: size
                    .media
                    .as_deref()
                    .map_or(MediaKind::Photo, MediaKind::from_api),
            })
            .collect())
    }

    #[instrument(skip(self, secret, mini_token), fields(method = METHOD_GET_FULL_TOKEN))]
    async fn exchange_mini_token(
        &self,
        api_key: &str,
        secret: &str,
        mini_token: &str,
    ) -> Result<TokenGrant, ApiError> {
        let params = vec![
            ("api_key".to_string(), api_key.to_string()),
            ("mini_token".to_string(), mini_token.to_string()),
        ];

        let envelope: AuthEnvelope = self.call(METHOD_GET_FULL_TOKEN, params, Some(secret)).await?;
        let user = envelope.auth.user;
        let user_name = user
            .username
            .filter(|name| !name.is_empty())
            .or(user.fullname)
            .unwrap_or_default();

        Ok(TokenGrant {
            auth_token: envelope.auth.token.into_string(),
            user_id: user.nsid,
            user_name,
        })
    }
}
