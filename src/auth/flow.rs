//! Two-step exchange: show the authorization URL, then trade the mini-token.

use tracing::{info, instrument};
use url::Url;

use super::{AuthError, MiniToken};
use crate::api::{PhotoApi, TokenGrant};

/// Placeholder in the auth URL template replaced with the API key.
const API_KEY_PLACEHOLDER: &str = "{api_key}";

/// Durable credential produced by a successful exchange.
///
/// The flow hands this back to the caller; persisting it is the caller's job.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthGrant {
    /// Auth token for signed calls.
    pub auth_token: String,
    /// Authenticated user's id.
    pub user_id: String,
    /// Authenticated user's display name.
    pub user_name: String,
}

impl From<TokenGrant> for AuthGrant {
    fn from(grant: TokenGrant) -> Self {
        Self {
            auth_token: grant.auth_token,
            user_id: grant.user_id,
            user_name: grant.user_name,
        }
    }
}

impl std::fmt::Debug for AuthGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGrant")
            .field("auth_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .finish()
    }
}

/// First step of the exchange: credentials are present and the
/// authorization URL is known.
#[derive(Clone)]
pub struct AuthFlow {
    api_key: String,
    secret: String,
    auth_url: Url,
}

impl AuthFlow {
    /// Validates the inputs and builds the authorization URL.
    ///
    /// `auth_url` may contain `{api_key}`, which is replaced with the key.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingCredential`] when a value is blank,
    /// [`AuthError::InvalidAuthUrl`] when the URL does not parse.
    pub fn new(api_key: &str, secret: &str, auth_url: &str) -> Result<Self, AuthError> {
        let api_key = require("api_key", api_key)?;
        let secret = require("secret", secret)?;
        let template = require("auth_url", auth_url)?;

        let expanded = template.replace(API_KEY_PLACEHOLDER, &api_key);
        let auth_url = Url::parse(&expanded).map_err(|e| AuthError::InvalidAuthUrl {
            url: expanded.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            api_key,
            secret,
            auth_url,
        })
    }

    /// URL the user visits to obtain a mini-token.
    #[must_use]
    pub fn authorization_url(&self) -> &Url {
        &self.auth_url
    }

    /// Moves to the second step with the code the user entered.
    #[must_use]
    pub fn with_mini_token(self, mini_token: MiniToken) -> AuthSession {
        AuthSession {
            api_key: self.api_key,
            secret: self.secret,
            auth_url: self.auth_url,
            mini_token,
        }
    }

    /// Shorthand for [`with_mini_token`](Self::with_mini_token) followed by
    /// [`AuthSession::exchange`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Exchange`] when the service rejects the code.
    pub async fn exchange(
        self,
        api: &dyn PhotoApi,
        mini_token: &MiniToken,
    ) -> Result<AuthGrant, AuthError> {
        self.with_mini_token(mini_token.clone()).exchange(api).await
    }
}

impl std::fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFlow")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .field("auth_url", &self.auth_url.as_str())
            .finish()
    }
}

/// Second step: everything needed for the one exchange call.
#[derive(Clone)]
pub struct AuthSession {
    api_key: String,
    secret: String,
    auth_url: Url,
    mini_token: MiniToken,
}

impl AuthSession {
    /// The mini-token this session will exchange.
    #[must_use]
    pub fn mini_token(&self) -> &MiniToken {
        &self.mini_token
    }

    /// The authorization URL the mini-token was obtained from.
    #[must_use]
    pub fn authorization_url(&self) -> &Url {
        &self.auth_url
    }

    /// Trades the mini-token for a durable token. One attempt, no retry.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Exchange`] wrapping the gateway error.
    #[instrument(skip(self, api), fields(mini_token = %self.mini_token))]
    pub async fn exchange(self, api: &dyn PhotoApi) -> Result<AuthGrant, AuthError> {
        let grant = api
            .exchange_mini_token(&self.api_key, &self.secret, self.mini_token.as_str())
            .await
            .map_err(|source| AuthError::Exchange { source })?;

        info!(user_id = %grant.user_id, user_name = %grant.user_name, "mini-token exchanged");
        Ok(grant.into())
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .field("auth_url", &self.auth_url.as_str())
            .field("mini_token", &self.mini_token)
            .finish()
    }
}

fn require(field: &'static str, value: &str) -> Result<String, AuthError> {
    let value = value.trim();
    if value.is_empty() {
        Err(AuthError::MissingCredential { field })
    } else {
        Ok(value.to_string())
    }
}
