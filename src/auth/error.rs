//! Error types for the token exchange.

use thiserror::Error;

use crate::api::ApiError;

/// Errors from the mini-token exchange flow.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required setting is absent or blank.
    #[error("missing {field}\n  Suggestion: set `{field}` in the settings file or enter it when prompted")]
    MissingCredential {
        /// Settings key that is missing.
        field: &'static str,
    },

    /// The authorization URL is not a valid absolute URL.
    #[error("invalid auth url '{url}': {reason}")]
    InvalidAuthUrl {
        /// The URL after placeholder substitution.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// The entered code is not of the form `ddd-ddd-ddd`.
    #[error("invalid mini-token '{input}'\n  Suggestion: enter the 9-digit code shown after authorizing, e.g. 123-456-789")]
    InvalidMiniToken {
        /// What the user entered, trimmed.
        input: String,
    },

    /// The service refused the exchange.
    #[error("token exchange failed: {source}")]
    Exchange {
        /// Underlying gateway error.
        #[source]
        source: ApiError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_names_field() {
        let msg = AuthError::MissingCredential { field: "secret" }.to_string();
        assert!(msg.contains("missing secret"), "{msg}");
        assert!(msg.contains("Suggestion"), "{msg}");
    }

    #[test]
    fn test_invalid_mini_token_shows_input_and_example() {
        let msg = AuthError::InvalidMiniToken {
            input: "12-34".to_string(),
        }
        .to_string();
        assert!(msg.contains("12-34"), "{msg}");
        assert!(msg.contains("123-456-789"), "{msg}");
    }
}
