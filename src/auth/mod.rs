//! Mini-token authentication.
//!
//! The user opens the authorization URL, approves the application, and is
//! shown a nine-digit mini-token. [`AuthFlow`] validates the settings and
//! produces the URL; [`AuthSession`] exchanges the parsed [`MiniToken`] for
//! an [`AuthGrant`]. Nothing here writes settings: the caller decides where
//! the returned token is stored.
//!
//! # Example
//!
//! ```no_run
//! use setget_core::{ApiCredentials, AuthFlow, FlickrClient, MiniToken};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let flow = AuthFlow::new("key", "secret", "https://www.flickr.com/auth-72157600000000000")?;
//! println!("Visit {}", flow.authorization_url());
//! let mini_token = MiniToken::parse("123-456-789")?;
//! let api = FlickrClient::new(ApiCredentials::new("key"))?;
//! let grant = flow.exchange(&api, &mini_token).await?;
//! println!("Authenticated as {}", grant.user_name);
//! # Ok(())
//! # }
//! ```

mod error;
mod flow;
mod mini_token;

pub use error::AuthError;
pub use flow::{AuthFlow, AuthGrant, AuthSession};
pub use mini_token::MiniToken;
