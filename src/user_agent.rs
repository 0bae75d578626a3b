//! Shared User-Agent strings for API and download HTTP clients.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/setget";

/// Default User-Agent for media downloads.
#[must_use]
pub(crate) fn default_download_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("setget/{version} (media-download; +{PROJECT_UA_URL})")
}

/// Default User-Agent for REST API calls.
#[must_use]
pub(crate) fn default_api_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("setget/{version} (api-client; +{PROJECT_UA_URL})")
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_format_consistency() {
        let download_ua = default_download_user_agent();
        let api_ua = default_api_user_agent();
        assert!(download_ua.contains(PROJECT_UA_URL));
        assert!(api_ua.contains(PROJECT_UA_URL));
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            download_ua
                .strip_prefix("setget/")
                .and_then(|s| s.split(' ').next())
                .expect("download UA has version"),
            "download UA must contain crate version"
        );
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            api_ua
                .strip_prefix("setget/")
                .and_then(|s| s.split(' ').next())
                .expect("api UA has version"),
            "api UA must contain crate version"
        );
    }
}
