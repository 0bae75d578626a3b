//! Mini-token parsing.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::AuthError;

/// Accepted shapes: hyphenated `ddd-ddd-ddd`, or the same nine digits bare.
/// ASCII digits only; `\d` would also match other Unicode digit scripts.
#[allow(clippy::expect_used)]
static MINI_TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{3})-?([0-9]{3})-?([0-9]{3})$").expect("mini-token regex is valid") // Static pattern, safe to panic
});

/// A validated mini-token, always held in `ddd-ddd-ddd` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiniToken(String);

impl MiniToken {
    /// Parses user input, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidMiniToken`] for anything other than three
    /// groups of three digits.
    ///
    /// # Example
    ///
    /// ```
    /// use setget_core::MiniToken;
    ///
    /// assert_eq!(MiniToken::parse(" 123-456-789\n").unwrap().as_str(), "123-456-789");
    /// assert_eq!(MiniToken::parse("123456789").unwrap().as_str(), "123-456-789");
    /// assert!(MiniToken::parse("123-45-6789").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, AuthError> {
        let trimmed = input.trim();
        let invalid = || AuthError::InvalidMiniToken {
            input: trimmed.to_string(),
        };

        let captures = MINI_TOKEN_PATTERN.captures(trimmed).ok_or_else(invalid)?;
        // Mixed forms like `123-456789` are rejected.
        let hyphens = trimmed.matches('-').count();
        if hyphens != 0 && hyphens != 2 {
            return Err(invalid());
        }

        Ok(Self(format!(
            "{}-{}-{}",
            &captures[1], &captures[2], &captures[3]
        )))
    }

    /// The normalized `ddd-ddd-ddd` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MiniToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hyphenated() {
        assert_eq!(MiniToken::parse("123-456-789").unwrap().as_str(), "123-456-789");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(MiniToken::parse("  987-654-321 \r\n").unwrap().as_str(), "987-654-321");
    }

    #[test]
    fn test_parse_bare_digits_normalized() {
        assert_eq!(MiniToken::parse("123456789").unwrap().as_str(), "123-456-789");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in [
            "",
            "12-345-678",
            "123-456-7890",
            "abc-def-ghi",
            "123 456 789",
            "123-456789",
            "1234567890",
            "١٢٣-٤٥٦-٧٨٩",
            "１２３-４５６-７８９",
        ] {
            let result = MiniToken::parse(input);
            assert!(
                matches!(result, Err(AuthError::InvalidMiniToken { .. })),
                "expected rejection for {input:?}"
            );
        }
    }
}
