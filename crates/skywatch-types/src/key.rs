//! The tracking key: an aircraft identifier scoping one polling stream.
//!
//! Keys are compared by exact value. Surrounding whitespace is trimmed at
//! construction but case is preserved, so `N12345` and `n12345` are two
//! different keys.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum accepted length of a tracking key, in characters.
pub const MAX_KEY_LEN: usize = 16;

/// Reasons a raw string is rejected as a tracking key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// The key was empty after trimming.
    #[error("identifier must not be empty")]
    Empty,

    /// The key exceeds [`MAX_KEY_LEN`] characters.
    #[error("identifier is longer than {MAX_KEY_LEN} characters")]
    TooLong,

    /// The key contains a character outside `[A-Za-z0-9-]`.
    #[error("identifier contains invalid character {0:?}")]
    InvalidChar(char),
}

/// A validated aircraft identifier used to key the tracking registry.
///
/// Only ASCII alphanumerics and `-` are accepted, which keeps the value
/// safe to splice into a provider URL path segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackingKey(String);

impl TrackingKey {
    /// Validate and construct a key from raw input.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(KeyError::Empty);
        }
        if trimmed.chars().count() > MAX_KEY_LEN {
            return Err(KeyError::TooLong);
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
        {
            return Err(KeyError::InvalidChar(bad));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TrackingKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TrackingKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TrackingKey> for String {
    fn from(key: TrackingKey) -> Self {
        key.0
    }
}

impl AsRef<str> for TrackingKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_registration_and_trims() {
        let key = TrackingKey::parse("  N12345 ").unwrap();
        assert_eq!(key.as_str(), "N12345");

        let hyphenated = TrackingKey::parse("G-EUPT").unwrap();
        assert_eq!(hyphenated.to_string(), "G-EUPT");
    }

    #[test]
    fn preserves_case() {
        let upper = TrackingKey::parse("N12345").unwrap();
        let lower = TrackingKey::parse("n12345").unwrap();
        assert_ne!(upper, lower);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(TrackingKey::parse("   "), Err(KeyError::Empty));
        assert_eq!(
            TrackingKey::parse("ABCDEFGHIJKLMNOPQ"),
            Err(KeyError::TooLong)
        );
        assert_eq!(TrackingKey::parse("N1/2"), Err(KeyError::InvalidChar('/')));
        assert_eq!(TrackingKey::parse("N 12"), Err(KeyError::InvalidChar(' ')));
    }

    #[test]
    fn deserialization_validates() {
        let ok: Result<TrackingKey, _> = serde_json::from_str("\"D-AIMA\"");
        assert!(ok.is_ok());

        let bad: Result<TrackingKey, _> = serde_json::from_str("\"../etc\"");
        assert!(bad.is_err());
    }
}
