//! Country code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CountryCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum CountryCodeError {
    /// The input string is empty (after trimming).
    #[error("country code cannot be empty")]
    Empty,
    /// The input is not exactly two characters.
    #[error("country code must be exactly 2 letters, got {len}")]
    WrongLength {
        /// Length of the rejected input.
        len: usize,
    },
    /// The input contains a non-ASCII-alphabetic character.
    #[error("country code must contain only letters")]
    NotAlphabetic,
}

/// An ISO 3166-1 alpha-2 country code, lowercased.
///
/// The commerce backend keys regions by lowercase two-letter codes, and the
/// same codes appear in URL paths (`/us/order/confirmed/...`), so parsing
/// normalizes to lowercase. No lookup against the real ISO table is done;
/// any two letters parse.
///
/// ## Examples
///
/// ```
/// use driftwood_core::CountryCode;
///
/// let us = CountryCode::parse("US").unwrap();
/// assert_eq!(us.as_str(), "us");
/// assert_eq!(us, CountryCode::parse("us").unwrap());
///
/// assert!(CountryCode::parse("usa").is_err());
/// assert!(CountryCode::parse("u1").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse a `CountryCode` from raw input.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, is not exactly two
    /// characters, or contains a non-letter.
    pub fn parse(input: &str) -> Result<Self, CountryCodeError> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(CountryCodeError::Empty);
        }

        if trimmed.chars().count() != 2 {
            return Err(CountryCodeError::WrongLength {
                len: trimmed.chars().count(),
            });
        }

        if !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CountryCodeError::NotAlphabetic);
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Returns the lowercase code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the code uppercased for user-facing copy ("US").
    #[must_use]
    pub fn to_display_upper(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CountryCode {
    type Err = CountryCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CountryCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(CountryCode::parse("us").unwrap().as_str(), "us");
        assert_eq!(CountryCode::parse("DE").unwrap().as_str(), "de");
        assert_eq!(CountryCode::parse(" gb ").unwrap().as_str(), "gb");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            CountryCode::parse(""),
            Err(CountryCodeError::Empty)
        ));
        assert!(matches!(
            CountryCode::parse("  "),
            Err(CountryCodeError::Empty)
        ));
    }

    #[test]
    fn test_parse_wrong_length() {
        assert!(matches!(
            CountryCode::parse("usa"),
            Err(CountryCodeError::WrongLength { len: 3 })
        ));
        assert!(matches!(
            CountryCode::parse("u"),
            Err(CountryCodeError::WrongLength { len: 1 })
        ));
    }

    #[test]
    fn test_parse_not_alphabetic() {
        assert!(matches!(
            CountryCode::parse("u1"),
            Err(CountryCodeError::NotAlphabetic)
        ));
    }

    #[test]
    fn test_case_insensitive_equality() {
        assert_eq!(
            CountryCode::parse("US").unwrap(),
            CountryCode::parse("us").unwrap()
        );
    }

    #[test]
    fn test_display_upper() {
        assert_eq!(CountryCode::parse("us").unwrap().to_display_upper(), "US");
    }

    #[test]
    fn test_serde_roundtrip() {
        let code = CountryCode::parse("us").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"us\"");

        let parsed: CountryCode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, code);
    }
}
