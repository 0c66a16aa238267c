//! Account username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input string is empty.
    #[error("Username is a required field")]
    Empty,
    /// The input string is too short.
    #[error("Username must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
}

/// A username accepted for registration.
///
/// ## Constraints
///
/// - Length: at least 6 characters, counted in `char`s; no upper bound
/// - Leading and trailing whitespace is trimmed before checking
///
/// Login does not go through [`Username::parse`]: existing accounts may
/// predate the length rule, so login only requires a non-empty value.
///
/// ## Examples
///
/// ```
/// use qkart_core::Username;
///
/// assert!(Username::parse("crio.do").is_ok());
///
/// assert!(Username::parse("").is_err());      // empty
/// assert!(Username::parse("crio").is_err());  // too short
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Minimum length of a new username.
    pub const MIN_LENGTH: usize = 6;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or shorter than
    /// [`Self::MIN_LENGTH`].
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(UsernameError::Empty);
        }

        let len = s.chars().count();
        if len < Self::MIN_LENGTH {
            return Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Username` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_usernames() {
        assert!(Username::parse("criodo").is_ok());
        assert!(Username::parse("crio.do.learner").is_ok());
        assert_eq!(Username::parse("  padded  ").unwrap().as_str(), "padded");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Username::parse(""), Err(UsernameError::Empty));
        assert_eq!(Username::parse("   "), Err(UsernameError::Empty));
    }

    #[test]
    fn test_parse_too_short() {
        let err = Username::parse("crio").unwrap_err();
        assert_eq!(err, UsernameError::TooShort { min: 6 });
        assert_eq!(err.to_string(), "Username must be at least 6 characters");
    }

    #[test]
    fn test_long_usernames_are_accepted() {
        let long = "a".repeat(64);
        assert_eq!(Username::parse(&long).unwrap().as_str(), long);
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        // Six two-byte characters.
        assert!(Username::parse("éééééé").is_ok());
    }
}
