//! Key type addressing exactly one stored object within a namespace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors related to key validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// The key string is empty.
    #[error("key must not be empty")]
    Empty,

    /// The key string contains a NUL byte.
    #[error("key must not contain NUL bytes")]
    Nul,

    /// The key string is a reserved name no substrate can address.
    #[error("key '{0}' is reserved")]
    Reserved(String),
}

/// A caller-chosen identifier addressing one object within a namespace.
///
/// Keys are opaque: the contract imposes no structure beyond rejecting
/// strings no substrate can represent (empty, embedded NUL, `.`/`..`).
/// Multi-part keys such as `covers/album-7.png` are valid; each driver maps
/// them to native identifiers without truncation or collision.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key(String);

impl Key {
    /// Parse and validate a key string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mediastore_store::Key;
    ///
    /// let key = Key::parse("covers/album-7.png").unwrap();
    /// assert_eq!(key.as_str(), "covers/album-7.png");
    ///
    /// assert!(Key::parse("").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, KeyError> {
        if s.is_empty() {
            return Err(KeyError::Empty);
        }
        if s.bytes().any(|b| b == 0) {
            return Err(KeyError::Nul);
        }
        if s == "." || s == ".." {
            return Err(KeyError::Reserved(s.to_string()));
        }
        Ok(Key(s.to_string()))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Key {
    type Error = KeyError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Key::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_keys_parse() {
        let key = Key::parse("album-7.png").unwrap();
        assert_eq!(key.as_str(), "album-7.png");
        assert_eq!(format!("{}", key), "album-7.png");
    }

    #[test]
    fn multi_part_keys_parse() {
        let key = Key::parse("covers/2024/album 7.png").unwrap();
        assert_eq!(key.as_str(), "covers/2024/album 7.png");
    }

    #[test]
    fn empty_key_rejected() {
        assert_eq!(Key::parse(""), Err(KeyError::Empty));
    }

    #[test]
    fn nul_key_rejected() {
        assert_eq!(Key::parse("a\0b"), Err(KeyError::Nul));
    }

    #[test]
    fn dot_keys_rejected() {
        assert!(matches!(Key::parse("."), Err(KeyError::Reserved(_))));
        assert!(matches!(Key::parse(".."), Err(KeyError::Reserved(_))));
        // A leading dot alone is fine - only the relative-path names are out.
        assert!(Key::parse(".hidden").is_ok());
    }

    #[test]
    fn try_from_works() {
        let key: Key = "x".try_into().unwrap();
        assert_eq!(key.as_str(), "x");
    }
}
