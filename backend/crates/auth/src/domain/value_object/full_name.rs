//! Display name of a person, as typed at signup

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

pub const FULL_NAME_MIN_LENGTH: usize = 3;
pub const FULL_NAME_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FullNameError {
    #[error("Your name is required")]
    Missing,
    #[error("Your name must be at least 3 characters long")]
    TooShort,
    #[error("Your name cannot exceed 50 characters")]
    TooLong,
}

/// NFC-normalized, trimmed, 3 to 50 characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FullName(String);

impl FullName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, FullNameError> {
        let normalized: String = raw.as_ref().nfc().collect();
        let trimmed = normalized.trim();

        let length = trimmed.chars().count();
        if length == 0 {
            return Err(FullNameError::Missing);
        }
        if length < FULL_NAME_MIN_LENGTH {
            return Err(FullNameError::TooShort);
        }
        if length > FULL_NAME_MAX_LENGTH {
            return Err(FullNameError::TooLong);
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_trimmed() {
        assert_eq!(FullName::new("  Jane Doe ").unwrap().as_str(), "Jane Doe");
    }

    #[test]
    fn test_full_name_bounds() {
        assert_eq!(FullName::new(""), Err(FullNameError::Missing));
        assert_eq!(FullName::new("   "), Err(FullNameError::Missing));
        assert_eq!(FullName::new("Jo"), Err(FullNameError::TooShort));
        assert!(FullName::new("Joe").is_ok());
        assert!(FullName::new("a".repeat(50)).is_ok());
        assert_eq!(FullName::new("a".repeat(51)), Err(FullNameError::TooLong));
    }

    #[test]
    fn test_full_name_counts_characters_not_bytes() {
        assert!(FullName::new("Zoë").is_ok());
        assert!(FullName::new("é".repeat(50)).is_ok());
    }
}
