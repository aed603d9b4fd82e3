//! User Name Value Object
//!
//! The public handle of an account. Never typed by the user: it is derived
//! from the display name as `<slug>-<suffix>` with a random lowercase
//! alphanumeric suffix, so two people called "Jane Doe" still get distinct
//! handles. Uniqueness is enforced by the store; the caller retries with a
//! fresh suffix on collision.

use kernel::slug::slugify;
use platform::crypto::random_alphanumeric_lower;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest slug prefix kept from the display name
pub const USER_NAME_PREFIX_MAX_LENGTH: usize = 30;

/// Suffix length of a regular handle
pub const USER_NAME_SUFFIX_LENGTH: usize = 4;

/// Suffix length used once regular suffixes kept colliding
pub const USER_NAME_LONG_SUFFIX_LENGTH: usize = 10;

/// Prefix for names that slugify to nothing (e.g. only non-ASCII letters)
const FALLBACK_PREFIX: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    /// Handle with a short random suffix
    pub fn derive(display_name: &str) -> Self {
        Self::with_suffix(display_name, USER_NAME_SUFFIX_LENGTH)
    }

    /// Handle with a long random suffix, for the last attempt
    pub fn derive_long(display_name: &str) -> Self {
        Self::with_suffix(display_name, USER_NAME_LONG_SUFFIX_LENGTH)
    }

    fn with_suffix(display_name: &str, suffix_length: usize) -> Self {
        let slug = slugify(display_name);
        let prefix = truncate_slug(&slug, USER_NAME_PREFIX_MAX_LENGTH);
        let prefix = if prefix.is_empty() { FALLBACK_PREFIX } else { prefix };
        Self(format!(
            "{prefix}-{}",
            random_alphanumeric_lower(suffix_length)
        ))
    }

    /// Create from database value (assumed already valid)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Cut at `max` bytes (slugs are ASCII) without leaving a trailing hyphen.
fn truncate_slug(slug: &str, max: usize) -> &str {
    let cut = &slug[..slug.len().min(max)];
    cut.trim_end_matches('-')
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
