//! Tour name and the slug derived from it

use kernel::slug::slugify;
use serde::Serialize;
use std::fmt;

pub const NAME_MIN_LENGTH: usize = 10;

const NAME_MISSING: &str = "A tour must have a name";
const NAME_TOO_SHORT: &str = "A tour name must have more or equal than 10 characters";
const NAME_NOT_SLUGGABLE: &str = "A tour name must contain letters or digits";

/// Trimmed name of at least [`NAME_MIN_LENGTH`] characters that yields a
/// non-empty slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TourName(String);

impl TourName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, &'static str> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(NAME_MISSING);
        }
        if trimmed.chars().count() < NAME_MIN_LENGTH {
            return Err(NAME_TOO_SHORT);
        }
        if slugify(trimmed).is_empty() {
            return Err(NAME_NOT_SLUGGABLE);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Trusted value read back from the store
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn slug(&self) -> String {
        slugify(&self.0)
    }
}

impl fmt::Display for TourName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
