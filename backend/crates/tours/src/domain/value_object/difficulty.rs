//! Tour difficulty

use serde::Serialize;
use std::fmt;

pub const DIFFICULTY_MISSING: &str = "A tour must have a difficulty";
pub const DIFFICULTY_INVALID: &str = "Difficulty is either: easy, medium, difficult";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Difficult];

    /// Stored and serialized form
    pub fn code(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Difficult => "difficult",
        }
    }

    /// Exact match on the stored form
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.code() == code)
    }

    /// Client input: trimmed and lowercased first, so `" EASY "` is accepted.
    pub fn parse(raw: &str) -> Result<Self, &'static str> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(DIFFICULTY_MISSING);
        }
        Self::from_code(&normalized).ok_or(DIFFICULTY_INVALID)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
