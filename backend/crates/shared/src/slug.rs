//! URL slugs shared by entities that expose one
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, and single hyphens.

use unicode_normalization::UnicodeNormalization;

/// Derive a slug from free text: `"The Sea Explorer"` → `"the-sea-explorer"`.
///
/// Accented letters lose their accents (`"Café"` → `"cafe"`); any other
/// non-alphanumeric run becomes one hyphen. May return an empty string when
/// the input has no ASCII letters or digits.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.nfkd() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_ascii() || ch.is_whitespace() {
            pending_hyphen = true;
        }
        // non-ASCII leftovers (combining marks, other scripts) are dropped
    }
    slug
}

/// Return `true` when `value` is a valid slug.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}
