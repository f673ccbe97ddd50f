//! Key Normalization
//!
//! Maps arbitrary cache keys onto identifiers that are safe to use as file
//! names and as substrings for pattern invalidation.

// == Normalize ==
/// Replaces every character outside `[A-Za-z0-9]` with `_`.
///
/// Distinct keys that only differ in punctuation share an identifier
/// (`"projects:all"` and `"projects/all"` both become `"projects_all"`).
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
