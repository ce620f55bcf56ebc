//! Person slug generation.
//!
//! Slugs are URL-safe, lowercase, ASCII identifiers derived from a person's
//! name. Uniqueness is enforced by the caller probing storage with
//! [`slug_candidate`] (see `merge::slug`).

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::names;

/// Generate the base slug for a person name.
///
/// Lowercases, strips diacritics, removes everything except ASCII word
/// characters, whitespace and hyphens, turns whitespace runs into a single
/// hyphen, collapses hyphen runs and trims hyphens at both ends.
///
/// ```
/// use cinecat_core::slug::person_slug;
///
/// assert_eq!(person_slug(Some("Juan"), Some("Pérez")), "juan-perez");
/// assert_eq!(person_slug(Some("María  José"), Some("O'Neill")), "maria-jose-oneill");
/// assert_eq!(person_slug(None, None), "");
/// ```
pub fn person_slug(first_name: Option<&str>, last_name: Option<&str>) -> String {
    let name = names::full_name(first_name, last_name);
    if name.is_empty() {
        return String::new();
    }

    let cleaned: String = name
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    // Whitespace runs and hyphen runs both become a single hyphen.
    let mut result = String::with_capacity(cleaned.len());
    let mut prev_hyphen = false;
    for c in cleaned.trim().chars() {
        if c == '-' || c.is_whitespace() {
            if !prev_hyphen {
                result.push('-');
            }
            prev_hyphen = true;
        } else {
            result.push(c);
            prev_hyphen = false;
        }
    }

    result.trim_matches('-').to_string()
}

/// The `attempt`-th candidate for `base`: `base`, `base-1`, `base-2`, ...
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}
