//! Person name helpers: display formatting and diacritic-insensitive comparison.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Join first and last name with a single space, skipping blank parts.
///
/// Returns an empty string when both parts are blank.
pub fn full_name(first_name: Option<&str>, last_name: Option<&str>) -> String {
    [first_name, last_name]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a name for equality checks.
///
/// Decomposes to NFD, drops combining marks (accents, tildes, diaereses)
/// and lowercases, so `"Pérez"` and `"PEREZ"` compare equal.
pub fn normalize_for_comparison(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// `true` when two names are equal after [`normalize_for_comparison`].
pub fn names_match(a: &str, b: &str) -> bool {
    normalize_for_comparison(a) == normalize_for_comparison(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_both_parts() {
        assert_eq!(full_name(Some("Juan"), Some("Pérez")), "Juan Pérez");
    }

    #[test]
    fn full_name_skips_missing_and_empty_parts() {
        assert_eq!(full_name(None, Some("Pérez")), "Pérez");
        assert_eq!(full_name(Some("Juan"), Some("")), "Juan");
        assert_eq!(full_name(None, None), "");
    }

    #[test]
    fn normalize_strips_diacritics_and_case() {
        assert_eq!(normalize_for_comparison("José Muñoz"), "jose munoz");
        assert_eq!(normalize_for_comparison("MÜLLER"), "muller");
    }

    #[test]
    fn names_match_ignores_accents() {
        assert!(names_match("Juan Pérez", "juan perez"));
        assert!(!names_match("Juan Pérez", "Juan Peres"));
    }
}
