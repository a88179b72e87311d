//! URL path normalization.
//!
//! Collapses dynamic path segments into `{paramN}` placeholders so that
//! identical traffic folds onto one key and can be matched against declared
//! templates. The heuristic is deliberately coarse: reconciliation needs
//! stability, not perfect parameter detection.

use uuid::Uuid;

const PARAM_PREFIX: char = '{';
const PARAM_SUFFIX: char = '}';

/// Whether a segment has the `{…}` template-parameter form.
pub fn is_path_param(segment: &str) -> bool {
    segment.starts_with(PARAM_PREFIX) && segment.ends_with(PARAM_SUFFIX)
}

/// Normalize a path by replacing dynamic segments with `{paramN}`.
///
/// With `is_spec`, existing `{…}` segments of a declared template are kept
/// verbatim instead of being inspected.
pub fn normalize_path(path: &str, is_spec: bool) -> String {
    if path.is_empty() {
        return String::new();
    }
    if path == "/" {
        return "/".to_string();
    }

    let mut normalized_parts = Vec::new();
    let mut param_count = 0;

    for part in path.trim_matches('/').split('/') {
        if is_spec && is_path_param(part) {
            normalized_parts.push(part.to_string());
            continue;
        }

        if is_suspect_path_param(part) {
            param_count += 1;
            normalized_parts.push(format!("{{param{param_count}}}"));
        } else {
            normalized_parts.push(part.to_string());
        }
    }

    format!("/{}", normalized_parts.join("/"))
}

/// Split a URL into path and query at the first `?`.
pub fn split_path_query(full_path: &str) -> (&str, &str) {
    match full_path.find('?') {
        Some(idx) if idx == full_path.len() - 1 => (&full_path[..idx], ""),
        Some(idx) => (&full_path[..idx], &full_path[idx + 1..]),
        None => (full_path, ""),
    }
}

/// Compare a normalized traffic path against a normalized spec template.
///
/// Segments are equal when string-equal or when both have the `{…}` form; a
/// parameter segment never matches a concrete one here (single-segment
/// wildcarding is the trie's lookup rule).
pub fn templates_equivalent(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }

    let a_parts: Vec<&str> = a.trim_matches('/').split('/').collect();
    let b_parts: Vec<&str> = b.trim_matches('/').split('/').collect();
    if a_parts.len() != b_parts.len() {
        return false;
    }

    a_parts
        .iter()
        .zip(&b_parts)
        .all(|(x, y)| x == y || (is_path_param(x) && is_path_param(y)))
}

fn is_suspect_path_param(part: &str) -> bool {
    is_number(part) || is_uuid(part) || is_mixed(part)
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn is_uuid(s: &str) -> bool {
    // Canonical hyphenated 8-4-4-4-12 form only; Uuid::parse_str also accepts
    // other layouts.
    s.len() == 36 && Uuid::try_parse(s).is_ok()
}

/// A segment mixing digits and other characters counts as a parameter when it
/// is at least 8 chars long and contains more than 2 digit characters.
fn is_mixed(part: &str) -> bool {
    const MIN_LEN: usize = 8;
    const MIN_DIGITS: usize = 2;

    if part.len() < MIN_LEN {
        return false;
    }

    part.chars().filter(|c| c.is_numeric()).count() > MIN_DIGITS
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalizes_paths() {
        let cases = [
            ("/users/list", false, "/users/list"),
            ("/users/123", false, "/users/{param1}"),
            (
                "/orders/550e8400-e29b-41d4-a716-446655440000",
                false,
                "/orders/{param1}",
            ),
            ("/data/abc12345xyz", false, "/data/{param1}"),
            ("/data/ab12", false, "/data/ab12"),
            (
                "/users/123/orders/550e8400-e29b-41d4-a716-446655440000",
                false,
                "/users/{param1}/orders/{param2}",
            ),
            ("/users/{userId}", true, "/users/{userId}"),
            (
                "/users/{userId}/orders/{orderId}",
                true,
                "/users/{userId}/orders/{orderId}",
            ),
            ("/", false, "/"),
            ("", false, ""),
        ];

        for (input, is_spec, expected) in cases {
            assert_eq!(normalize_path(input, is_spec), expected, "input: {input}");
        }
    }

    #[test]
    fn mixed_segment_boundaries() {
        // Length 8 with exactly 2 digits: not a parameter.
        assert_eq!(normalize_path("/x/abcdef12", false), "/x/abcdef12");
        // Length 8 with 3 digits: parameter.
        assert_eq!(normalize_path("/x/abcde123", false), "/x/{param1}");
        // Length 7, even with 5 digits: not a parameter.
        assert_eq!(normalize_path("/x/ab12345", false), "/x/ab12345");
    }

    #[test]
    fn malformed_uuid_is_not_suspect() {
        // All-letter hex keeps the mixed heuristic out of the picture: the
        // well-formed value parses as a UUID, the shifted hyphenation does not.
        assert_eq!(
            normalize_path("/orders/deadbeef-dead-beef-dead-beefdeadbeef", false),
            "/orders/{param1}"
        );
        let malformed = "/orders/deadbeef-dead-beefdead-beefdeadbeef";
        assert_eq!(normalize_path(malformed, false), malformed);
    }

    #[test]
    fn splits_path_and_query() {
        assert_eq!(
            split_path_query("/api/v1/users?id=123"),
            ("/api/v1/users", "id=123")
        );
        assert_eq!(split_path_query("/api/v1/users?"), ("/api/v1/users", ""));
        assert_eq!(split_path_query("/api/v1/users"), ("/api/v1/users", ""));
    }

    #[test]
    fn template_equivalence_matches_params_to_params() {
        assert!(templates_equivalent("/users/{param1}", "/users/{id}"));
        assert!(templates_equivalent("/users/list", "/users/list"));
        assert!(!templates_equivalent("/users/list", "/users/{id}"));
        assert!(!templates_equivalent("/users/{param1}", "/users/{id}/books"));
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(path in "(/[a-zA-Z0-9{}-]{1,12}){1,6}") {
            let once = normalize_path(&path, true);
            let twice = normalize_path(&once, true);
            prop_assert_eq!(once, twice);
        }
    }
}
