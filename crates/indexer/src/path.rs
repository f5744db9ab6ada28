//! Key path normalization.
//!
//! Paths produced by the flattener use [`PATH_SEPARATOR`]; the merged answer
//! set rewrites them with [`MERGED_SEPARATOR`].

pub const PATH_SEPARATOR: char = '/';
pub const MERGED_SEPARATOR: char = '.';

/// Normalize a `/`-delimited key path.
///
/// * empty input stays empty;
/// * `keep_leading_separator` forces exactly one leading separator,
///   otherwise a single leading separator is stripped;
/// * runs of separators collapse into one;
/// * `strip_trailing_separator` removes one trailing separator.
#[must_use]
pub fn normalize_path(
    path: &str,
    keep_leading_separator: bool,
    strip_trailing_separator: bool,
) -> String {
    if path.is_empty() {
        return String::new();
    }

    let mut normalized = String::with_capacity(path.len() + 1);
    if keep_leading_separator {
        normalized.push(PATH_SEPARATOR);
    }
    for ch in path.chars() {
        if ch == PATH_SEPARATOR && normalized.ends_with(PATH_SEPARATOR) {
            continue;
        }
        normalized.push(ch);
    }

    if !keep_leading_separator && normalized.starts_with(PATH_SEPARATOR) {
        normalized.remove(0);
    }

    if strip_trailing_separator && normalized.ends_with(PATH_SEPARATOR) {
        normalized.pop();
    }
    normalized
}

/// No leading separator, no trailing separator.
#[must_use]
pub fn normalize_path_standard(path: &str) -> String {
    normalize_path(path, false, true)
}

/// Join a base path and a key, then normalize.
#[must_use]
pub fn join_key(base: &str, key: &str) -> String {
    let mut joined = String::with_capacity(base.len() + key.len() + 1);
    joined.push_str(base);
    joined.push(PATH_SEPARATOR);
    joined.push_str(key);
    normalize_path_standard(&joined)
}

/// Rewrite a flattened path into its merged form (`a/b/c` -> `a.b.c`).
#[must_use]
pub fn canonical_path(path: &str) -> String {
    path.replace(PATH_SEPARATOR, &MERGED_SEPARATOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_runs_and_strips_edges() {
        assert_eq!(normalize_path("a//b///c/", false, true), "a/b/c");
        assert_eq!(normalize_path("/a", false, false), "a");
        assert_eq!(normalize_path("a/", false, false), "a/");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize_path("", true, true), "");
        assert_eq!(normalize_path("", false, false), "");
    }

    #[test]
    fn leading_separator_is_forced_once() {
        assert_eq!(normalize_path("a/b", true, true), "/a/b");
        assert_eq!(normalize_path("//a/b", true, false), "/a/b");
    }

    #[test]
    fn separator_only_inputs_do_not_panic() {
        assert_eq!(normalize_path("/", false, true), "");
        assert_eq!(normalize_path("///", false, true), "");
        assert_eq!(normalize_path("/", true, true), "");
        assert_eq!(normalize_path("/", true, false), "/");
        assert_eq!(normalize_path("x", false, true), "x");
    }

    #[test]
    fn join_key_skips_empty_base() {
        assert_eq!(join_key("", "server"), "server");
        assert_eq!(join_key("server", "port"), "server/port");
        assert_eq!(join_key("server/", "/port/"), "server/port");
    }

    #[test]
    fn canonical_path_uses_dots() {
        assert_eq!(canonical_path("db/host"), "db.host");
        assert_eq!(canonical_path("db"), "db");
    }
}
