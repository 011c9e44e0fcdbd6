//! Virtual path utilities.
//!
//! Virtual paths are forward-slash-delimited strings rooted at `/`. They are
//! never platform paths, so these helpers work on `&str` rather than
//! [`std::path::Path`] (backslashes are ordinary name characters here).

/// Split a path into its normalized segments.
///
/// Empty segments and `.` are dropped. `..` removes the previous segment but
/// never climbs above the root, so the result always stays inside the
/// namespace it was resolved against.
///
/// ```
/// use boxfs_vfs::segments;
/// assert_eq!(segments("/a//b/./c/"), vec!["a", "b", "c"]);
/// assert_eq!(segments("a/../../b"), vec!["b"]);
/// assert!(segments("/").is_empty());
/// ```
pub fn segments(path: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {},
            ".." => {
                parts.pop();
            },
            name => parts.push(name),
        }
    }
    parts
}

/// Normalize a path to its canonical `/`-rooted form without a trailing slash.
///
/// ```
/// use boxfs_vfs::normalize;
/// assert_eq!(normalize(""), "/");
/// assert_eq!(normalize("a/b/"), "/a/b");
/// assert_eq!(normalize("/wrong/../still-wrong/.././correct//./path.txt"), "/correct/path.txt");
/// ```
pub fn normalize(path: &str) -> String {
    let parts = segments(path);
    if parts.is_empty() {
        return "/".to_string();
    }
    let mut normalized = String::with_capacity(path.len() + 1);
    for part in parts {
        normalized.push('/');
        normalized.push_str(part);
    }
    normalized
}

/// Parent of a path. The parent of the root is the root.
pub fn get_parent(path: &str) -> String {
    let mut parts = segments(path);
    parts.pop();
    normalize(&parts.join("/"))
}

/// Final segment of a path, or an empty string for the root.
pub fn get_name(path: &str) -> String {
    segments(path).last().map(|name| name.to_string()).unwrap_or_default()
}

/// Join `path` onto `base`.
///
/// Both sides are normalized on their own before joining: a leading slash on
/// `path` does not discard `base`, and `..` in `path` can never climb into
/// (or out of) `base`.
pub fn join_paths(base: &str, path: &str) -> String {
    let mut parts = segments(base);
    parts.extend(segments(path));
    normalize(&parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "/")]
    #[case("/", "/")]
    #[case("//", "/")]
    #[case("./.", "/")]
    #[case("a", "/a")]
    #[case("/a/b/c.txt", "/a/b/c.txt")]
    #[case("a//b//c", "/a/b/c")]
    #[case("a/./b/./c", "/a/b/c")]
    #[case("a/b/c/", "/a/b/c")]
    #[case("a/b/..", "/a")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_traversal_stays_inside_root() {
        assert_eq!(normalize("../etc/passwd"), "/etc/passwd");
        assert_eq!(normalize("a/../../b"), "/b");
        assert_eq!(normalize(".."), "/");
        assert_eq!(join_paths("repo", "../../outside"), "/repo/outside");
    }

    #[test]
    fn test_backslashes_are_name_characters() {
        assert_eq!(segments("a\\b/c"), vec!["a\\b", "c"]);
    }

    #[rstest]
    #[case("/", "/")]
    #[case("/a", "/")]
    #[case("/a/b", "/a")]
    #[case("/a/b/c.txt/", "/a/b")]
    fn test_get_parent(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(get_parent(input), expected);
    }

    #[rstest]
    #[case("/", "")]
    #[case("/a", "a")]
    #[case("/a/b/c.txt", "c.txt")]
    #[case("/a/b/", "b")]
    fn test_get_name(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(get_name(input), expected);
    }

    #[rstest]
    #[case("repo", "/", "/repo")]
    #[case("repo", "", "/repo")]
    #[case("repo", "/a/b", "/repo/a/b")]
    #[case("repo", "a/b", "/repo/a/b")]
    #[case("/nested/repo/", "/a", "/nested/repo/a")]
    fn test_join_paths(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        assert_eq!(join_paths(base, path), expected);
    }
}
