//! Lexical path normalization.
//!
//! Paths are rewritten textually with POSIX rules; the filesystem is never
//! consulted and symlinks are not resolved, so `a/link/..` becomes `a`.

/// Collapse redundant separators, `.` segments and `..` segments.
///
/// Leading `..` segments of a relative path are kept. `..` directly under the
/// root is dropped. Exactly two leading slashes are preserved; three or more
/// collapse to one. The empty path normalizes to `.`.
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let leading = if path.starts_with("//") && !path.starts_with("///") {
        2
    } else if path.starts_with('/') {
        1
    } else {
        0
    };

    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." if parts.last().is_some_and(|last| *last != "..") => {
                parts.pop();
            }
            ".." if leading == 0 => parts.push(".."),
            ".." => {}
            _ => parts.push(part),
        }
    }

    let mut out = "/".repeat(leading);
    out.push_str(&parts.join("/"));
    if out.is_empty() {
        out.push('.');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_current_dir_and_separators() {
        assert_eq!(normalize_path("a/./b"), "a/b");
        assert_eq!(normalize_path("a//b///c/"), "a/b/c");
        assert_eq!(normalize_path("./a"), "a");
        assert_eq!(normalize_path("."), ".");
    }

    #[test]
    fn resolves_parent_segments_lexically() {
        assert_eq!(normalize_path("a/b/../c"), "a/c");
        assert_eq!(normalize_path("a/.."), ".");
        assert_eq!(normalize_path("../../a"), "../../a");
        assert_eq!(normalize_path("a/../../b"), "../b");
        assert_eq!(normalize_path("/../x"), "/x");
        assert_eq!(normalize_path("/.."), "/");
    }

    #[test]
    fn keeps_posix_leading_slashes() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("//a/b"), "//a/b");
        assert_eq!(normalize_path("///a//b"), "/a/b");
    }

    #[test]
    fn empty_path_is_current_dir() {
        assert_eq!(normalize_path(""), ".");
    }

    #[test]
    fn normalization_is_idempotent() {
        for input in [
            "a/./b/../c//d/",
            "../x/./../y",
            "//srv/./share/..",
            "/usr/local/../lib/",
            "lib/../../m4",
        ] {
            let once = normalize_path(input);
            assert_eq!(normalize_path(&once), once, "input {input}");
        }
    }
}
