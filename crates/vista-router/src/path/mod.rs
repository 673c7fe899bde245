/// Path utilities for cleaning and relativizing URL paths
///
/// All functions are lexical: they never consult the filesystem.

pub mod hierarchy;
pub use hierarchy::PathHierarchy;

/// Returns the shortest lexically equivalent path
///
/// # Rules
///
/// - Repeated slashes collapse into one
/// - `.` segments are removed
/// - `..` removes the preceding segment; at the root of a rooted path it is dropped
/// - An empty result becomes `.` (or `/` for rooted paths)
///
/// # Examples
///
/// ```
/// use vista_router::clean;
///
/// assert_eq!(clean("/a//b/./c/.."), "/a/b");
/// assert_eq!(clean("../a/../.."), "../..");
/// assert_eq!(clean("/../x"), "/x");
/// assert_eq!(clean(""), ".");
/// ```
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Joins non-empty elements with `/` and cleans the result
///
/// Returns an empty string when every element is empty.
pub fn join(base: &str, segments: &[&str]) -> String {
    let parts: Vec<&str> = std::iter::once(base)
        .chain(segments.iter().copied())
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        String::new()
    } else {
        clean(&parts.join("/"))
    }
}

/// Climbs from the current request path back to the mount root
///
/// Counts the directories of `current` (the leading empty segment and the
/// trailing file-like segment are not directories) and returns that many
/// `..` components. Paths that are empty or do not start with `/` are
/// already relative and are returned unchanged.
///
/// # Examples
///
/// ```
/// use vista_router::root_path;
///
/// assert_eq!(root_path("/"), "");
/// assert_eq!(root_path("/abc"), "");
/// assert_eq!(root_path("/abc/"), "..");
/// assert_eq!(root_path("/admin/events/"), "../..");
/// ```
pub fn root_path(current: &str) -> String {
    if !current.starts_with('/') {
        return current.to_string();
    }

    let depth = current.split('/').count().saturating_sub(2);
    vec![".."; depth].join("/")
}

/// Rewrites an absolute target path relative to the current request path
///
/// The target and extra segments are joined and cleaned first. Targets with a
/// scheme or authority (`https://...`, `//cdn/...`) and targets that are
/// already relative cannot be relativized and are returned as they are.
///
/// # Examples
///
/// ```
/// use vista_router::rel;
///
/// assert_eq!(rel("/admin/events/", "/event/1234", &[]), "../../event/1234");
/// assert_eq!(rel("/abc", "/static", &["app.css"]), "static/app.css");
/// assert_eq!(rel("/abc/", "https://example.com/x", &[]), "https://example.com/x");
/// ```
pub fn rel(current: &str, target: &str, segments: &[&str]) -> String {
    if has_authority(target) {
        return std::iter::once(target.trim_end_matches('/'))
            .chain(segments.iter().map(|s| s.trim_matches('/')))
            .collect::<Vec<_>>()
            .join("/");
    }

    let joined = join(target, segments);
    if !joined.starts_with('/') {
        return joined;
    }

    clean(&format!("./{}{}", root_path(current), joined))
}

/// Checks whether `current` is `path` itself or lies below it
///
/// # Examples
///
/// ```
/// use vista_router::is_under;
///
/// assert!(is_under("/admin/events/", "/admin"));
/// assert!(is_under("/admin", "/admin/"));
/// assert!(!is_under("/administrator", "/admin"));
/// assert!(is_under("/anything", "/"));
/// ```
pub fn is_under(current: &str, path: &str) -> bool {
    let current = clean(current);
    let path = clean(path);

    if path == "/" {
        return current.starts_with('/');
    }

    current == path
        || current
            .strip_prefix(path.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
}

/// `scheme:` prefix (RFC 3986) or a network-path reference (`//host`)
fn has_authority(target: &str) -> bool {
    if target.starts_with("//") {
        return true;
    }

    match target.split_once(':') {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "")]
    #[case("/", "")]
    #[case("/abc", "")]
    #[case("/abc/", "..")]
    #[case("/abc/ddd", "..")]
    #[case("/a/b/c", "../..")]
    #[case("relative/path", "relative/path")]
    fn test_root_path(#[case] current: &str, #[case] expected: &str) {
        assert_eq!(root_path(current), expected);
    }

    #[rstest]
    #[case("/", "/")]
    #[case("//", "/")]
    #[case("/a/b/", "/a/b")]
    #[case("a/./b", "a/b")]
    #[case("a/../../b", "../b")]
    #[case("/a/../../b", "/b")]
    #[case("./", ".")]
    #[case("a/..", ".")]
    fn test_clean(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(clean(input), expected);
    }

    #[test]
    fn test_join() {
        assert_eq!(join("", &[]), "");
        assert_eq!(join("/a", &["b", "c"]), "/a/b/c");
        assert_eq!(join("/a/", &["", "../b"]), "/b");
    }

    #[test]
    fn test_rel_from_root() {
        assert_eq!(rel("/", "/features", &[]), "features");
        assert_eq!(rel("/", "/", &[]), ".");
    }

    #[test]
    fn test_rel_nested() {
        assert_eq!(rel("/features/links", "/features", &[]), "../features");
        assert_eq!(rel("/features/links/", "/", &[]), "../..");
        assert_eq!(rel("/a/b/c", "/static", &["css", "site.css"]), "../../static/css/site.css");
    }

    #[test]
    fn test_rel_keeps_relative_and_external_targets() {
        assert_eq!(rel("/a/b/", "img/logo.png", &[]), "img/logo.png");
        assert_eq!(rel("/a/b/", "mailto:team@example.com", &[]), "mailto:team@example.com");
        assert_eq!(rel("/a/b/", "//cdn.example.com/lib.js", &[]), "//cdn.example.com/lib.js");
        assert_eq!(rel("/a/", "https://example.com/", &["docs"]), "https://example.com/docs");
    }

    #[test]
    fn test_rel_with_relative_current_path() {
        assert_eq!(rel("", "/event/1", &[]), "event/1");
    }

    #[test]
    fn test_is_under() {
        assert!(is_under("/admin/events", "/admin"));
        assert!(is_under("/admin", "/admin"));
        assert!(!is_under("/admins", "/admin"));
        assert!(!is_under("/", "/admin"));
        assert!(is_under("/", "/"));
    }

    #[test]
    fn test_has_authority() {
        assert!(has_authority("http://x"));
        assert!(has_authority("//x"));
        assert!(!has_authority("/a:b"));
        assert!(!has_authority("1abc:def"));
    }
}
