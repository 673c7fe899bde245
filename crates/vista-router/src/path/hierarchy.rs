/// Lazy iterator over a path and its ancestors
///
/// For path `/a/b/c`, yields: `/a/b/c` → `/a/b` → `/a` → `/`
///
/// Yields borrowed slices of the input; nothing is allocated. Relative paths
/// stop at their first segment (`a/b` yields `a/b` → `a`).
///
/// # Examples
///
/// ```
/// use vista_router::PathHierarchy;
///
/// let paths: Vec<&str> = PathHierarchy::new("/a/b/c").collect();
/// assert_eq!(paths, vec!["/a/b/c", "/a/b", "/a", "/"]);
/// ```
#[derive(Debug, Clone)]
pub struct PathHierarchy<'a> {
    current: Option<&'a str>,
}

impl<'a> PathHierarchy<'a> {
    /// Creates a hierarchy starting at `path` itself
    pub fn new(path: &'a str) -> Self {
        Self {
            current: Some(path),
        }
    }

    /// Collects the hierarchy ordered from the outermost ancestor inwards
    ///
    /// ```
    /// use vista_router::PathHierarchy;
    ///
    /// assert_eq!(PathHierarchy::new("/a/b").root_first(), vec!["/", "/a", "/a/b"]);
    /// ```
    pub fn root_first(self) -> Vec<&'a str> {
        let mut paths: Vec<&'a str> = self.collect();
        paths.reverse();
        paths
    }
}

impl<'a> Iterator for PathHierarchy<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;

        self.current = if current == "/" {
            None
        } else {
            match current.rfind('/') {
                Some(0) => Some("/"),
                Some(slash_pos) => Some(&current[..slash_pos]),
                None => None,
            }
        };

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_path_hierarchy() {
        let paths: Vec<&str> = PathHierarchy::new("/a/b/c/d").collect();
        assert_eq!(paths, vec!["/a/b/c/d", "/a/b/c", "/a/b", "/a", "/"]);

        let paths: Vec<&str> = PathHierarchy::new("/users").collect();
        assert_eq!(paths, vec!["/users", "/"]);

        let paths: Vec<&str> = PathHierarchy::new("/").collect();
        assert_eq!(paths, vec!["/"]);
    }

    #[test]
    fn test_relative_hierarchy() {
        let paths: Vec<&str> = PathHierarchy::new("a/b").collect();
        assert_eq!(paths, vec!["a/b", "a"]);
    }

    #[test]
    fn test_root_first() {
        assert_eq!(PathHierarchy::new("/").root_first(), vec!["/"]);
        assert_eq!(
            PathHierarchy::new("/admin/events").root_first(),
            vec!["/", "/admin", "/admin/events"]
        );
    }

    #[test]
    fn test_path_hierarchy_short_circuit() {
        let mut iter = PathHierarchy::new("/a/b/c/d");
        let found = iter.find(|&p| p == "/a/b");
        assert_eq!(found, Some("/a/b"));
        assert_eq!(iter.next(), Some("/a"));
    }
}
