use std::collections::HashMap;
use std::fmt::Display;

use crate::error::LinkError;
use crate::route::PathPattern;

/// Registry of named routes used to generate links by name
///
/// Routes are registered once while the application is being set up and
/// only read afterwards. Registration takes `&mut self`; share the finished
/// registry behind an `Arc` once request handling starts.
///
/// # Examples
///
/// ```
/// use vista_router::Links;
///
/// let mut links = Links::new();
/// // `named` hands the pattern back so it can be used inline when declaring routes
/// let pattern = links.named("feature", "/features/:feature");
/// assert_eq!(pattern, "/features/:feature");
///
/// assert_eq!(links.path("feature", &["layouts"]).unwrap(), "/features/layouts");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Links {
    routes: HashMap<String, PathPattern>,
}

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `pattern` under `name` and returns the pattern unchanged
    ///
    /// Re-registering a name replaces the previous pattern. Patterns with
    /// segments after a wildcard are accepted (those segments are never
    /// emitted) but logged; use [`try_named`](Self::try_named) to reject them.
    pub fn named<'p>(&mut self, name: impl Into<String>, pattern: &'p str) -> &'p str {
        let name = name.into();
        let parsed = PathPattern::parse(pattern);

        if let Err(err) = parsed.validate() {
            tracing::warn!(route = %name, "{}", err);
        }

        self.routes.insert(name, parsed);
        pattern
    }

    /// Strict variant of [`named`](Self::named)
    pub fn try_named<'p>(
        &mut self,
        name: impl Into<String>,
        pattern: &'p str,
    ) -> Result<&'p str, LinkError> {
        let parsed = PathPattern::parse(pattern);
        parsed.validate()?;
        self.routes.insert(name.into(), parsed);
        Ok(pattern)
    }

    /// Builds the absolute path of a named route
    ///
    /// Each argument is formatted with `Display` before substitution.
    pub fn path<T: Display>(&self, alias: &str, args: &[T]) -> Result<String, LinkError> {
        let pattern = self
            .routes
            .get(alias)
            .ok_or_else(|| LinkError::AliasNotFound(alias.to_string()))?;

        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        pattern.build(&args)
    }

    pub fn get(&self, alias: &str) -> Option<&PathPattern> {
        self.routes.get(alias)
    }

    /// Registered route names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_returns_pattern() {
        let mut links = Links::new();
        assert_eq!(links.named("home", "/"), "/");
        assert_eq!(links.path::<&str>("home", &[]).unwrap(), "/");
    }

    #[test]
    fn test_overwrite() {
        let mut links = Links::new();
        links.named("event", "/event/:id");
        links.named("event", "/events/:id");
        assert_eq!(links.path("event", &[7]).unwrap(), "/events/7");
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_alias_not_found() {
        let links = Links::new();
        assert_eq!(
            links.path("missing", &[1]).unwrap_err(),
            LinkError::AliasNotFound("missing".into())
        );
    }

    #[test]
    fn test_try_named_rejects_unreachable_segments() {
        let mut links = Links::new();
        assert!(links.try_named("files", "/files/*path/edit").is_err());
        assert!(links.get("files").is_none());

        links.named("files", "/files/*path/edit");
        assert_eq!(links.path("files", &["a", "b"]).unwrap(), "/files/a/b");
    }
}
