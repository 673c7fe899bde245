use std::sync::Arc;

use serde_json::Value;
use vista_parser::{FuncError, FuncMap};
use vista_router::Links;

/// Manager settings
///
/// ```
/// use vista::Options;
///
/// let options = Options::new()
///     .cache()
///     .func("upper", |_, args| {
///         let s = args.first().and_then(|v| v.as_str()).unwrap_or_default();
///         Ok(s.to_uppercase().into())
///     });
/// assert!(options.is_cached());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub(crate) cache: bool,
    pub(crate) stream: bool,
    pub(crate) funcs: FuncMap,
    pub(crate) links: Option<Arc<Links>>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep compiled templates for the lifetime of the manager
    pub fn cache(self) -> Self {
        self.with_cache(true)
    }

    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// Send pages in chunks while they execute instead of buffering them
    ///
    /// Uses less memory, but an error halfway through a page can no longer
    /// become an error status: the client gets a 200 with a truncated body.
    pub fn stream(self) -> Self {
        self.with_stream(true)
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Replaces the whole function map
    pub fn func_map(mut self, funcs: FuncMap) -> Self {
        self.funcs = funcs;
        self
    }

    /// Adds one function
    pub fn func<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, FuncError> + Send + Sync + 'static,
    {
        self.funcs.insert(name, func);
        self
    }

    /// Makes `link` available to templates
    pub fn links(mut self, links: Arc<Links>) -> Self {
        self.links = Some(links);
        self
    }

    pub fn is_cached(&self) -> bool {
        self.cache
    }

    pub fn is_streamed(&self) -> bool {
        self.stream
    }
}
