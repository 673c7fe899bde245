// File: src/view.rs
// Purpose: Per-request data handed to templates

use std::convert::Infallible;
use std::fmt::Display;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::request::Parts;
use serde::Serialize;
use serde_json::Value;
use vista_router::{is_under, rel, root_path, LinkError, Links};

/// Data for one rendered page
///
/// Serializes to `{"path": ..., "root": ..., "data": ...}`. The `rel`,
/// `under` and `link` template functions read `.path` from it.
#[derive(Debug, Clone, Serialize)]
pub struct ViewContext<T = Value> {
    path: String,
    root: String,
    data: T,
    #[serde(skip)]
    links: Option<Arc<Links>>,
}

impl<T> ViewContext<T> {
    pub fn new(path: impl Into<String>, data: T) -> Self {
        let path = path.into();
        Self {
            root: root_path(&path),
            path,
            data,
            links: None,
        }
    }

    pub fn with_links(mut self, links: Arc<Links>) -> Self {
        self.links = Some(links);
        self
    }

    /// Path of the current request
    pub fn current_path(&self) -> &str {
        &self.path
    }

    /// Relative path from the current request back to `/`
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }

    /// `path` joined with `segments`, relative to the current request
    pub fn rel(&self, path: &str, segments: &[&str]) -> String {
        rel(&self.path, path, segments)
    }

    pub fn is_under(&self, path: &str) -> bool {
        is_under(&self.path, path)
    }

    /// Relative link to a named route
    pub fn link_to<A: Display>(&self, alias: &str, args: &[A]) -> Result<String, LinkError> {
        let links = self.links.as_deref().ok_or(LinkError::LinksNotInstalled)?;
        let path = links.path(alias, args)?;
        Ok(rel(&self.path, &path, &[]))
    }
}

/// Extractor for the request path and the installed [`Links`]
///
/// Links are taken from an `Extension(Arc<Links>)` layer when one is present.
#[derive(Debug, Clone)]
pub struct Page {
    pub path: String,
    pub links: Option<Arc<Links>>,
}

impl Page {
    pub fn view<T>(&self, data: T) -> ViewContext<T> {
        let view = ViewContext::new(self.path.clone(), data);
        match &self.links {
            Some(links) => view.with_links(Arc::clone(links)),
            None => view,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Page
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Nested routers strip their prefix from `uri`
        let path = match parts.extensions.get::<OriginalUri>() {
            Some(OriginalUri(uri)) => uri.path().to_string(),
            None => parts.uri.path().to_string(),
        };

        Ok(Page {
            path,
            links: parts.extensions.get::<Arc<Links>>().cloned(),
        })
    }
}
