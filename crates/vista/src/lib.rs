//! # Vista
//!
//! Template manager for axum applications:
//! - Views are composed with `@layout.html` files found in every directory
//!   above them, or with layouts registered explicitly per view
//! - Compiled templates can be cached; concurrent first requests compile once
//! - Rendering is buffered (errors become a 500) or streamed
//! - Templates build links to named routes relative to the current request
//!
//! ```no_run
//! use std::sync::Arc;
//! use axum::{routing::get, Extension, Router};
//! use serde_json::json;
//! use vista::{DirStore, Links, Manager, Options, Page};
//!
//! let mut links = Links::new();
//! let events = links.named("events", "/events/");
//! let links = Arc::new(links);
//!
//! let manager = Arc::new(Manager::new(
//!     DirStore::new("templates"),
//!     Options::new().cache().links(Arc::clone(&links)),
//! ));
//!
//! let app: Router = Router::new()
//!     .route(events, get(move |page: Page| async move {
//!         manager.instance("events.html", page.view(json!({"count": 3})))
//!     }))
//!     .layer(Extension(links));
//! ```

mod cache;
mod config;
mod error;
mod helper;
mod layout;
mod manager;
mod options;
mod render;
mod store;
mod view;

pub use config::{Config, ServerConfig, TemplatesConfig};
pub use error::{Error, Result};
pub use layout::{Entry, LAYOUT_FILE};
pub use manager::Manager;
pub use options::Options;
pub use render::{Rendered, CONTENT_TYPE};
pub use store::{DirStore, MemoryStore, StoreEntry, StoreError, TemplateStore};
pub use view::{Page, ViewContext};

pub use vista_parser::{FuncError, FuncMap, Namespace};
pub use vista_router::{clean, LinkError, Links};
