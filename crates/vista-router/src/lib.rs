//! # Vista Router
//!
//! Route utilities used by the vista template manager. Nothing in this crate
//! touches the network or the filesystem:
//! - Route patterns with static (`/about`), placeholder (`/users/:id`) and
//!   wildcard (`/docs/*path`) segments
//! - A registry of named routes ([`Links`]) that builds concrete paths
//! - Lexical path cleaning and request-relative links
//!
//! ## Example
//!
//! ```
//! use vista_router::{rel, Links};
//!
//! let mut links = Links::new();
//! let pattern = links.named("eventByID", "/event/:id");
//! assert_eq!(pattern, "/event/:id");
//!
//! let path = links.path("eventByID", &[1234]).unwrap();
//! assert_eq!(path, "/event/1234");
//! assert_eq!(rel("/admin/events/", &path, &[]), "../../event/1234");
//! ```

mod error;
mod links;
pub mod path;
pub mod route;

pub use error::LinkError;
pub use links::Links;
pub use path::{clean, is_under, join, rel, root_path, PathHierarchy};
pub use route::pattern::{classify_segment, PathPattern, Segment, SegmentKind};
