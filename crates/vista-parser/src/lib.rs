//! Vista template language
//!
//! A small HTML template language with `{{ ... }}` actions:
//!
//! - `{{ .field.path }}`, `{{ . }}`, `{{ $.root.path }}` print escaped values
//! - `{{ func arg (nested arg) }}` calls a function from the [`FuncMap`] or a builtin
//!   (`eq`, `not`, `len`, `default`, `join`); `safe` prints without escaping
//! - `{{ if }}` / `{{ range }}` with optional `{{ else }}`, closed by `{{ end }}`
//! - `{{ define "name" }}`, `{{ block "name" . }}` and `{{ template "name" . }}`
//! - `{{/* comments */}}` and `{{-` / `-}}` whitespace trimming
//!
//! ```
//! use serde_json::json;
//! use vista_parser::{FuncMap, Namespace};
//!
//! let ns = Namespace::new(FuncMap::new())
//!     .parse(r#"<h1>{{ block "title" . }}Untitled{{ end }}</h1>"#)
//!     .unwrap()
//!     .parse(r#"{{ define "title" }}{{ .name }}{{ end }}"#)
//!     .unwrap();
//!
//! assert_eq!(ns.render(&json!({"name": "Tom & Jerry"})).unwrap(), "<h1>Tom &amp; Jerry</h1>");
//! ```

mod ast;
mod error;
mod exec;
mod funcs;
mod lexer;
mod namespace;
mod parser;

pub use error::{ExecError, FuncError, ParseError};
pub use exec::escape;
pub use funcs::{display, truthy, Func, FuncMap};
pub use namespace::Namespace;
