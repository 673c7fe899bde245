// File: src/helper.rs
// Purpose: Link and path functions available to every template

use std::sync::Arc;

use serde_json::Value;
use vista_parser::{display, FuncError, FuncMap};
use vista_router::{is_under, rel, LinkError, Links};

/// Adds `rel`, `under` and `link` to `funcs` unless it already defines them
///
/// All three read the current request path from `.path` of the root value,
/// which is where a serialized [`ViewContext`](crate::ViewContext) puts it.
pub(crate) fn install(funcs: &mut FuncMap, links: Option<Arc<Links>>) {
    if !funcs.contains("rel") {
        funcs.insert("rel", |root, args| {
            let (target, segments) = split_args("rel", args)?;
            let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
            Ok(Value::String(rel(current_path(root), &target, &segments)))
        });
    }

    if !funcs.contains("under") {
        funcs.insert("under", |root, args| {
            let (path, _) = split_args("under", args)?;
            Ok(Value::Bool(is_under(current_path(root), &path)))
        });
    }

    if !funcs.contains("link") {
        funcs.insert("link", move |root, args| {
            let links = links
                .as_deref()
                .ok_or_else(|| FuncError::new(LinkError::LinksNotInstalled.to_string()))?;
            let (alias, args) = split_args("link", args)?;
            let path = links
                .path(&alias, &args)
                .map_err(|err| FuncError::new(err.to_string()))?;
            Ok(Value::String(rel(current_path(root), &path, &[])))
        });
    }
}

fn current_path(root: &Value) -> &str {
    root.get("path").and_then(Value::as_str).unwrap_or("")
}

/// First argument plus every later argument formatted for a URL
fn split_args(name: &str, args: &[Value]) -> Result<(String, Vec<String>), FuncError> {
    match args.split_first() {
        Some((first, rest)) => Ok((display(first), rest.iter().map(display).collect())),
        None => Err(FuncError::new(format!("{} expects at least 1 argument", name))),
    }
}
