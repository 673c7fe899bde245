// File: src/layout.rs
// Purpose: Compose a view with its layout files into one namespace

use tracing::debug;
use vista_parser::{FuncMap, Namespace};
use vista_router::PathHierarchy;

use crate::error::{Error, Result};
use crate::store::{StoreError, TemplateStore};

/// Layout file looked up in every directory above a view
pub const LAYOUT_FILE: &str = "@layout.html";

/// A name registered with explicit files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub content: String,
    /// Outermost first
    pub layouts: Vec<String>,
}

pub(crate) struct Compiler<'a> {
    pub store: &'a dyn TemplateStore,
    pub funcs: &'a FuncMap,
}

impl<'a> Compiler<'a> {
    /// Parses every `@layout.html` from the store root down to the view's
    /// directory, then the view itself. Missing layout files are skipped.
    pub fn convention(&self, name: &str) -> Result<Namespace> {
        if is_layout_file(name) {
            return Err(Error::NotRenderable(name.to_string()));
        }

        let mut ns = Namespace::new(self.funcs.clone());
        let mut parsed = 0;

        for dir in layout_dirs(name) {
            let path = layout_path(&dir);
            match self.read(&path) {
                Ok(source) => {
                    self.parse(&mut ns, &path, &source)?;
                    parsed += 1;
                }
                Err(err) if err.is_not_found() => continue,
                Err(err) => return Err(err),
            }
        }

        let source = self.read(name)?;
        self.parse(&mut ns, name, &source)?;

        debug!(template = name, layouts = parsed, "compiled template");
        Ok(ns)
    }

    /// Parses the listed layouts and then the content file; every file must exist
    pub fn explicit(&self, name: &str, entry: &Entry) -> Result<Namespace> {
        let mut ns = Namespace::new(self.funcs.clone());

        for path in entry.layouts.iter().chain(std::iter::once(&entry.content)) {
            let source = self.read(path)?;
            self.parse(&mut ns, path, &source)?;
        }

        debug!(
            template = name,
            layouts = entry.layouts.len(),
            "compiled registered template"
        );
        Ok(ns)
    }

    fn read(&self, path: &str) -> Result<String> {
        let read_error = |source| Error::Read {
            path: path.to_string(),
            source,
        };

        let bytes = self.store.read_file(path).map_err(read_error)?;
        String::from_utf8(bytes).map_err(|err| {
            read_error(StoreError::Io {
                path: path.to_string(),
                message: err.to_string(),
            })
        })
    }

    fn parse(&self, ns: &mut Namespace, path: &str, source: &str) -> Result<()> {
        ns.parse_into(source).map_err(|source| Error::Parse {
            path: path.to_string(),
            source,
        })
    }
}

pub(crate) fn is_layout_file(path: &str) -> bool {
    path.rsplit('/').next() == Some(LAYOUT_FILE)
}

/// Directories whose layout applies to `name`, outermost first
///
/// `"a/b/page.html"` → `["", "a", "a/b"]`
fn layout_dirs(name: &str) -> Vec<String> {
    let name = name.trim_start_matches('/');
    let dir = name.rfind('/').map(|i| &name[..i]).unwrap_or("");

    let absolute = format!("/{}", dir);
    PathHierarchy::new(&absolute)
        .root_first()
        .into_iter()
        .map(|d| d.trim_start_matches('/').to_string())
        .collect()
}

fn layout_path(dir: &str) -> String {
    if dir.is_empty() {
        LAYOUT_FILE.to_string()
    } else {
        format!("{}/{}", dir, LAYOUT_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("index.html", vec![""])]
    #[case("/index.html", vec![""])]
    #[case("a/page.html", vec!["", "a"])]
    #[case("a/b/page.html", vec!["", "a", "a/b"])]
    fn test_layout_dirs(#[case] name: &str, #[case] expected: Vec<&str>) {
        assert_eq!(layout_dirs(name), expected);
    }

    #[test]
    fn test_layout_path() {
        assert_eq!(layout_path(""), "@layout.html");
        assert_eq!(layout_path("a/b"), "a/b/@layout.html");
        assert!(is_layout_file("a/@layout.html"));
        assert!(is_layout_file("@layout.html"));
        assert!(!is_layout_file("a/layout.html"));
    }

    #[test]
    fn test_skips_missing_levels() {
        let store = MemoryStore::new()
            .with("@layout.html", "<body>{{ block \"main\" . }}{{ end }}</body>")
            .with("a/b/@layout.html", "{{ define \"main\" }}<div>{{ block \"inner\" . }}{{ end }}</div>{{ end }}")
            .with("a/b/page.html", "{{ define \"inner\" }}{{ .x }}{{ end }}");
        let funcs = FuncMap::new();
        let compiler = Compiler {
            store: &store,
            funcs: &funcs,
        };

        let ns = compiler.convention("a/b/page.html").unwrap();
        assert_eq!(
            ns.render(&json!({"x": 1})).unwrap(),
            "<body><div>1</div></body>"
        );
    }

    #[test]
    fn test_explicit_files_are_mandatory() {
        let store = MemoryStore::new().with("pages/a.html", "a");
        let funcs = FuncMap::new();
        let compiler = Compiler {
            store: &store,
            funcs: &funcs,
        };
        let entry = Entry {
            content: "pages/a.html".into(),
            layouts: vec!["layouts/base.html".into()],
        };

        let err = compiler.explicit("a", &entry).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "read layouts/base.html: file not found: layouts/base.html"
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let store = MemoryStore::new().with("bad.html", vec![0xff, 0xfe]);
        let funcs = FuncMap::new();
        let compiler = Compiler {
            store: &store,
            funcs: &funcs,
        };
        assert!(matches!(
            compiler.convention("bad.html"),
            Err(Error::Read {
                source: StoreError::Io { .. },
                ..
            })
        ));
    }
}
