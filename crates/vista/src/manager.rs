// File: src/manager.rs
// Purpose: Resolve view names to compiled templates and render them

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{debug, info};
use vista_parser::{FuncMap, Namespace};

use crate::cache::Cache;
use crate::error::{Error, Result};
use crate::helper;
use crate::layout::{is_layout_file, Compiler, Entry};
use crate::options::Options;
use crate::render::Rendered;
use crate::store::TemplateStore;

const PAGES_DIR: &str = "pages";
const LAYOUTS_DIR: &str = "layouts";

#[derive(Debug)]
enum Mode {
    /// Names are store paths; `@layout.html` files are discovered per directory
    Convention,
    /// Only registered names resolve, each to its own list of files
    Explicit(BTreeMap<String, Entry>),
}

/// Template manager
///
/// Resolves a view name to a compiled template, composing it with its
/// layouts, and optionally keeps the result for later requests.
///
/// Registration (`alias`, `add`, `register`) needs `&mut self` and belongs to
/// start-up; once the manager is shared (usually in an `Arc`) only the
/// lookup and render methods are used.
///
/// ```
/// use serde_json::json;
/// use vista::{Manager, MemoryStore, Options};
///
/// let store = MemoryStore::new()
///     .with("@layout.html", r#"<main>{{ block "content" . }}{{ end }}</main>"#)
///     .with("hello.html", r#"{{ define "content" }}Hello {{ .name }}{{ end }}"#);
///
/// let manager = Manager::new(store, Options::new().cache());
/// let mut out = Vec::new();
/// manager.instance("hello.html", json!({"name": "World"})).render(&mut out).unwrap();
/// assert_eq!(out, b"<main>Hello World</main>");
/// ```
#[derive(Debug)]
pub struct Manager {
    store: Arc<dyn TemplateStore>,
    funcs: FuncMap,
    stream: bool,
    cache: Option<Cache>,
    aliases: HashMap<String, String>,
    mode: Mode,
}

impl Manager {
    /// Manager that discovers layouts by directory
    pub fn new(store: impl TemplateStore + 'static, options: Options) -> Self {
        Self::with_store(Arc::new(store), options)
    }

    /// Manager that only renders names registered with [`add`](Self::add)
    /// or [`register`](Self::register)
    pub fn explicit(store: impl TemplateStore + 'static, options: Options) -> Self {
        let mut manager = Self::new(store, options);
        manager.mode = Mode::Explicit(BTreeMap::new());
        manager
    }

    pub fn with_store(store: Arc<dyn TemplateStore>, options: Options) -> Self {
        let Options {
            cache,
            stream,
            mut funcs,
            links,
        } = options;
        helper::install(&mut funcs, links);

        Self {
            store,
            funcs,
            stream,
            cache: cache.then(Cache::default),
            aliases: HashMap::new(),
            mode: Mode::Convention,
        }
    }

    /// Makes `file` renderable under the short name `alias`
    pub fn alias(&mut self, alias: impl Into<String>, file: impl Into<String>) {
        self.aliases.insert(alias.into(), file.into());
    }

    /// Registers `name` as `content` wrapped in `layouts` (outermost first)
    ///
    /// Switches a convention manager to explicit mode.
    pub fn add(&mut self, name: impl Into<String>, content: impl Into<String>, layouts: &[&str]) {
        let entry = Entry {
            content: content.into(),
            layouts: layouts.iter().map(|l| l.to_string()).collect(),
        };

        if let Mode::Convention = self.mode {
            self.mode = Mode::Explicit(BTreeMap::new());
        }
        if let Mode::Explicit(entries) = &mut self.mode {
            entries.insert(name.into(), entry);
        }
    }

    /// Registers `page` as `pages/<page>` wrapped in `layouts/<layout>` files
    pub fn register(&mut self, page: &str, layouts: &[&str]) {
        let layouts: Vec<String> = layouts
            .iter()
            .map(|l| format!("{}/{}", LAYOUTS_DIR, l))
            .collect();
        let layouts: Vec<&str> = layouts.iter().map(String::as_str).collect();
        self.add(page, format!("{}/{}", PAGES_DIR, page), &layouts);
    }

    /// Compiled template for a name or alias
    ///
    /// With caching enabled a name is compiled at most once, even under
    /// concurrent first use, and later changes to the store are not seen.
    pub fn get(&self, name: &str) -> Result<Arc<Namespace>> {
        let name = self.aliases.get(name).map(String::as_str).unwrap_or(name);

        match &self.cache {
            Some(cache) => cache.get_or_compile(name, || self.compile(name)),
            None => self.compile(name).map(Arc::new),
        }
    }

    /// Compiles every renderable template, stopping at the first failure
    ///
    /// Only useful with caching enabled, as a warm-up.
    pub fn compile_all(&self) -> Result<usize> {
        let names: Vec<String> = match &self.mode {
            Mode::Convention => self
                .store
                .walk()
                .map_err(|source| Error::Read {
                    path: ".".to_string(),
                    source,
                })?
                .into_iter()
                .filter(|entry| !entry.is_dir && !is_layout_file(&entry.path))
                .map(|entry| entry.path)
                .collect(),
            Mode::Explicit(entries) => entries.keys().cloned().collect(),
        };

        if self.cache.is_none() {
            debug!("compiling templates without a cache");
        }

        for name in &names {
            self.get(name)?;
        }

        info!(templates = names.len(), "compiled all templates");
        Ok(names.len())
    }

    /// Binds a view to its data for rendering
    ///
    /// Compile errors are kept in the result rather than returned.
    pub fn instance(&self, name: &str, data: impl Serialize) -> Rendered {
        let result = serde_json::to_value(data)
            .map_err(Error::from)
            .and_then(|data| Ok((self.get(name)?, data)));

        match result {
            Ok((view, data)) => Rendered::Ok {
                name: name.to_string(),
                view,
                data,
                stream: self.stream,
            },
            Err(error) => Rendered::Failed {
                name: name.to_string(),
                error,
            },
        }
    }

    /// Renders a view as an axum response
    pub fn html(&self, name: &str, data: impl Serialize) -> Response {
        self.instance(name, data).into_response()
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    pub fn is_streamed(&self) -> bool {
        self.stream
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self.mode, Mode::Explicit(_))
    }

    /// Number of templates held in the cache
    pub fn cached(&self) -> usize {
        self.cache.as_ref().map_or(0, Cache::len)
    }

    pub fn funcs(&self) -> &FuncMap {
        &self.funcs
    }

    fn compile(&self, name: &str) -> Result<Namespace> {
        let compiler = Compiler {
            store: self.store.as_ref(),
            funcs: &self.funcs,
        };

        match &self.mode {
            Mode::Convention => compiler.convention(name),
            Mode::Explicit(entries) => {
                let entry = entries
                    .get(name)
                    .ok_or_else(|| Error::NotRegistered(name.to_string()))?;
                compiler.explicit(name, entry)
            }
        }
    }
}
