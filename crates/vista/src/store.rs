// File: src/store.rs
// Purpose: Read-only sources of template files

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("{path}: {message}")]
    Io { path: String, message: String },
}

/// One entry of a store listing
///
/// Paths are `/`-separated and relative to the store root (`sub/page.html`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct StoreEntry {
    pub path: String,
    pub is_dir: bool,
}

/// A hierarchical source of template files
pub trait TemplateStore: Send + Sync + fmt::Debug {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, StoreError>;

    /// Every file and directory in the store, sorted by path
    fn walk(&self) -> Result<Vec<StoreEntry>, StoreError>;
}

/// Templates in a directory on disk
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a store path to a file below the root; anything that would
    /// escape the root resolves to nothing
    ///
    /// A leading `/` means the store root, as in [`MemoryStore`].
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        contained.then(|| self.root.join(relative))
    }
}

impl TemplateStore for DirStore {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        let full = self
            .resolve(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;

        std::fs::read(&full).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(path.to_string()),
            _ => StoreError::Io {
                path: path.to_string(),
                message: err.to_string(),
            },
        })
    }

    fn walk(&self) -> Result<Vec<StoreEntry>, StoreError> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(&self.root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|err| StoreError::Io {
                path: self.root.display().to_string(),
                message: err.to_string(),
            })?;

            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let path = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            entries.push(StoreEntry {
                path,
                is_dir: entry.file_type().is_dir(),
            });
        }

        entries.sort();
        Ok(entries)
    }
}

/// Templates held in memory
///
/// Useful for tests and for templates bundled into the binary with
/// `include_str!`.
#[derive(Default)]
pub struct MemoryStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        let path = path.into().trim_start_matches('/').to_string();
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, content.into());
    }

    /// Removes a file, returning whether it existed
    pub fn remove(&self, path: &str) -> bool {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path.trim_start_matches('/'))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.files.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("files", &self.len())
            .finish()
    }
}

impl TemplateStore for MemoryStore {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path.trim_start_matches('/'))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    fn walk(&self) -> Result<Vec<StoreEntry>, StoreError> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let mut entries = BTreeSet::new();

        for path in files.keys() {
            let mut dir = path.as_str();
            while let Some(slash) = dir.rfind('/') {
                dir = &dir[..slash];
                entries.insert(StoreEntry {
                    path: dir.to_string(),
                    is_dir: true,
                });
            }
            entries.insert(StoreEntry {
                path: path.clone(),
                is_dir: false,
            });
        }

        Ok(entries.into_iter().collect())
    }
}
