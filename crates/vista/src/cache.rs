use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::OnceCell;
use tracing::debug;
use vista_parser::Namespace;

use crate::error::Result;

type Slot = Arc<OnceCell<Arc<Namespace>>>;

/// Compiled templates by name
///
/// Each name gets its own slot, so compiling one template never blocks
/// another. Concurrent first requests for the same name wait for a single
/// compile. A failed compile leaves the slot empty and the next request
/// tries again. Filled slots are never invalidated.
#[derive(Debug, Default)]
pub(crate) struct Cache {
    slots: RwLock<HashMap<String, Slot>>,
}

impl Cache {
    pub fn get_or_compile<F>(&self, name: &str, compile: F) -> Result<Arc<Namespace>>
    where
        F: FnOnce() -> Result<Namespace>,
    {
        let slot = self.slot(name);
        if let Some(view) = slot.get() {
            return Ok(Arc::clone(view));
        }

        slot.get_or_try_init(|| {
            debug!(template = name, "cache miss");
            compile().map(Arc::new)
        })
        .map(Arc::clone)
    }

    /// Number of compiled templates
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    fn slot(&self, name: &str) -> Slot {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Arc::clone(slot);
        }

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(name.to_string()).or_default())
    }
}
