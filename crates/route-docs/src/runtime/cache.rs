//! Generation-tagged document cache.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use bytes::Bytes;

/// A rendered document and the registry generation it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedDocument {
    /// Registry generation of the snapshot the body was rendered from.
    pub generation: u64,
    /// Serialized document.
    pub body: Bytes,
}

/// Lock-free cache cell holding at most one [`CachedDocument`].
///
/// Readers never block. Writers race freely; [`store`](Self::store) keeps
/// whichever entry has the higher generation, so a slow rebuild from an old
/// snapshot can never replace a newer document.
#[derive(Debug, Default)]
pub struct DocumentCache {
    slot: ArcSwapOption<CachedDocument>,
}

impl DocumentCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Body cached for exactly `generation`, if any.
    #[must_use]
    pub fn get(&self, generation: u64) -> Option<Bytes> {
        let guard = self.slot.load();
        match &*guard {
            Some(cached) if cached.generation == generation => Some(cached.body.clone()),
            _ => None,
        }
    }

    /// The cached entry regardless of generation.
    #[must_use]
    pub fn current(&self) -> Option<Arc<CachedDocument>> {
        self.slot.load_full()
    }

    /// Offer a freshly built document.
    ///
    /// Returns `true` if it replaced the cached entry, `false` if the cache
    /// already held an entry of the same or a higher generation.
    pub fn store(&self, generation: u64, body: Bytes) -> bool {
        let fresh = Arc::new(CachedDocument { generation, body });
        let mut stored = false;
        self.slot.rcu(|current| match current {
            Some(existing) if existing.generation >= generation => {
                stored = false;
                Some(Arc::clone(existing))
            }
            _ => {
                stored = true;
                Some(Arc::clone(&fresh))
            }
        });
        stored
    }
}
