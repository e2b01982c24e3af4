//! Read contract for the presentation layer and the invalidation signal the
//! sync service sends after a successful save.

use crate::core::types::WordList;
use crate::error::Result;
use crate::persistence::WordStore;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Receiver of "the stored word list changed" notifications.
///
/// One-way: no acknowledgement, no retry.
pub trait ViewCache: Send + Sync {
    fn invalidate(&self);
}

/// For deployments with nothing to invalidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl ViewCache for NoopCache {
    fn invalidate(&self) {}
}

/// Memoized read-through view of the stored word list.
///
/// Collaborators read stored data only through [`WordListCache::current`].
/// Absence is cached like a document; errors are not.
pub struct WordListCache<S> {
    store: S,
    cached: RwLock<Option<Option<Arc<WordList>>>>,
    generation: AtomicU64,
}

impl<S: WordStore> WordListCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cached: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The current word list, or `None` when nothing has been synced yet.
    pub async fn current(&self) -> Result<Option<Arc<WordList>>> {
        if let Some(hit) = self.cached.read().as_ref() {
            return Ok(hit.clone());
        }

        let generation = self.generation.load(Ordering::Acquire);
        let loaded = self.store.load().await?.map(Arc::new);

        // An invalidation during the load means `loaded` may already be stale.
        let mut cached = self.cached.write();
        if self.generation.load(Ordering::Acquire) == generation {
            *cached = Some(loaded.clone());
        }
        Ok(loaded)
    }

    pub fn is_warm(&self) -> bool {
        self.cached.read().is_some()
    }
}

impl<S: WordStore> ViewCache for WordListCache<S> {
    fn invalidate(&self) {
        let mut cached = self.cached.write();
        self.generation.fetch_add(1, Ordering::AcqRel);
        *cached = None;
        debug!("Word list view invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Parks every `load` until the test opens the gate.
    #[derive(Default)]
    struct GatedStore {
        inner: MemoryStore,
        entered: Notify,
        gate: Notify,
    }

    #[async_trait]
    impl WordStore for GatedStore {
        async fn load(&self) -> Result<Option<WordList>> {
            self.entered.notify_one();
            self.gate.notified().await;
            self.inner.load().await
        }

        async fn save(&self, list: &WordList) -> Result<()> {
            self.inner.save(list).await
        }

        fn label(&self) -> &'static str {
            "Gated"
        }
    }

    #[tokio::test]
    async fn absent_store_reads_as_none() {
        let views = WordListCache::new(MemoryStore::new());
        assert!(views.current().await.unwrap().is_none());
        assert!(views.is_warm());
    }

    #[tokio::test]
    async fn serves_cached_copy_until_invalidated() {
        let store = Arc::new(MemoryStore::new());
        let views = WordListCache::new(store.clone());
        assert!(views.current().await.unwrap().is_none());

        store.save(&WordList::default()).await.unwrap();
        assert!(views.current().await.unwrap().is_none(), "stale until invalidated");

        views.invalidate();
        assert!(!views.is_warm());
        assert_eq!(views.current().await.unwrap().as_deref(), Some(&WordList::default()));
    }

    #[tokio::test]
    async fn load_errors_are_not_cached() {
        let store = Arc::new(MemoryStore::new());
        let views = WordListCache::new(store.clone());

        store.set_unavailable(true);
        assert!(views.current().await.is_err());
        assert!(!views.is_warm());

        store.set_unavailable(false);
        assert!(views.current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn load_racing_an_invalidation_is_not_cached() {
        let store = Arc::new(GatedStore::default());
        let views = Arc::new(WordListCache::new(store.clone()));

        let pending = tokio::spawn({
            let views = views.clone();
            async move { views.current().await }
        });
        store.entered.notified().await;

        // The sync lands while the read is still in flight.
        store.inner.save(&WordList::default()).await.unwrap();
        views.invalidate();
        store.gate.notify_one();

        let loaded = pending.await.unwrap().unwrap();
        assert_eq!(loaded.as_deref(), Some(&WordList::default()));
        assert!(!views.is_warm(), "a load started before invalidate must not be memoized");

        store.gate.notify_one();
        assert!(views.current().await.unwrap().is_some());
        assert!(views.is_warm());
    }
}
