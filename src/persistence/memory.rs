//! In-process store for tests and local experiments.
//!
//! Public so integration tests and embedders can drive the sync service
//! without a live backend. It is not a deployment option: no `StoreConfig`
//! resolves to it, so its "Memory" label only shows up in tests.
//!
//! Holds the serialized document so reads go through the same decoding as the
//! real strategies. `set_unavailable(true)` makes every call fail the way an
//! unreachable backend would.

use crate::core::types::WordList;
use crate::error::{Error, Result};
use crate::persistence::WordStore;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

const LABEL: &str = "Memory";

#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RwLock<Option<Vec<u8>>>,
    unavailable: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with raw stored bytes, e.g. a legacy bare-array document.
    pub fn with_raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            document: RwLock::new(Some(bytes.into())),
            ..Self::default()
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Raw stored bytes, `None` if nothing was ever written.
    pub async fn raw(&self) -> Option<Vec<u8>> {
        self.document.read().await.clone()
    }

    fn check(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::unavailable(LABEL, "store switched off"));
        }
        Ok(())
    }
}

#[async_trait]
impl WordStore for MemoryStore {
    async fn load(&self) -> Result<Option<WordList>> {
        self.check()?;
        match self.document.read().await.as_deref() {
            Some(bytes) => Ok(Some(WordList::from_json_slice(bytes)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, list: &WordList) -> Result<()> {
        self.check()?;
        let bytes = serde_json::to_vec(list)?;
        *self.document.write().await = Some(bytes);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn label(&self) -> &'static str {
        LABEL
    }
}
