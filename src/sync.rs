// File: src/sync.rs
use crate::cache::ViewCache;
use crate::core::merge::merge;
use crate::core::types::WordList;
use crate::error::{Error, Result};
use crate::persistence::WordStore;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// What a successful sync reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    pub backend: &'static str,
    pub words: usize,
}

impl SyncOutcome {
    pub fn message(&self) -> String {
        format!("Data synced successfully ({})", self.backend)
    }
}

/// Authorize, load, merge, save, invalidate.
pub struct SyncService<S> {
    store: S,
    secret: Option<String>,
    views: Arc<dyn ViewCache>,
    write_lock: Mutex<()>,
}

impl<S: WordStore> SyncService<S> {
    pub fn new(store: S, secret: Option<String>, views: Arc<dyn ViewCache>) -> Self {
        if secret.is_none() {
            warn!("No sync secret configured; every sync will be rejected");
        }
        Self {
            store,
            secret,
            views,
            write_lock: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &'static str {
        self.store.label()
    }

    /// Checks the presented shared secret. Nothing is read or written here.
    pub fn authorize(&self, presented: &str) -> Result<()> {
        let Some(expected) = self.secret.as_deref() else {
            return Err(Error::Unauthorized);
        };
        if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(())
        } else {
            Err(Error::Unauthorized)
        }
    }

    pub async fn sync(&self, secret: &str, incoming: WordList) -> Result<SyncOutcome> {
        self.authorize(secret)?;

        let merged = {
            // Serializes overlapping syncs within this process.
            let _guard = self.write_lock.lock().await;

            let existing = self.store.load().await?.unwrap_or_default();
            let incoming_len = incoming.len();
            let merged = WordList::new(merge(&existing.words, incoming.words));
            debug!(
                existing = existing.len(),
                incoming = incoming_len,
                merged = merged.len(),
                "Merged word list"
            );

            self.store.save(&merged).await?;
            merged
        };

        self.views.invalidate();

        let outcome = SyncOutcome {
            backend: self.store.label(),
            words: merged.len(),
        };
        info!(backend = outcome.backend, words = outcome.words, "Word list synced");
        Ok(outcome)
    }
}
