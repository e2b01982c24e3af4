//! Persistence strategies behind the `load`/`save` contract.
//!
//! A deployment runs exactly one strategy, picked once from [`StoreConfig`]
//! in priority order (network KV, managed KV, local file) and handed to the
//! sync service as a [`Backend`].

pub mod file;
pub mod managed_kv;
/// Test and experiment helper. Not a deployable strategy: [`Backend`] has no
/// variant for it, so [`Backend::from_config`] never selects it.
pub mod memory;
pub mod network_kv;

use crate::config::StoreConfig;
use crate::core::types::WordList;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use file::FileStore;
pub use managed_kv::ManagedKvStore;
pub use memory::MemoryStore;
pub use network_kv::NetworkKvStore;

/// Key under which the KV strategies keep the single word-list document.
pub const WORDLIST_KEY: &str = "wordlist";

/// Storage for the one word-list document of a deployment.
#[async_trait]
pub trait WordStore: Send + Sync {
    /// Current document, or `None` when nothing has been synced yet.
    ///
    /// Legacy bare-array documents come back wrapped in the envelope.
    async fn load(&self) -> Result<Option<WordList>>;

    /// Replaces the stored document.
    async fn save(&self, list: &WordList) -> Result<()>;

    /// Short name reported to sync callers ("Redis", "KV", "FS").
    fn label(&self) -> &'static str;
}

#[async_trait]
impl<S: WordStore + ?Sized> WordStore for Arc<S> {
    async fn load(&self) -> Result<Option<WordList>> {
        (**self).load().await
    }

    async fn save(&self, list: &WordList) -> Result<()> {
        (**self).save(list).await
    }

    fn label(&self) -> &'static str {
        (**self).label()
    }
}

/// The configured strategy.
pub enum Backend {
    NetworkKv(NetworkKvStore),
    ManagedKv(ManagedKvStore),
    LocalFile(FileStore),
}

impl Backend {
    pub fn from_config(store: &StoreConfig, timeout: Duration) -> Result<Self> {
        let backend = match store {
            StoreConfig::NetworkKv { url } => Self::NetworkKv(NetworkKvStore::new(url, timeout)?),
            StoreConfig::ManagedKv { url, token } => {
                Self::ManagedKv(ManagedKvStore::new(url, token, timeout)?)
            }
            StoreConfig::LocalFile { dir } => Self::LocalFile(FileStore::new(dir)),
        };
        Ok(backend)
    }
}

#[async_trait]
impl WordStore for Backend {
    async fn load(&self) -> Result<Option<WordList>> {
        match self {
            Self::NetworkKv(store) => store.load().await,
            Self::ManagedKv(store) => store.load().await,
            Self::LocalFile(store) => store.load().await,
        }
    }

    async fn save(&self, list: &WordList) -> Result<()> {
        match self {
            Self::NetworkKv(store) => store.save(list).await,
            Self::ManagedKv(store) => store.save(list).await,
            Self::LocalFile(store) => store.save(list).await,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::NetworkKv(store) => store.label(),
            Self::ManagedKv(store) => store.label(),
            Self::LocalFile(store) => store.label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn builds_each_strategy_from_config() {
        let timeout = Duration::from_secs(1);

        let dir = TempDir::new().unwrap();
        let labels: Vec<_> = configured(&dir)
            .iter()
            .map(|store| Backend::from_config(store, timeout).unwrap().label())
            .collect();
        assert_eq!(labels, ["Redis", "KV", "FS"]);
    }

    fn configured(dir: &TempDir) -> Vec<StoreConfig> {
        vec![
            StoreConfig::NetworkKv {
                url: "redis://127.0.0.1:6379".into(),
            },
            StoreConfig::ManagedKv {
                url: "https://kv.example".into(),
                token: "t".into(),
            },
            StoreConfig::LocalFile {
                dir: dir.path().into(),
            },
        ]
    }

    #[test]
    fn in_process_store_is_never_a_configured_backend() {
        let dir = TempDir::new().unwrap();
        let memory_label = MemoryStore::new().label();
        for store in configured(&dir) {
            let backend = Backend::from_config(&store, Duration::from_secs(1)).unwrap();
            assert_ne!(backend.label(), memory_label, "{store:?}");
        }
    }

    #[test]
    fn rejects_malformed_connection_string() {
        let result = Backend::from_config(
            &StoreConfig::NetworkKv {
                url: "not a url".into(),
            },
            Duration::from_secs(1),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn local_file_backend_dispatches_to_file_store() {
        let dir = TempDir::new().unwrap();
        let store = StoreConfig::LocalFile {
            dir: dir.path().into(),
        };
        let backend = Backend::from_config(&store, Duration::from_secs(1)).unwrap();

        assert_eq!(backend.load().await.unwrap(), None);
        backend.save(&WordList::default()).await.unwrap();
        assert_eq!(backend.load().await.unwrap(), Some(WordList::default()));
    }
}
