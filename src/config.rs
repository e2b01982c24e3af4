//! Environment configuration, read once at startup.

use crate::error::{Error, Result};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_REDIS_URL: &str = "REDIS_URL";
pub const ENV_KV_URL: &str = "KV_REST_API_URL";
pub const ENV_KV_TOKEN: &str = "KV_REST_API_TOKEN";
pub const ENV_DATA_DIR: &str = "DATA_DIR";
pub const ENV_SYNC_SECRET: &str = "SYNC_SECRET";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_BACKEND_TIMEOUT: &str = "BACKEND_TIMEOUT_SECS";

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 5;

/// Which persistence strategy a deployment uses.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Redis-protocol store reached through a connection string.
    NetworkKv { url: String },
    /// REST key-value service with a bearer token.
    ManagedKv { url: String, token: String },
    /// Single JSON file under a data directory.
    LocalFile { dir: PathBuf },
}

impl StoreConfig {
    /// Resolves the strategy in fixed priority order: network KV, managed KV, local file.
    pub fn resolve<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = non_empty(lookup, ENV_REDIS_URL) {
            return Self::NetworkKv { url };
        }
        if let (Some(url), Some(token)) = (
            non_empty(lookup, ENV_KV_URL),
            non_empty(lookup, ENV_KV_TOKEN),
        ) {
            return Self::ManagedKv { url, token };
        }
        let dir = non_empty(lookup, ENV_DATA_DIR).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        Self::LocalFile { dir: PathBuf::from(dir) }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NetworkKv { .. } => "Redis",
            Self::ManagedKv { .. } => "KV",
            Self::LocalFile { .. } => "FS",
        }
    }
}

// Connection strings and tokens carry credentials; keep them out of logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkKv { .. } => f.debug_struct("NetworkKv").finish_non_exhaustive(),
            Self::ManagedKv { url, .. } => f
                .debug_struct("ManagedKv")
                .field("url", url)
                .finish_non_exhaustive(),
            Self::LocalFile { dir } => f.debug_struct("LocalFile").field("dir", dir).finish(),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    /// Shared sync secret. `None` rejects every sync.
    pub sync_secret: Option<String>,
    pub bind_addr: SocketAddr,
    pub backend_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = StoreConfig::resolve(&lookup);

        let bind =
            non_empty(&lookup, ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|e| Error::InvalidConfig(format!("{ENV_BIND_ADDR}={bind}: {e}")))?;

        let backend_timeout = match non_empty(&lookup, ENV_BACKEND_TIMEOUT) {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| {
                    Error::InvalidConfig(format!("{ENV_BACKEND_TIMEOUT}={raw}: {e}"))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
        };

        Ok(Self {
            store,
            sync_secret: non_empty(&lookup, ENV_SYNC_SECRET),
            bind_addr,
            backend_timeout,
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn network_kv_takes_priority() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_REDIS_URL, "redis://localhost:6379"),
            (ENV_KV_URL, "https://kv.example"),
            (ENV_KV_TOKEN, "token"),
        ]))
        .unwrap();
        assert_eq!(
            config.store,
            StoreConfig::NetworkKv { url: "redis://localhost:6379".into() }
        );
        assert_eq!(config.store.label(), "Redis");
    }

    #[test]
    fn managed_kv_needs_url_and_token() {
        let only_url =
            Config::from_lookup(lookup_from(&[(ENV_KV_URL, "https://kv.example")])).unwrap();
        assert_eq!(only_url.store.label(), "FS");

        let both = Config::from_lookup(lookup_from(&[
            (ENV_KV_URL, "https://kv.example"),
            (ENV_KV_TOKEN, "token"),
        ]))
        .unwrap();
        assert_eq!(
            both.store,
            StoreConfig::ManagedKv { url: "https://kv.example".into(), token: "token".into() }
        );
    }

    #[test]
    fn falls_back_to_local_file() {
        let config = Config::from_lookup(lookup_from(&[(ENV_REDIS_URL, "  ")])).unwrap();
        assert_eq!(config.store, StoreConfig::LocalFile { dir: PathBuf::from(DEFAULT_DATA_DIR) });
        assert_eq!(config.sync_secret, None);
        assert_eq!(config.backend_timeout, Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS));
    }

    #[test]
    fn reads_secret_and_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_SYNC_SECRET, "s3cret"),
            (ENV_DATA_DIR, "/var/lib/words"),
            (ENV_BIND_ADDR, "127.0.0.1:8080"),
            (ENV_BACKEND_TIMEOUT, "2"),
        ]))
        .unwrap();
        assert_eq!(config.sync_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.store, StoreConfig::LocalFile { dir: PathBuf::from("/var/lib/words") });
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.backend_timeout, Duration::from_secs(2));
    }

    #[test]
    fn rejects_bad_bind_addr() {
        let err = Config::from_lookup(lookup_from(&[(ENV_BIND_ADDR, "nowhere")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn debug_output_hides_credentials() {
        let store = StoreConfig::ManagedKv {
            url: "https://kv.example".into(),
            token: "hunter2".into(),
        };
        let rendered = format!("{store:?}");
        assert!(rendered.contains("kv.example"));
        assert!(!rendered.contains("hunter2"));

        let redis = StoreConfig::NetworkKv { url: "redis://:pw@host:6379".into() };
        assert!(!format!("{redis:?}").contains("pw"));
    }
}
