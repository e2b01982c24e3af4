//! Network KV strategy: a Redis-protocol server reached by connection string.
//!
//! Every call opens its own connection and drops it when done. Host, port,
//! credentials and the TLS flag (`rediss://`) all come from the URL.

use crate::core::types::WordList;
use crate::error::{Error, Result};
use crate::persistence::{WordStore, WORDLIST_KEY};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, ConnectionAddr};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

const LABEL: &str = "Redis";

pub struct NetworkKvStore {
    client: redis::Client,
    timeout: Duration,
}

/// Connection details parsed from the URL, safe to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    pub authenticated: bool,
    pub db: i64,
}

impl NetworkKvStore {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::InvalidConfig(format!("network KV connection string: {e}")))?;
        let store = Self { client, timeout };
        let endpoint = store.endpoint();
        info!(
            host = %endpoint.host,
            port = endpoint.port,
            tls = endpoint.tls,
            authenticated = endpoint.authenticated,
            "Using network KV store"
        );
        Ok(store)
    }

    pub fn endpoint(&self) -> Endpoint {
        let info = self.client.get_connection_info();
        let (host, port, tls) = match &info.addr {
            ConnectionAddr::Tcp(host, port) => (host.clone(), *port, false),
            ConnectionAddr::TcpTls { host, port, .. } => (host.clone(), *port, true),
            other => (other.to_string(), 0, false),
        };
        Endpoint {
            host,
            port,
            tls,
            authenticated: info.redis.password.is_some(),
            db: info.redis.db,
        }
    }

    async fn connect(&self) -> Result<MultiplexedConnection> {
        self.bounded(self.client.get_multiplexed_async_connection()).await
    }

    async fn bounded<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => result.map_err(|e| Error::unavailable(LABEL, e)),
            Err(_) => Err(Error::unavailable(
                LABEL,
                format!("timed out after {:?}", self.timeout),
            )),
        }
    }
}

#[async_trait]
impl WordStore for NetworkKvStore {
    async fn load(&self) -> Result<Option<WordList>> {
        let mut conn = self.connect().await?;
        let raw: Option<String> = self.bounded(conn.get(WORDLIST_KEY)).await?;
        let Some(raw) = raw else {
            debug!("Network KV has no word list yet");
            return Ok(None);
        };
        let list = WordList::from_json_slice(raw.as_bytes())?;
        debug!(words = list.len(), "Loaded word list from network KV");
        Ok(Some(list))
    }

    async fn save(&self, list: &WordList) -> Result<()> {
        let body = serde_json::to_string(list)?;
        let mut conn = self.connect().await?;
        self.bounded(conn.set::<_, _, ()>(WORDLIST_KEY, body)).await?;
        debug!(words = list.len(), "Saved word list to network KV");
        Ok(())
    }

    fn label(&self) -> &'static str {
        LABEL
    }
}
