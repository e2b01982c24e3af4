//! Managed KV strategy: a REST key-value service (Upstash / Vercel KV style).

use crate::core::types::WordList;
use crate::error::{Error, Result};
use crate::persistence::{WordStore, WORDLIST_KEY};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const LABEL: &str = "KV";

pub struct ManagedKvStore {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

/// Reply body of the REST API: `{"result": ...}` or `{"error": "..."}`.
#[derive(Debug, Deserialize)]
struct RestReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl ManagedKvStore {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("managed KV client: {e}")))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        info!(url = %base_url, "Using managed KV store");
        Ok(Self {
            base_url,
            token: token.to_string(),
            client,
        })
    }

    fn command_url(&self, command: &str) -> String {
        format!("{}/{}/{}", self.base_url, command, WORDLIST_KEY)
    }

    async fn reply(&self, request: reqwest::RequestBuilder) -> Result<Option<Value>> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| Error::unavailable(LABEL, e))?;

        let status = response.status();
        let reply: RestReply = response.json().await.map_err(|e| {
            Error::unavailable(LABEL, format!("HTTP {status}: unreadable reply: {e}"))
        })?;

        if let Some(error) = reply.error {
            return Err(Error::unavailable(LABEL, format!("HTTP {status}: {error}")));
        }
        if !status.is_success() {
            return Err(Error::unavailable(LABEL, format!("HTTP {status}")));
        }
        Ok(reply.result)
    }
}

/// Decodes the `result` of a GET. The service stores strings, so the document
/// normally arrives JSON-encoded inside a string; inline values are accepted too.
fn decode_result(result: Option<Value>) -> Result<Option<WordList>> {
    match result {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => Ok(Some(WordList::from_json_slice(raw.as_bytes())?)),
        Some(inline) => Ok(Some(WordList::from_json_value(inline)?)),
    }
}

#[async_trait]
impl WordStore for ManagedKvStore {
    async fn load(&self) -> Result<Option<WordList>> {
        let result = self.reply(self.client.get(self.command_url("get"))).await?;
        let list = decode_result(result)?;
        debug!(words = ?list.as_ref().map(WordList::len), "Loaded word list from managed KV");
        Ok(list)
    }

    async fn save(&self, list: &WordList) -> Result<()> {
        let body = serde_json::to_string(list)?;
        self.reply(self.client.post(self.command_url("set")).body(body))
            .await?;
        debug!(words = list.len(), "Saved word list to managed KV");
        Ok(())
    }

    fn label(&self) -> &'static str {
        LABEL
    }
}
