//! HTTP surface: the sync endpoint, the read endpoint and a health check.

use crate::cache::WordListCache;
use crate::core::types::{StatusSummary, Word, WordList};
use crate::persistence::WordStore;
use crate::sync::SyncService;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

pub const SECRET_HEADER: &str = "x-sync-secret";
const MAX_REQUEST_BODY_SIZE: usize = 32 * 1024 * 1024; // 32 MB
const REQUEST_TIMEOUT_SECS: u64 = 10;
/// Longest a sync caller waits. Covers a network KV connect, GET, connect and
/// SET at the default 5s backend timeout each.
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(30);

const SYNC_FAILED: &str = "Failed to sync data";
const READ_FAILED: &str = "Failed to read data";
const NOT_SYNCED: &str = "No data synced yet";

/// Shared handler state
pub struct AppState<S> {
    pub sync: Arc<SyncService<S>>,
    pub views: Arc<WordListCache<S>>,
    pub sync_timeout: Duration,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            sync: self.sync.clone(),
            views: self.views.clone(),
            sync_timeout: self.sync_timeout,
        }
    }
}

impl<S: WordStore + Clone + 'static> AppState<S> {
    /// Wires the sync service to the view cache so each sync invalidates it.
    pub fn new(store: S, secret: Option<String>) -> Self {
        let views = Arc::new(WordListCache::new(store.clone()));
        let sync = Arc::new(SyncService::new(store, secret, views.clone()));
        Self {
            sync,
            views,
            sync_timeout: DEFAULT_SYNC_TIMEOUT,
        }
    }

    /// How long `POST /api/sync` waits before answering 500. The sync itself
    /// keeps running to completion either way.
    pub fn with_sync_timeout(mut self, sync_timeout: Duration) -> Self {
        self.sync_timeout = sync_timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct SyncResponse {
    success: bool,
    message: String,
}

impl SyncResponse {
    fn reply(status: StatusCode, success: bool, message: impl Into<String>) -> Response {
        (
            status,
            Json(Self {
                success,
                message: message.into(),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
struct WordsResponse<'a> {
    synced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    words: Option<&'a [Word]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<StatusSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
}

pub fn router<S: WordStore + 'static>(state: AppState<S>) -> Router {
    // The sync route bounds itself in `sync_handler`; a layer timeout would
    // drop the sync between save and invalidate.
    let reads = Router::new()
        .route("/api/words", get(words_handler::<S>))
        .route("/health", get(health_handler::<S>))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)));

    Router::new()
        .route("/api/sync", post(sync_handler::<S>))
        .merge(reads)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_SIZE))
        .with_state(state)
}

/// `POST /api/sync`. The secret is checked before the body is even parsed.
async fn sync_handler<S: WordStore + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let secret = headers
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if state.sync.authorize(secret).is_err() {
        warn!("Rejected sync with bad or missing secret");
        return SyncResponse::reply(StatusCode::UNAUTHORIZED, false, "Unauthorized");
    }

    let incoming: WordList = match serde_json::from_slice(&body) {
        Ok(list) => list,
        Err(e) => {
            error!(error = %e, "Sync body is not a word-list envelope");
            return SyncResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, false, SYNC_FAILED);
        }
    };

    // Runs on its own task so a dropped request or the timeout below cannot
    // stop it between save and invalidate.
    let sync = state.sync.clone();
    let secret = secret.to_string();
    let task = tokio::spawn(async move { sync.sync(&secret, incoming).await });

    match tokio::time::timeout(state.sync_timeout, task).await {
        Ok(Ok(Ok(outcome))) => SyncResponse::reply(StatusCode::OK, true, outcome.message()),
        // Unauthorized cannot come back here; the secret was checked above.
        Ok(Ok(Err(e))) => {
            error!(backend = state.sync.backend(), error = %e, "Error syncing data");
            SyncResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, false, SYNC_FAILED)
        }
        Ok(Err(e)) => {
            error!(backend = state.sync.backend(), error = %e, "Sync task failed");
            SyncResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, false, SYNC_FAILED)
        }
        Err(_) => {
            error!(
                backend = state.sync.backend(),
                timeout = ?state.sync_timeout,
                "Sync still running after timeout; it will finish in the background"
            );
            SyncResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, false, SYNC_FAILED)
        }
    }
}

/// `GET /api/words`. An empty store is a normal state, not an error.
async fn words_handler<S: WordStore + 'static>(State(state): State<AppState<S>>) -> Response {
    match state.views.current().await {
        Ok(Some(list)) => Json(WordsResponse {
            synced: true,
            words: Some(&list.words),
            summary: Some(list.summary()),
            message: None,
        })
        .into_response(),
        Ok(None) => Json(WordsResponse {
            synced: false,
            words: None,
            summary: None,
            message: Some(NOT_SYNCED),
        })
        .into_response(),
        Err(e) => {
            error!(backend = state.sync.backend(), error = %e, "Error reading word list");
            SyncResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, false, READ_FAILED)
        }
    }
}

async fn health_handler<S: WordStore + 'static>(
    State(state): State<AppState<S>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: state.sync.backend(),
    })
}
