//! Lookup of running matches by id.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use skirmish_core::config::MatchConfig;
use skirmish_core::protocol::MatchId;

use crate::error::{ServerError, ServerResult};
use crate::host::{MatchHandle, MatchHost};
use crate::ServerConfig;

/// Shared table of match handles.
#[derive(Debug, Clone, Default)]
pub struct MatchRegistry {
    matches: Arc<RwLock<HashMap<MatchId, MatchHandle>>>,
    server: ServerConfig,
}

impl MatchRegistry {
    /// Empty registry using default channel sizes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry creating hosts with `server` settings.
    #[must_use]
    pub fn with_server_config(server: ServerConfig) -> Self {
        Self {
            matches: Arc::default(),
            server,
        }
    }

    /// Create a host and register its handle.
    pub async fn create(&self, config: MatchConfig) -> (MatchHost, MatchHandle) {
        let (host, handle) = MatchHost::with_server_config(config, &self.server);
        self.register(handle.clone()).await;
        (host, handle)
    }

    /// Register a handle, replacing any previous one with the same id.
    pub async fn register(&self, handle: MatchHandle) {
        let match_id = handle.match_id();
        self.matches.write().await.insert(match_id, handle);
        tracing::debug!(%match_id, "Match registered");
    }

    /// Look up a match.
    ///
    /// # Errors
    ///
    /// [`ServerError::UnknownMatch`] if nothing is registered under `id`.
    pub async fn get(&self, id: MatchId) -> ServerResult<MatchHandle> {
        self.matches
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ServerError::UnknownMatch(id))
    }

    /// Unregister a match, returning its handle.
    pub async fn remove(&self, id: MatchId) -> Option<MatchHandle> {
        let removed = self.matches.write().await.remove(&id);
        if removed.is_some() {
            tracing::debug!(match_id = %id, "Match removed");
        }
        removed
    }

    /// Ids of every registered match, sorted.
    pub async fn ids(&self) -> Vec<MatchId> {
        let mut ids: Vec<MatchId> = self.matches.read().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered matches.
    pub async fn len(&self) -> usize {
        self.matches.read().await.len()
    }

    /// Whether no match is registered.
    pub async fn is_empty(&self) -> bool {
        self.matches.read().await.is_empty()
    }

    /// Ask every registered match to stop.
    pub async fn shutdown_all(&self) {
        for handle in self.matches.read().await.values() {
            handle.shutdown();
        }
    }
}
