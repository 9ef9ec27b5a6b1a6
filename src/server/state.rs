use crate::server::config::ServerConfig;
use crate::store::{BookmarkStore, InMemoryStore};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Bookmark store (shared across requests)
    pub store: Arc<dyn BookmarkStore>,
}

impl ServerState {
    /// Create new server state backed by an empty in-memory store
    pub fn new(config: ServerConfig) -> Self {
        Self::with_store(config, Arc::new(InMemoryStore::new()))
    }

    /// Create server state around an existing store
    pub fn with_store(config: ServerConfig, store: Arc<dyn BookmarkStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// Check a presented token against the configured one.
    ///
    /// An empty configured token never matches.
    pub fn is_valid_token(&self, token: &str) -> bool {
        let expected = self.config.api_token.as_bytes();
        !expected.is_empty() && bool::from(expected.ct_eq(token.as_bytes()))
    }

    /// Canonical URL of a bookmark.
    ///
    /// Uses `public_url` when configured, otherwise the request's `Host`
    /// header, otherwise a path relative to the server root.
    pub fn location_for(&self, id: &str, host: Option<&str>) -> String {
        let base = match (&self.config.public_url, host) {
            (Some(base), _) => base.trim_end_matches('/').to_string(),
            (None, Some(host)) => format!("http://{host}"),
            (None, None) => String::new(),
        };
        format!("{base}/bookmarks/{id}")
    }
}
