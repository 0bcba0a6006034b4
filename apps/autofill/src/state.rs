use std::sync::Arc;

use crate::llm_client::TextGenerator;
use crate::profile::store::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Profile and settings. Default: MemoryStore; RedisStore when REDIS_URL is set.
    pub store: Arc<dyn ProfileStore>,
    /// Generative-text backend for the AI fallback and resume import.
    pub generator: Arc<dyn TextGenerator>,
}
