mod autofill;
mod config;
mod dom;
mod errors;
mod llm_client;
mod models;
mod profile;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::profile::store::{MemoryStore, ProfileStore, RedisStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Autofill API v{}", env!("CARGO_PKG_VERSION"));

    // Profile store: Redis when configured, otherwise process memory
    let store: Arc<dyn ProfileStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Profile store: Redis");
            Arc::new(RedisStore::new(client))
        }
        None => {
            info!("Profile store: in-memory (set REDIS_URL to persist)");
            Arc::new(MemoryStore::new())
        }
    };

    // Initialize generative-text client
    let gemini = GeminiClient::new(config.gemini_endpoint.clone())?;
    info!("Gemini client initialized (endpoint: {})", gemini.endpoint());

    let state = AppState {
        store,
        generator: Arc::new(gemini),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict to the extension's origin once its id is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
