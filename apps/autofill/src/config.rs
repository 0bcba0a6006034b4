use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Nothing is required: without `REDIS_URL` the profile lives in memory.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub redis_url: Option<String>,
    /// Overrides the Gemini `generateContent` URL, e.g. for a proxy.
    pub gemini_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            redis_url: optional_env("REDIS_URL"),
            gemini_endpoint: optional_env("GEMINI_ENDPOINT"),
        })
    }
}

/// Unset and blank both mean "not configured".
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
