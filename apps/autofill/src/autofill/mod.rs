// Form autofill engine.
// Implements: descriptor extraction, rule-based classification, fill execution,
// unknown-field collection and the AI fallback. All model calls go through
// llm_client::TextGenerator, never reqwest directly.

pub mod classifier;
pub mod descriptor;
pub mod engine;
pub mod executor;
pub mod handlers;
pub mod prompts;
pub mod resolver;
pub mod suggestions;
