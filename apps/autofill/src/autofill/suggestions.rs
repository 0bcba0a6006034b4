//! Pulling structured JSON out of free-form model output.
//!
//! Models wrap JSON in prose or code fences no matter what the prompt says.
//! These helpers scrape it out with two patterns: a ```` ```json ```` fence
//! first, then the widest bracketed span. Nothing here touches the network.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\n(.*?)\n```").expect("fence pattern must compile"));
static BARE_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\[\s*\{.*\}\s*\]").expect("array pattern must compile"));
static BARE_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("object pattern must compile"));

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no JSON found in model output")]
    NotFound,

    #[error("malformed JSON in model output: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// An AI-proposed value for one unknown field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub identifier: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
struct RawSuggestion {
    identifier: String,
    #[serde(default)]
    value: Value,
}

/// Fenced block if present, else the widest `[ { ... } ]` span.
pub fn extract_json_array(text: &str) -> Option<&str> {
    extract_with(text, &BARE_ARRAY)
}

/// Fenced block if present, else the widest `{ ... }` span.
pub fn extract_json_object(text: &str) -> Option<&str> {
    extract_with(text, &BARE_OBJECT)
}

fn extract_with<'a>(text: &'a str, fallback: &Regex) -> Option<&'a str> {
    if let Some(inner) = FENCED_JSON.captures(text).and_then(|c| c.get(1)) {
        return Some(inner.as_str());
    }
    fallback.find(text).map(|m| m.as_str())
}

/// Parses `{identifier, value}` suggestions out of raw model text.
///
/// Non-string values are rendered as JSON text; `null` values are dropped.
pub fn parse_suggestions(text: &str) -> Result<Vec<Suggestion>, ExtractError> {
    let json = extract_json_array(text).ok_or(ExtractError::NotFound)?;
    let raw: Vec<RawSuggestion> = serde_json::from_str(json)?;

    Ok(raw
        .into_iter()
        .filter_map(|s| {
            let value = match s.value {
                Value::Null => return None,
                Value::String(v) => v,
                other => other.to_string(),
            };
            Some(Suggestion {
                identifier: s.identifier,
                value,
            })
        })
        .collect())
}
