/// LLM Client: the single point of entry for generative-text API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// Callers depend on the `TextGenerator` trait so tests can swap in a fake.
///
/// The credential belongs to the user profile, not to the service, so it is
/// passed per call and sent as the `key` query parameter.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";
/// Transport-level ceiling. The fill engine itself never times out a call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Anything that turns a prompt into model text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

fn request_body(prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
    }
}

/// Gemini `generateContent` client. One request per call, no retries.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(endpoint: Option<String>) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            endpoint: endpoint.unwrap_or_else(|| GEMINI_API_URL.to_string()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Makes a raw call and returns the decoded response envelope.
    pub async fn call(&self, api_key: &str, prompt: &str) -> Result<GenerateResponse, LlmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        debug!(
            "Gemini call succeeded: {} candidate(s)",
            parsed.candidates.len()
        );
        Ok(parsed)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(api_key, prompt).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(request_body("hello")).unwrap();
        assert_eq!(body, json!({"contents": [{"parts": [{"text": "hello"}]}]}));
    }

    #[test]
    fn test_response_text_extraction() {
        let raw = r#"{"candidates": [{"content": {"parts": [{"text": "[]"}], "role": "model"}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text(), Some("[]"));
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"promptFeedback": {}}"#).unwrap();
        assert_eq!(parsed.text(), None);

        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert_eq!(parsed.text(), None);
    }

    #[test]
    fn test_default_endpoint() {
        let client = GeminiClient::new(None).unwrap();
        assert_eq!(client.endpoint(), GEMINI_API_URL);
        let client = GeminiClient::new(Some("http://localhost:9/gen".to_string())).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9/gen");
    }
}
