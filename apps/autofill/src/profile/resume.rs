//! Resume Import: turns an uploaded resume into a profile preview.
//!
//! Text extraction is a stub: bytes are decoded as lossy UTF-8 regardless of
//! container format. The structured profile comes from one model call.

use tracing::{info, warn};

use crate::autofill::suggestions::extract_json_object;
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::models::profile::Profile;
use crate::profile::prompts::build_resume_prompt;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub const ACCEPTED_RESUME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    DOCX_MIME,
    "text/plain",
];

/// Decodes the uploaded bytes if the MIME type is one we accept.
pub fn extract_resume_text(content_type: &str, bytes: &[u8]) -> Result<String, AppError> {
    // "text/plain; charset=utf-8" counts as text/plain
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if !ACCEPTED_RESUME_TYPES.contains(&essence.as_str()) {
        return Err(AppError::Validation(
            "Please upload a PDF or Word document".to_string(),
        ));
    }

    let text = String::from_utf8_lossy(bytes).into_owned();
    if text.trim().is_empty() {
        return Err(AppError::Validation("Resume file is empty".to_string()));
    }
    Ok(text)
}

/// Asks the model for a profile object and decodes it. Unlike the fill path,
/// every failure here is returned to the caller.
pub async fn parse_resume(
    resume_text: &str,
    api_key: &str,
    generator: &dyn TextGenerator,
) -> Result<Profile, AppError> {
    let prompt = build_resume_prompt(resume_text);
    let reply = generator
        .generate(api_key, &prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Failed to parse resume with Gemini API: {e}")))?;

    let json = extract_json_object(&reply).ok_or_else(|| {
        warn!("Resume reply contained no JSON object");
        AppError::UnprocessableEntity("Failed to parse JSON from API response".to_string())
    })?;

    let mut profile: Profile = serde_json::from_str(json).map_err(|e| {
        AppError::UnprocessableEntity(format!("Resume JSON did not match the profile shape: {e}"))
    })?;
    // never trust a credential echoed back by the model
    profile.gemini_api_key = None;

    info!(
        "Parsed resume: {} education, {} experience, {} skill(s)",
        profile.education.len(),
        profile.experience.len(),
        profile.skills.len()
    );
    Ok(profile)
}
