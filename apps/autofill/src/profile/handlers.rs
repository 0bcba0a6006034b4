//! Axum route handlers for the Profile API.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::errors::AppError;
use crate::models::profile::{Profile, Settings};
use crate::profile::resume::{extract_resume_text, parse_resume};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ProfileStatus {
    pub complete: bool,
    pub has_api_key: bool,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub settings: Settings,
    pub status: ProfileStatus,
}

impl ProfileResponse {
    fn from_entries(entries: &Map<String, Value>) -> Self {
        let profile = Profile::from_entries(entries);
        let status = ProfileStatus {
            complete: profile.is_complete(),
            has_api_key: profile.api_key().is_some(),
        };
        Self {
            profile: profile.redacted(),
            settings: Settings::from_entries(entries),
            status,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SettingsUpdate {
    #[serde(rename = "autoFillEnabled")]
    pub auto_fill_enabled: Option<bool>,
    #[serde(rename = "useAIForUnknownFields")]
    pub use_ai_for_unknown_fields: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ResumePreviewResponse {
    pub profile: Profile,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/profile
///
/// Stored profile with the API key removed, plus settings and a status summary.
pub async fn handle_get_profile(
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, AppError> {
    let entries = state.store.get_all().await?;
    Ok(Json(ProfileResponse::from_entries(&entries)))
}

/// PUT /api/v1/profile
///
/// Merges the given profile keys into the store. Keys absent from the body
/// are left as they are; keys that are not profile fields are ignored.
pub async fn handle_put_profile(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<ProfileResponse>, AppError> {
    let parsed: Profile = serde_json::from_value(Value::Object(body.clone()))
        .map_err(|e| AppError::Validation(format!("Invalid profile: {e}")))?;

    let updates: Map<String, Value> = parsed
        .to_entries()
        .into_iter()
        .filter(|(key, _)| body.contains_key(key))
        .collect();
    info!("Updating {} profile key(s)", updates.len());
    state.store.set(updates).await?;

    let entries = state.store.get_all().await?;
    Ok(Json(ProfileResponse::from_entries(&entries)))
}

/// DELETE /api/v1/profile
///
/// Clears the profile and settings.
pub async fn handle_delete_profile(
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.store.clear().await?;
    info!("Profile cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/settings
pub async fn handle_get_settings(
    State(state): State<AppState>,
) -> Result<Json<Settings>, AppError> {
    let entries = state.store.get_all().await?;
    Ok(Json(Settings::from_entries(&entries)))
}

/// PUT /api/v1/settings
///
/// Switches omitted from the body keep their stored value.
pub async fn handle_put_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<Settings>, AppError> {
    let current = Settings::from_entries(&state.store.get_all().await?);
    let settings = Settings {
        auto_fill_enabled: update.auto_fill_enabled.unwrap_or(current.auto_fill_enabled),
        use_ai_for_unknown_fields: update
            .use_ai_for_unknown_fields
            .unwrap_or(current.use_ai_for_unknown_fields),
    };
    state.store.set(settings.to_entries()).await?;
    Ok(Json(settings))
}

/// POST /api/v1/profile/resume
///
/// Multipart upload: `resume` (file) and an optional `api_key`; the stored
/// key is used when none is sent. Returns a preview that is NOT saved.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumePreviewResponse>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut api_key: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read resume: {e}")))?;
                upload = Some((content_type, bytes.to_vec()));
            }
            "api_key" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read api_key: {e}")))?;
                api_key = Some(text.trim().to_string()).filter(|k| !k.is_empty());
            }
            _ => {}
        }
    }

    let api_key = match api_key {
        Some(key) => Some(key),
        None => {
            let stored = Profile::from_entries(&state.store.get_all().await?);
            stored.api_key().map(str::to_string)
        }
    };

    let ((content_type, bytes), api_key) = match (upload, api_key) {
        (Some(upload), Some(key)) => (upload, key),
        _ => {
            return Err(AppError::Validation(
                "Please upload a resume and enter your Gemini API key".to_string(),
            ))
        }
    };

    let text = extract_resume_text(&content_type, &bytes)?;
    let profile = parse_resume(&text, &api_key, state.generator.as_ref()).await?;

    Ok(Json(ResumePreviewResponse { profile }))
}
