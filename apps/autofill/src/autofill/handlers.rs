//! Axum route handler for the Fill API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::autofill::engine::{fill_form, FillOptions, FillReport};
use crate::dom::Document;
use crate::errors::AppError;
use crate::models::profile::{Profile, Settings};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FillRequest {
    /// Page or form markup to fill.
    pub html: String,
    /// Overrides the stored profile for this request only.
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub use_ai: Option<bool>,
    #[serde(default)]
    pub auto_fill: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct FillResponse {
    #[serde(flatten)]
    pub report: FillReport,
    pub events_dispatched: usize,
    /// The input markup with filled values written back.
    pub html: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/fill
///
/// Runs one fill pass over the submitted markup. Anything the request leaves
/// out (profile, switches) comes from the store.
pub async fn handle_fill(
    State(state): State<AppState>,
    Json(request): Json<FillRequest>,
) -> Result<Json<FillResponse>, AppError> {
    if request.html.trim().is_empty() {
        return Err(AppError::Validation("html cannot be empty".to_string()));
    }

    let needs_store =
        request.profile.is_none() || request.use_ai.is_none() || request.auto_fill.is_none();
    let entries = if needs_store {
        state.store.get_all().await?
    } else {
        Default::default()
    };

    let settings = Settings::from_entries(&entries);
    let options = FillOptions {
        auto_fill_enabled: request.auto_fill.unwrap_or(settings.auto_fill_enabled),
        use_ai: request.use_ai.unwrap_or(settings.use_ai_for_unknown_fields),
    };
    let profile = request
        .profile
        .unwrap_or_else(|| Profile::from_entries(&entries));

    let mut doc = Document::parse(&request.html);
    let report = fill_form(&mut doc, &profile, options, state.generator.as_ref()).await;
    info!(
        "Fill request done: {} filled, {} unknown, ai_attempted={}",
        report.fields.len(),
        report.unknown.len(),
        report.ai_attempted
    );

    Ok(Json(FillResponse {
        events_dispatched: doc.events().len(),
        html: doc.to_html(),
        report,
    }))
}
