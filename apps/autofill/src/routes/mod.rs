pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::autofill::handlers as fill;
use crate::profile::handlers as profile;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Fill API
        .route("/api/v1/fill", post(fill::handle_fill))
        // Profile API
        .route(
            "/api/v1/profile",
            get(profile::handle_get_profile)
                .put(profile::handle_put_profile)
                .delete(profile::handle_delete_profile),
        )
        .route("/api/v1/profile/resume", post(profile::handle_parse_resume))
        .route(
            "/api/v1/settings",
            get(profile::handle_get_settings).put(profile::handle_put_settings),
        )
        .with_state(state)
}
