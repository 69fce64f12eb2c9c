pub mod handlers;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Resumes are capped at 5 MiB by the upload state; the body limit leaves room for
/// multipart framing so oversize files reach that check instead of a bare 413.
const UPLOAD_BODY_LIMIT: usize = 8 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session
        .route("/api/session", get(handlers::handle_get_session))
        .route("/api/session/login", post(handlers::handle_login))
        .route("/api/session/signup", post(handlers::handle_signup))
        .route("/api/session/logout", post(handlers::handle_logout))
        .route(
            "/api/password-strength",
            post(handlers::handle_password_strength),
        )
        // Theme
        .route(
            "/api/theme",
            get(handlers::handle_get_theme).put(handlers::handle_set_theme),
        )
        .route("/api/theme/toggle", post(handlers::handle_toggle_theme))
        // Uploads
        .route("/api/uploads", get(handlers::handle_get_uploads))
        .route(
            "/api/uploads/resume",
            post(handlers::handle_upload_resume).delete(handlers::handle_clear_resume),
        )
        .route(
            "/api/uploads/job-text",
            axum::routing::put(handlers::handle_set_job_text),
        )
        .route(
            "/api/uploads/job-file",
            post(handlers::handle_upload_job_file),
        )
        // Analysis
        .route(
            "/api/analysis",
            get(handlers::handle_get_analysis).post(handlers::handle_run_analysis),
        )
        .route("/api/chat", post(handlers::handle_chat))
        .route("/api/report", get(handlers::handle_report))
        .route("/api/notices", get(handlers::handle_take_notices))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .with_state(state)
}
