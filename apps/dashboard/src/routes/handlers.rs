//! Axum route handlers. Each one is a thin adapter over a `Dashboard` action.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisPhase;
use crate::dashboard::Notice;
use crate::errors::AppError;
use crate::render::{render, RenderedResult};
use crate::report::report_file_name;
use crate::session::Identity;
use crate::state::AppState;
use crate::theme::Theme;
use crate::upload::{FileRef, UploadSummary};
use crate::validation::{password_strength, PasswordStrength};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    /// First word of the display name, for the header greeting.
    pub welcome_name: Option<String>,
    pub identity: Option<Identity>,
}

impl SessionResponse {
    fn new(identity: Option<Identity>) -> Self {
        Self {
            authenticated: identity.is_some(),
            welcome_name: identity.as_ref().map(|i| i.first_name().to_string()),
            identity,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThemeBody {
    pub theme: Theme,
}

#[derive(Debug, Deserialize)]
pub struct JobTextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub phase: AnalysisPhase,
    pub result: Option<RenderedResult>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Session
// ────────────────────────────────────────────────────────────────────────────

async fn session_snapshot(state: &AppState) -> SessionResponse {
    let dashboard = state.dashboard.lock().await;
    SessionResponse::new(dashboard.session().identity().cloned())
}

/// GET /api/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(session_snapshot(&state).await)
}

/// POST /api/session/login
///
/// The identity provider is called between two short lock sections, so a slow
/// provider never stalls other dashboard actions.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let attempt = state
        .dashboard
        .lock()
        .await
        .begin_login(&req.email, &req.password)?;
    let outcome = attempt.execute().await;
    let identity = state.dashboard.lock().await.finish_login(outcome).await?;
    Ok(Json(SessionResponse::new(Some(identity))))
}

/// POST /api/session/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let attempt = state
        .dashboard
        .lock()
        .await
        .begin_signup(&req.name, &req.email, &req.password)?;
    let outcome = attempt.execute().await;
    let identity = state.dashboard.lock().await.finish_signup(outcome).await?;
    Ok(Json(SessionResponse::new(Some(identity))))
}

/// POST /api/session/logout
pub async fn handle_logout(State(state): State<AppState>) -> Json<SessionResponse> {
    state.dashboard.lock().await.logout().await;
    Json(session_snapshot(&state).await)
}

/// POST /api/password-strength
///
/// Live strength meter for the signup form.
pub async fn handle_password_strength(Json(req): Json<PasswordRequest>) -> Json<PasswordStrength> {
    Json(password_strength(&req.password))
}

// ────────────────────────────────────────────────────────────────────────────
// Theme
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/theme
pub async fn handle_get_theme(State(state): State<AppState>) -> Json<ThemeBody> {
    let theme = state.dashboard.lock().await.theme();
    Json(ThemeBody { theme })
}

/// PUT /api/theme
pub async fn handle_set_theme(
    State(state): State<AppState>,
    Json(body): Json<ThemeBody>,
) -> Json<ThemeBody> {
    let theme = state.dashboard.lock().await.set_theme(body.theme).await;
    Json(ThemeBody { theme })
}

/// POST /api/theme/toggle
pub async fn handle_toggle_theme(State(state): State<AppState>) -> Json<ThemeBody> {
    let theme = state.dashboard.lock().await.toggle_theme().await;
    Json(ThemeBody { theme })
}

// ────────────────────────────────────────────────────────────────────────────
// Uploads
// ────────────────────────────────────────────────────────────────────────────

/// Reads the first multipart field named `field_name` into a `FileRef`.
async fn read_file_field(mut multipart: Multipart, field_name: &str) -> Result<FileRef, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let name = field.file_name().unwrap_or(field_name).to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?;
        return Ok(FileRef::new(name, content_type, bytes));
    }
    Err(AppError::Validation(format!(
        "Missing '{field_name}' file field"
    )))
}

/// GET /api/uploads
pub async fn handle_get_uploads(State(state): State<AppState>) -> Json<UploadSummary> {
    Json(state.dashboard.lock().await.uploads().summary())
}

/// POST /api/uploads/resume (multipart field `resume`)
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadSummary>, AppError> {
    let file = read_file_field(multipart, "resume").await?;
    let mut dashboard = state.dashboard.lock().await;
    dashboard.set_resume(file)?;
    Ok(Json(dashboard.uploads().summary()))
}

/// DELETE /api/uploads/resume
pub async fn handle_clear_resume(State(state): State<AppState>) -> Json<UploadSummary> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.clear_resume();
    Json(dashboard.uploads().summary())
}

/// PUT /api/uploads/job-text
pub async fn handle_set_job_text(
    State(state): State<AppState>,
    Json(req): Json<JobTextRequest>,
) -> Json<UploadSummary> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.set_job_text(req.text);
    Json(dashboard.uploads().summary())
}

/// POST /api/uploads/job-file (multipart field `job`)
///
/// The body is fully read before the dashboard is locked, so a slow upload never
/// blocks other actions; the lock then serializes competing drops.
pub async fn handle_upload_job_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadSummary>, AppError> {
    let file = read_file_field(multipart, "job").await?;
    let mut dashboard = state.dashboard.lock().await;
    dashboard.set_job_text_from_file(&file);
    Ok(Json(dashboard.uploads().summary()))
}

// ────────────────────────────────────────────────────────────────────────────
// Analysis
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/analysis
///
/// Runs in a spawned task so a disconnecting client cannot strand the engine in
/// `Running`. The dashboard lock is released while the scoring request is in flight.
pub async fn handle_run_analysis(
    State(state): State<AppState>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let dashboard = state.dashboard.clone();
    let task = tokio::spawn(async move {
        let job = dashboard.lock().await.begin_analysis()?;
        let outcome = job.execute().await;
        let mut dashboard = dashboard.lock().await;
        let result = dashboard.finish_analysis(&outcome);
        Ok::<_, AppError>(AnalysisResponse {
            phase: dashboard.analysis().phase(),
            result: Some(render(&result)),
        })
    });

    let response = task.await.map_err(|e| AppError::Internal(e.into()))??;
    Ok(Json(response))
}

/// GET /api/analysis
pub async fn handle_get_analysis(State(state): State<AppState>) -> Json<AnalysisResponse> {
    let dashboard = state.dashboard.lock().await;
    Json(AnalysisResponse {
        phase: dashboard.analysis().phase(),
        result: dashboard.analysis().last_result().map(render),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Chat, report, notices
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let reply = state.dashboard.lock().await.chat(&req.message);
    Json(ChatResponse { reply })
}

/// GET /api/report
pub async fn handle_report(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let report = state.dashboard.lock().await.export_report()?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        report_file_name(chrono::Utc::now())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report,
    ))
}

/// GET /api/notices
///
/// Drains queued notices; each one is delivered once.
pub async fn handle_take_notices(State(state): State<AppState>) -> Json<Vec<Notice>> {
    Json(state.dashboard.lock().await.take_notices())
}
