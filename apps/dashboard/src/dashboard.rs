//! The top-level controller. Owns every piece of UI state and the notice queue.
//!
//! There are no globals: the server wraps one `Dashboard` in a mutex, and each action
//! locks it for the duration of the state change. Analysis is the exception; its
//! network call happens between `begin_analysis` and `finish_analysis`, outside the lock.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use crate::analysis::{AnalysisEngine, AnalysisJob, AnalysisOutcome, AnalysisResult, ScoringBackend};
use crate::chat;
use crate::errors::AppError;
use crate::report::export_report;
use crate::session::{AuthAttempt, AuthProvider, Identity, SessionStore};
use crate::storage::KeyValueStore;
use crate::theme::{Theme, ThemeStore};
use crate::upload::{FileRef, UploadState};

/// Older notices are dropped once a client has left this many unread.
const MAX_PENDING_NOTICES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// A transient user-facing message, drained by `GET /api/notices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

pub struct Dashboard {
    session: SessionStore,
    theme: ThemeStore,
    uploads: UploadState,
    analysis: AnalysisEngine,
    notices: VecDeque<Notice>,
}

impl Dashboard {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn KeyValueStore>,
        scorer: Arc<dyn ScoringBackend>,
        analyze_timeout: Duration,
    ) -> Self {
        Self {
            session: SessionStore::new(auth, store.clone()),
            theme: ThemeStore::new(store),
            uploads: UploadState::new(),
            analysis: AnalysisEngine::new(scorer, analyze_timeout),
            notices: VecDeque::new(),
        }
    }

    /// Startup: restore the persisted identity and theme.
    pub async fn restore(&mut self) {
        self.session.restore_session().await;
        self.theme.restore().await;
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn uploads(&self) -> &UploadState {
        &self.uploads
    }

    pub fn analysis(&self) -> &AnalysisEngine {
        &self.analysis
    }

    pub fn theme(&self) -> Theme {
        self.theme.theme()
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        if self.notices.len() == MAX_PENDING_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            level,
            message: message.into(),
        });
    }

    /// Surfaces a failed action as an error notice and hands the error back.
    fn fail<T>(&mut self, err: AppError) -> Result<T, AppError> {
        self.notify(NoticeLevel::Error, err.to_string());
        Err(err)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    // ── Session ───────────────────────────────────────────────────────────────

    pub fn begin_login(&mut self, email: &str, password: &str) -> Result<AuthAttempt, AppError> {
        match self.session.begin_login(email, password) {
            Ok(attempt) => Ok(attempt),
            Err(e) => self.fail(e),
        }
    }

    pub fn begin_signup(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthAttempt, AppError> {
        match self.session.begin_signup(name, email, password) {
            Ok(attempt) => Ok(attempt),
            Err(e) => self.fail(e),
        }
    }

    /// Takes the result of `AuthAttempt::execute`, which runs outside the dashboard lock.
    pub async fn finish_login(
        &mut self,
        attempt: Result<Identity, AppError>,
    ) -> Result<Identity, AppError> {
        self.finish_auth(attempt, "Welcome back!").await
    }

    pub async fn finish_signup(
        &mut self,
        attempt: Result<Identity, AppError>,
    ) -> Result<Identity, AppError> {
        self.finish_auth(attempt, "Account created successfully!").await
    }

    async fn finish_auth(
        &mut self,
        attempt: Result<Identity, AppError>,
        success: &str,
    ) -> Result<Identity, AppError> {
        let established = match attempt {
            Ok(identity) => self.session.establish(identity).await,
            Err(e) => Err(e),
        };
        match established {
            Ok(identity) => {
                self.notify(NoticeLevel::Success, success);
                Ok(identity)
            }
            Err(e) => self.fail(e),
        }
    }

    pub async fn logout(&mut self) {
        self.session.logout().await;
        self.notify(NoticeLevel::Success, "Logged out successfully");
    }

    // ── Theme ─────────────────────────────────────────────────────────────────

    pub async fn set_theme(&mut self, theme: Theme) -> Theme {
        self.theme.set_theme(theme).await
    }

    pub async fn toggle_theme(&mut self) -> Theme {
        self.theme.toggle().await
    }

    // ── Uploads ───────────────────────────────────────────────────────────────

    pub fn set_resume(&mut self, file: FileRef) -> Result<(), AppError> {
        match self.uploads.set_resume(file) {
            Ok(_) => {
                self.notify(NoticeLevel::Success, "Resume uploaded successfully!");
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn clear_resume(&mut self) {
        self.uploads.clear_resume();
    }

    pub fn set_job_text(&mut self, text: impl Into<String>) {
        self.uploads.set_job_text(text);
    }

    pub fn set_job_text_from_file(&mut self, file: &FileRef) {
        self.uploads.set_job_text_from_file(file);
        self.notify(NoticeLevel::Success, "Job description loaded successfully!");
    }

    // ── Analysis ──────────────────────────────────────────────────────────────

    pub fn begin_analysis(&mut self) -> Result<AnalysisJob, AppError> {
        match self.analysis.begin(&self.uploads) {
            Ok(job) => Ok(job),
            Err(e) => self.fail(e),
        }
    }

    pub fn finish_analysis(&mut self, outcome: &AnalysisOutcome) -> AnalysisResult {
        let result = self.analysis.finish(outcome).clone();
        if outcome.is_fallback() {
            self.notify(
                NoticeLevel::Info,
                "Scoring service unavailable. Showing an offline estimate.",
            );
        } else {
            self.notify(NoticeLevel::Success, "Analysis completed successfully!");
        }
        result
    }

    // ── Chat & report ─────────────────────────────────────────────────────────

    pub fn chat(&self, message: &str) -> &'static str {
        chat::respond(message)
    }

    pub fn export_report(&mut self) -> Result<String, AppError> {
        match export_report(
            self.analysis.last_result(),
            self.session.identity(),
            Utc::now(),
        ) {
            Ok(report) => Ok(report),
            Err(e) => self.fail(e),
        }
    }
}
