//! Analysis state machine: `Idle → Running → {Succeeded, FailedOver}`.
//!
//! One invocation is split in three so the remote call never holds the dashboard lock:
//! - `AnalysisEngine::begin` checks readiness, rejects re-entry, snapshots the inputs.
//! - `AnalysisJob::execute` runs the remote attempt, then the fallback if it failed.
//! - `AnalysisEngine::finish` stores the outcome as the last result.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use super::client::{RemoteError, ScoringBackend};
use super::{fallback, AnalysisResult};
use crate::errors::AppError;
use crate::upload::{FileRef, UploadState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPhase {
    Idle,
    Running,
    Succeeded,
    FailedOver,
}

/// Inputs captured at `begin`. Later upload edits do not affect a running job.
pub struct AnalysisJob {
    resume: FileRef,
    job_text: String,
    scorer: Arc<dyn ScoringBackend>,
    timeout: Duration,
}

#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Remote(AnalysisResult),
    FellBack {
        result: AnalysisResult,
        reason: String,
    },
}

impl AnalysisOutcome {
    pub fn result(&self) -> &AnalysisResult {
        match self {
            AnalysisOutcome::Remote(result) => result,
            AnalysisOutcome::FellBack { result, .. } => result,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, AnalysisOutcome::FellBack { .. })
    }
}

impl AnalysisJob {
    /// Always produces a result. Remote failures are downgraded to the fallback here.
    pub async fn execute(self) -> AnalysisOutcome {
        let job_text = self.job_text.trim();
        let attempt = tokio::time::timeout(self.timeout, self.scorer.score(&self.resume, job_text))
            .await
            .unwrap_or(Err(RemoteError::Timeout(self.timeout)));

        match attempt {
            Ok(result) => AnalysisOutcome::Remote(result),
            Err(e) => {
                warn!("Remote analysis failed, using offline fallback: {e}");
                AnalysisOutcome::FellBack {
                    result: fallback::synthesize(job_text, &mut rand::rng()),
                    reason: e.to_string(),
                }
            }
        }
    }
}

pub struct AnalysisEngine {
    phase: AnalysisPhase,
    last_result: Option<AnalysisResult>,
    scorer: Arc<dyn ScoringBackend>,
    timeout: Duration,
}

impl AnalysisEngine {
    pub fn new(scorer: Arc<dyn ScoringBackend>, timeout: Duration) -> Self {
        Self {
            phase: AnalysisPhase::Idle,
            last_result: None,
            scorer,
            timeout,
        }
    }

    pub fn phase(&self) -> AnalysisPhase {
        self.phase
    }

    pub fn last_result(&self) -> Option<&AnalysisResult> {
        self.last_result.as_ref()
    }

    /// Fails fast with `NotReady` or `Busy`, leaving the phase untouched.
    pub fn begin(&mut self, uploads: &UploadState) -> Result<AnalysisJob, AppError> {
        if self.phase == AnalysisPhase::Running {
            return Err(AppError::Busy);
        }
        let resume = match uploads.resume() {
            Some(resume) if uploads.is_ready_to_analyze() => resume.clone(),
            _ => return Err(AppError::NotReady),
        };

        self.phase = AnalysisPhase::Running;
        info!("Analysis started for {}", resume.name);

        Ok(AnalysisJob {
            resume,
            job_text: uploads.job_text().to_string(),
            scorer: self.scorer.clone(),
            timeout: self.timeout,
        })
    }

    pub fn finish(&mut self, outcome: &AnalysisOutcome) -> &AnalysisResult {
        self.phase = if outcome.is_fallback() {
            AnalysisPhase::FailedOver
        } else {
            AnalysisPhase::Succeeded
        };
        match outcome {
            AnalysisOutcome::Remote(result) => {
                info!("Analysis finished remotely: ats_score={}", result.ats_score)
            }
            AnalysisOutcome::FellBack { result, reason } => info!(
                "Analysis finished offline: ats_score={} reason={reason}",
                result.ats_score
            ),
        }
        self.last_result.insert(outcome.result().clone())
    }
}
