// Analysis: remote scoring with a local fallback, driven by a small state machine.
// The remote call never runs under the dashboard lock (see engine::AnalysisJob).

pub mod client;
pub mod engine;
pub mod fallback;

use serde::{Deserialize, Serialize};

pub use client::{RemoteError, RemoteScorer, ScoringBackend};
pub use engine::{AnalysisEngine, AnalysisJob, AnalysisOutcome, AnalysisPhase};

/// Where a result came from. Fallback results are offline approximations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
}

impl Recommendation {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// A finished analysis. Scores are kept as received; the renderer clamps them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub ats_score: i64,
    pub keywords_match: i64,
    pub format_score: i64,
    pub experience_match: i64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub source: ResultSource,
}

/// Drops repeated entries, keeping the first occurrence.
pub(crate) fn dedup_ordered(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
