//! Projection of an `AnalysisResult` into display values.
//! No business logic beyond clamping and formatting.

use serde::Serialize;

use crate::analysis::{AnalysisResult, Recommendation, ResultSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl ScoreBand {
    pub fn for_score(score: u8) -> Self {
        match score {
            80.. => ScoreBand::Excellent,
            60.. => ScoreBand::Good,
            _ => ScoreBand::NeedsImprovement,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::NeedsImprovement => "Needs Improvement",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedResult {
    pub ats_score: u8,
    pub band: ScoreBand,
    pub keywords_match: String,
    pub format_score: String,
    pub experience_match: String,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    /// True when the scoring service was unavailable and the result is an estimate.
    pub offline: bool,
}

pub fn clamp_score(score: i64) -> u8 {
    score.clamp(0, 100) as u8
}

fn percent(score: i64) -> String {
    format!("{}%", clamp_score(score))
}

pub fn render(result: &AnalysisResult) -> RenderedResult {
    let ats_score = clamp_score(result.ats_score);
    RenderedResult {
        ats_score,
        band: ScoreBand::for_score(ats_score),
        keywords_match: percent(result.keywords_match),
        format_score: percent(result.format_score),
        experience_match: percent(result.experience_match),
        matched_skills: result.matched_skills.clone(),
        missing_skills: result.missing_skills.clone(),
        recommendations: result.recommendations.clone(),
        offline: result.source == ResultSource::Fallback,
    }
}
