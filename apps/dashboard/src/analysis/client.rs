//! Scoring client: the only code that talks to `POST /api/analyze`.
//!
//! Any failure here (transport, status, payload shape) is a `RemoteError`.
//! Callers never surface it; the engine falls back instead.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::{dedup_ordered, AnalysisResult, Recommendation, ResultSource};
use crate::upload::FileRef;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Response has no numeric ats_score")]
    MissingScore,

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// A remote scorer. Implement this to swap the boundary in tests or for another API.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    async fn score(&self, resume: &FileRef, job_text: &str) -> Result<AnalysisResult, RemoteError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire format
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    ats_score: Option<Value>,
    keywords_match: Option<Value>,
    format_score: Option<Value>,
    experience_match: Option<Value>,
    #[serde(default)]
    matched_skills: Vec<String>,
    #[serde(default)]
    missing_skills: Vec<String>,
    #[serde(default)]
    recommendations: Vec<RawRecommendation>,
}

/// Recommendations arrive either structured or as `"Title - Description"` strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRecommendation {
    Structured {
        title: String,
        #[serde(default)]
        description: String,
    },
    Plain(String),
}

impl From<RawRecommendation> for Recommendation {
    fn from(raw: RawRecommendation) -> Self {
        match raw {
            RawRecommendation::Structured { title, description } => {
                Recommendation::new(title, description)
            }
            RawRecommendation::Plain(text) => match text.split_once(" - ") {
                Some((title, description)) => {
                    Recommendation::new(title.trim(), description.trim())
                }
                None => Recommendation::new(text.trim(), ""),
            },
        }
    }
}

/// Numbers are floored to integers; anything else is not a score.
fn numeric(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.floor() as i64))
}

fn optional_score(value: Option<&Value>) -> i64 {
    value.and_then(numeric).unwrap_or(0)
}

/// Normalizes a success body. A body without a numeric `ats_score` is rejected.
pub(crate) fn parse_analysis(body: &str) -> Result<AnalysisResult, RemoteError> {
    let raw: RawAnalysis = serde_json::from_str(body)?;
    let ats_score = raw
        .ats_score
        .as_ref()
        .and_then(numeric)
        .ok_or(RemoteError::MissingScore)?;

    Ok(AnalysisResult {
        ats_score,
        keywords_match: optional_score(raw.keywords_match.as_ref()),
        format_score: optional_score(raw.format_score.as_ref()),
        experience_match: optional_score(raw.experience_match.as_ref()),
        matched_skills: dedup_ordered(raw.matched_skills),
        missing_skills: dedup_ordered(raw.missing_skills),
        recommendations: raw.recommendations.into_iter().map(Into::into).collect(),
        source: ResultSource::Remote,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct RemoteScorer {
    client: Client,
    base_url: String,
}

impl RemoteScorer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ScoringBackend for RemoteScorer {
    async fn score(&self, resume: &FileRef, job_text: &str) -> Result<AnalysisResult, RemoteError> {
        let url = format!("{}/api/analyze", self.base_url);

        let resume_part = Part::bytes(resume.bytes.to_vec())
            .file_name(resume.name.clone())
            .mime_str(&resume.content_type)?;
        let form = Form::new()
            .part("resume", resume_part)
            .text("jobDescription", job_text.trim().to_string());

        debug!("POST {url} ({} resume bytes)", resume.size());
        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        parse_analysis(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::spawn_server;
    use crate::upload::MIME_PDF;
    use axum::{extract::Multipart, http::StatusCode, routing::post, Json, Router};
    use bytes::Bytes;
    use serde_json::json;

    #[test]
    fn test_parse_full_payload() {
        let body = r#"{
            "ats_score": 82,
            "keywords_match": 70,
            "format_score": 90.7,
            "experience_match": 75,
            "matched_skills": ["Python", "React", "Python"],
            "missing_skills": ["Docker"],
            "recommendations": [
                {"title": "Add Docker", "description": "Mention container work."},
                "Quantify Achievements - Add numbers to bullets",
                "Tighten summary"
            ]
        }"#;

        let result = parse_analysis(body).unwrap();
        assert_eq!(result.ats_score, 82);
        assert_eq!(result.format_score, 90);
        assert_eq!(result.matched_skills, vec!["Python", "React"]);
        assert_eq!(result.missing_skills, vec!["Docker"]);
        assert_eq!(
            result.recommendations,
            vec![
                Recommendation::new("Add Docker", "Mention container work."),
                Recommendation::new("Quantify Achievements", "Add numbers to bullets"),
                Recommendation::new("Tighten summary", ""),
            ]
        );
        assert_eq!(result.source, ResultSource::Remote);
    }

    #[test]
    fn test_parse_minimal_payload_defaults_to_zero() {
        // The shape the reference backend actually returns.
        let body = r#"{"ats_score": 50, "matched_skills": [], "missing_skills": ["SQL"]}"#;
        let result = parse_analysis(body).unwrap();
        assert_eq!(result.ats_score, 50);
        assert_eq!(result.keywords_match, 0);
        assert_eq!(result.format_score, 0);
        assert_eq!(result.experience_match, 0);
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_parse_non_numeric_optional_score_is_zero() {
        let result = parse_analysis(r#"{"ats_score": 60, "keywords_match": "high"}"#).unwrap();
        assert_eq!(result.keywords_match, 0);
    }

    #[test]
    fn test_parse_missing_ats_score_is_failure() {
        assert!(matches!(
            parse_analysis(r#"{"matched_skills": ["Python"]}"#),
            Err(RemoteError::MissingScore)
        ));
        assert!(matches!(
            parse_analysis(r#"{"ats_score": "eighty"}"#),
            Err(RemoteError::MissingScore)
        ));
    }

    #[test]
    fn test_parse_non_json_is_failure() {
        assert!(matches!(
            parse_analysis("<html>502</html>"),
            Err(RemoteError::Parse(_))
        ));
    }

    fn resume() -> FileRef {
        FileRef::new("resume.pdf", MIME_PDF, Bytes::from_static(b"%PDF-1.4 fake"))
    }

    /// Echoes the multipart fields back so the request shape can be asserted.
    async fn echo_analyze(mut multipart: Multipart) -> Json<serde_json::Value> {
        let mut resume_name = String::new();
        let mut resume_len = 0;
        let mut job = String::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            match field.name() {
                Some("resume") => {
                    resume_name = field.file_name().unwrap_or_default().to_string();
                    resume_len = field.bytes().await.unwrap().len();
                }
                Some("jobDescription") => job = field.text().await.unwrap(),
                _ => {}
            }
        }
        Json(json!({
            "ats_score": 77,
            "matched_skills": [resume_name],
            "missing_skills": [job],
            "keywords_match": resume_len,
        }))
    }

    #[tokio::test]
    async fn test_remote_scorer_sends_multipart_fields() {
        let base = spawn_server(Router::new().route("/api/analyze", post(echo_analyze))).await;
        let scorer = RemoteScorer::new(base);

        let result = scorer.score(&resume(), "  Rust engineer \n").await.unwrap();
        assert_eq!(result.ats_score, 77);
        assert_eq!(result.matched_skills, vec!["resume.pdf"]);
        assert_eq!(result.missing_skills, vec!["Rust engineer"]);
        assert_eq!(result.keywords_match, 13);
    }

    async fn server_error() -> (StatusCode, &'static str) {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom")
    }

    #[tokio::test]
    async fn test_remote_scorer_non_success_status() {
        let base = spawn_server(Router::new().route("/api/analyze", post(server_error))).await;
        let err = RemoteScorer::new(base)
            .score(&resume(), "Rust")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Api { status: 500, ref message } if message == "boom"));
    }
}
