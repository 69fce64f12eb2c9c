//! Offline fallback: an approximate result built from the job text alone.
//!
//! Algorithm:
//! 1. required = vocabulary entries that occur (case-insensitive substring) in the
//!    job text, in vocabulary order, capped at `MAX_REQUIRED_SKILLS`.
//! 2. The resume is never inspected; the first `ASSUMED_RESUME_SKILLS` vocabulary
//!    entries stand in for the candidate's skills.
//! 3. matched = required ∩ assumed, missing = required − assumed (both in required order).
//! 4. ats = 60 + ⌊40 · matched / required⌋, exactly 60 when nothing is required.

use rand::Rng;

use super::{AnalysisResult, Recommendation, ResultSource};

pub const SKILL_VOCABULARY: [&str; 26] = [
    "JavaScript",
    "Python",
    "Java",
    "React",
    "Node.js",
    "SQL",
    "HTML",
    "CSS",
    "Git",
    "TypeScript",
    "MongoDB",
    "Express",
    "AWS",
    "Docker",
    "Kubernetes",
    "Angular",
    "Vue.js",
    "Django",
    "Flask",
    "PostgreSQL",
    "MySQL",
    "GraphQL",
    "REST API",
    "Machine Learning",
    "C++",
    "Agile",
];

pub const MAX_REQUIRED_SKILLS: usize = 8;
pub const ASSUMED_RESUME_SKILLS: usize = 12;

const BASE_ATS_SCORE: i64 = 60;
const ATS_SCORE_SPAN: i64 = 40;

/// Vocabulary entries mentioned in the job text, in vocabulary order.
pub fn required_skills(job_text: &str) -> Vec<&'static str> {
    let job_lower = job_text.to_lowercase();
    SKILL_VOCABULARY
        .iter()
        .copied()
        .filter(|skill| job_lower.contains(&skill.to_lowercase()))
        .take(MAX_REQUIRED_SKILLS)
        .collect()
}

fn assumed_resume_skills() -> &'static [&'static str] {
    &SKILL_VOCABULARY[..ASSUMED_RESUME_SKILLS]
}

/// Builds the fallback result. `format_score` is the only random field (85..=94).
pub fn synthesize<R: Rng>(job_text: &str, rng: &mut R) -> AnalysisResult {
    let required = required_skills(job_text);
    let assumed = assumed_resume_skills();

    let (matched, missing): (Vec<&str>, Vec<&str>) =
        required.iter().copied().partition(|skill| assumed.contains(skill));

    let ats_score = if required.is_empty() {
        BASE_ATS_SCORE
    } else {
        BASE_ATS_SCORE + (matched.len() as i64 * ATS_SCORE_SPAN) / required.len() as i64
    };

    let mut recommendations = Vec::with_capacity(3);
    if let Some(first_missing) = missing.first() {
        recommendations.push(Recommendation::new(
            format!("Learn {first_missing}"),
            format!(
                "{first_missing} appears in the job description but not in your resume. \
                 Consider building experience with it."
            ),
        ));
    }
    recommendations.push(Recommendation::new(
        "Improve Keyword Optimization",
        "Mirror the exact terminology of the job description in your summary and experience sections.",
    ));
    recommendations.push(Recommendation::new(
        "Quantify Achievements",
        "Add concrete numbers to your accomplishments, such as percentages or time saved.",
    ));

    AnalysisResult {
        ats_score,
        keywords_match: ats_score * 8 / 10,
        format_score: rng.random_range(85..95),
        experience_match: ats_score * 9 / 10,
        matched_skills: matched.into_iter().map(String::from).collect(),
        missing_skills: missing.into_iter().map(String::from).collect(),
        recommendations,
        source: ResultSource::Fallback,
    }
}
