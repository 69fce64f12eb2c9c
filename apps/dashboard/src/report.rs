//! Plain-text analysis report for download.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::analysis::AnalysisResult;
use crate::errors::AppError;
use crate::render::render;
use crate::session::Identity;

/// Renders the last result for `identity` (or a guest). Fails when nothing was analyzed yet.
pub fn export_report(
    result: Option<&AnalysisResult>,
    identity: Option<&Identity>,
    generated_at: DateTime<Utc>,
) -> Result<String, AppError> {
    let result = result.ok_or(AppError::NoResultAvailable)?;
    let view = render(result);
    let candidate = identity.map(|i| i.name.as_str()).unwrap_or("Guest");

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "RESUME ANALYSIS REPORT");
    let _ = writeln!(out, "======================");
    let _ = writeln!(out, "Candidate: {candidate}");
    let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M UTC"));
    if view.offline {
        let _ = writeln!(out, "Mode:      offline estimate (scoring service unavailable)");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "ATS Score:        {}/100 ({})", view.ats_score, view.band.as_str());
    let _ = writeln!(out, "Keywords Match:   {}", view.keywords_match);
    let _ = writeln!(out, "Format Score:     {}", view.format_score);
    let _ = writeln!(out, "Experience Match: {}", view.experience_match);
    let _ = writeln!(out);

    write_list(&mut out, "Matched Skills", &view.matched_skills);
    write_list(&mut out, "Missing Skills", &view.missing_skills);

    let _ = writeln!(out, "Recommendations");
    if view.recommendations.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (i, rec) in view.recommendations.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, rec.title);
        if !rec.description.is_empty() {
            let _ = writeln!(out, "     {}", rec.description);
        }
    }

    Ok(out)
}

fn write_list(out: &mut String, heading: &str, items: &[String]) {
    let _ = writeln!(out, "{heading}");
    if items.is_empty() {
        let _ = writeln!(out, "  (none)");
    } else {
        let _ = writeln!(out, "  {}", items.join(", "));
    }
    let _ = writeln!(out);
}

/// File name offered for download, e.g. `resume-analysis-2026-10-16.txt`.
pub fn report_file_name(generated_at: DateTime<Utc>) -> String {
    format!("resume-analysis-{}.txt", generated_at.format("%Y-%m-%d"))
}
