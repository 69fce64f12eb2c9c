//! Pure input checks shared by the session and upload flows.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::errors::AppError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// True iff `s` looks like `local@domain.tld` with no whitespace and a single `@`.
pub fn is_valid_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StrengthLabel {
    #[serde(rename = "Very Weak")]
    VeryWeak,
    Weak,
    Medium,
    Strong,
    #[serde(rename = "Very Strong")]
    VeryStrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub score: u8,
    pub label: StrengthLabel,
}

/// Scores a password in steps of 25: length ≥ 8, lowercase, uppercase, digit.
pub fn password_strength(s: &str) -> PasswordStrength {
    let checks = [
        s.chars().count() >= 8,
        s.chars().any(|c| c.is_ascii_lowercase()),
        s.chars().any(|c| c.is_ascii_uppercase()),
        s.chars().any(|c| c.is_ascii_digit()),
    ];
    let score = checks.iter().filter(|&&passed| passed).count() as u8 * 25;

    let label = match score {
        100.. => StrengthLabel::VeryStrong,
        75.. => StrengthLabel::Strong,
        50.. => StrengthLabel::Medium,
        25.. => StrengthLabel::Weak,
        _ => StrengthLabel::VeryWeak,
    };

    PasswordStrength { score, label }
}

/// Human-readable byte size: `1536 → "1.5 KB"`, capped at GB.
/// Negative sizes have no meaning and are rejected.
pub fn format_byte_size(n: i64) -> Result<String, AppError> {
    if n < 0 {
        return Err(AppError::Domain(format!("byte size cannot be negative: {n}")));
    }
    if n == 0 {
        return Ok("0 Bytes".to_string());
    }

    let mut unit = 0;
    let mut divisor = 1_i64;
    while unit < SIZE_UNITS.len() - 1 && n / divisor >= 1024 {
        divisor *= 1024;
        unit += 1;
    }

    let value = ((n as f64 / divisor as f64) * 100.0).round() / 100.0;
    Ok(format!("{value} {}", SIZE_UNITS[unit]))
}
