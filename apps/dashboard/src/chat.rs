//! Canned-answer chat responder.
//!
//! Lookup order: exact (lower-cased) question, then the first table entry sharing at
//! least two tokens longer than two characters with the message, then the default.
//! Table order is part of the behavior.

static QA_TABLE: [(&str, &str); 15] = [
    (
        "what is ats score?",
        "An ATS score estimates how well your resume matches a job description as an \
         Applicant Tracking System would see it. Higher is better; aim for 75 or more.",
    ),
    (
        "how can i improve my ats score?",
        "Use keywords from the job description, keep formatting simple, quantify your \
         achievements, and list your core skills in a dedicated section.",
    ),
    (
        "what file formats are supported?",
        "You can upload your resume as PDF, DOC or DOCX. Job descriptions can be pasted \
         or loaded from a text file.",
    ),
    (
        "what is the maximum file size?",
        "Resumes can be up to 5MB.",
    ),
    (
        "how is keyword match calculated?",
        "Keyword match compares the skills and terms in the job description with those \
         found in your resume.",
    ),
    (
        "what does format score mean?",
        "The format score reflects how easily an ATS can parse your resume. Simple \
         layouts without tables or images score best.",
    ),
    (
        "what is experience match?",
        "Experience match estimates how closely your work history lines up with the \
         role's requirements.",
    ),
    (
        "what are missing skills?",
        "Missing skills are requirements from the job description that were not found \
         in your resume. Add them if you have them, or consider learning them.",
    ),
    (
        "is my data secure?",
        "Your files are only sent to the scoring service for analysis and are not \
         shared with third parties.",
    ),
    (
        "why is my analysis in offline mode?",
        "When the scoring service is unreachable, a local estimate based on the job \
         description is shown instead. Try again later for a full analysis.",
    ),
    (
        "how do i download my report?",
        "After an analysis completes, use the download report button to save a copy \
         of your results.",
    ),
    (
        "should i tailor my resume for each job?",
        "Yes. Tailoring your resume to each job description usually raises your ATS \
         score noticeably.",
    ),
    (
        "how long should my resume be?",
        "One page for early-career candidates, two pages for experienced professionals.",
    ),
    (
        "do ats systems read pdf files?",
        "Most modern ATS systems read text-based PDFs well. Avoid scanned images of \
         your resume.",
    ),
    (
        "how do i change the theme?",
        "Use the theme toggle in the header to switch between light and dark mode.",
    ),
];

pub const DEFAULT_RESPONSE: &str = "I'm not sure about that. Try asking about ATS scores, \
     supported file formats, or how to improve your resume.";

const MIN_TOKEN_LEN: usize = 3;
const MIN_SHARED_TOKENS: usize = 2;

fn shared_token_count(message: &str, question: &str) -> usize {
    let question_tokens: Vec<&str> = question.split_whitespace().collect();
    message
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_LEN)
        .filter(|token| question_tokens.contains(token))
        .count()
}

pub fn respond(message: &str) -> &'static str {
    let message = message.to_lowercase();

    if let Some((_, answer)) = QA_TABLE.iter().find(|(q, _)| *q == message) {
        return *answer;
    }

    QA_TABLE
        .iter()
        .find(|(q, _)| shared_token_count(&message, q) >= MIN_SHARED_TOKENS)
        .map(|(_, answer)| *answer)
        .unwrap_or(DEFAULT_RESPONSE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert_eq!(respond("what is ats score?"), QA_TABLE[0].1);
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        assert_eq!(respond("What Is The Maximum File Size?"), QA_TABLE[3].1);
    }

    #[test]
    fn test_unrelated_message_gets_default() {
        assert_eq!(respond("hello there"), DEFAULT_RESPONSE);
    }

    #[test]
    fn test_token_overlap_first_entry_wins() {
        // Shares "what" and "ats" with entry 0 before any later entry is considered.
        assert_eq!(respond("what ats thing"), QA_TABLE[0].1);
    }

    #[test]
    fn test_token_overlap_later_entry() {
        // "missing" + "skills?" only appear together in the missing-skills question.
        assert_eq!(respond("tell me about missing skills?"), QA_TABLE[7].1);
    }

    #[test]
    fn test_short_tokens_do_not_count() {
        // "is" and "my" are too short; only "data" remains, which is one token.
        assert_eq!(respond("is my data ok"), DEFAULT_RESPONSE);
    }

    #[test]
    fn test_table_questions_are_lowercase_and_unique() {
        for (i, (q, _)) in QA_TABLE.iter().enumerate() {
            assert_eq!(*q, q.to_lowercase());
            assert!(QA_TABLE[i + 1..].iter().all(|(other, _)| other != q));
        }
    }
}
