//! Upload state: at most one resume file and one job-description text.
//!
//! Readiness is derived on demand, never cached, so it cannot drift from the inputs.

use bytes::Bytes;
use serde::Serialize;

use crate::errors::AppError;
use crate::validation::format_byte_size;

pub const MAX_RESUME_BYTES: u64 = 5 * 1024 * 1024;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeKind {
    Pdf,
    Doc,
    Docx,
}

impl ResumeKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        // Ignore parameters such as `; charset=...`.
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            MIME_PDF => Some(ResumeKind::Pdf),
            MIME_DOC => Some(ResumeKind::Doc),
            MIME_DOCX => Some(ResumeKind::Docx),
            _ => None,
        }
    }
}

/// An uploaded file: name, MIME tag and raw bytes.
#[derive(Debug, Clone)]
pub struct FileRef {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl FileRef {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// What the upload panel shows.
#[derive(Debug, Clone, Serialize)]
pub struct UploadSummary {
    pub resume_name: Option<String>,
    pub resume_size: Option<String>,
    pub resume_kind: Option<ResumeKind>,
    pub job_text_chars: usize,
    pub ready_to_analyze: bool,
}

#[derive(Debug, Default)]
pub struct UploadState {
    resume: Option<FileRef>,
    job_text: String,
}

impl UploadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resume(&self) -> Option<&FileRef> {
        self.resume.as_ref()
    }

    pub fn job_text(&self) -> &str {
        &self.job_text
    }

    /// Accepts PDF/DOC/DOCX up to 5 MiB. A rejected file leaves the held resume untouched.
    pub fn set_resume(&mut self, file: FileRef) -> Result<ResumeKind, AppError> {
        let kind = ResumeKind::from_mime(&file.content_type).ok_or_else(|| {
            AppError::RejectedFileType("Please upload PDF or DOCX".to_string())
        })?;
        if file.size() > MAX_RESUME_BYTES {
            return Err(AppError::FileTooLarge { size: file.size() });
        }
        self.resume = Some(file);
        Ok(kind)
    }

    pub fn clear_resume(&mut self) {
        self.resume = None;
    }

    /// Reads the job description file as plain text.
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn set_job_text_from_file(&mut self, file: &FileRef) {
        self.job_text = String::from_utf8_lossy(&file.bytes).into_owned();
    }

    pub fn set_job_text(&mut self, text: impl Into<String>) {
        self.job_text = text.into();
    }

    pub fn is_ready_to_analyze(&self) -> bool {
        self.resume.is_some() && !self.job_text.trim().is_empty()
    }

    pub fn summary(&self) -> UploadSummary {
        UploadSummary {
            resume_name: self.resume.as_ref().map(|f| f.name.clone()),
            resume_size: self
                .resume
                .as_ref()
                .and_then(|f| format_byte_size(f.size() as i64).ok()),
            resume_kind: self
                .resume
                .as_ref()
                .and_then(|f| ResumeKind::from_mime(&f.content_type)),
            job_text_chars: self.job_text.chars().count(),
            ready_to_analyze: self.is_ready_to_analyze(),
        }
    }
}
