use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

// ---------------------------------------------------------------------------
// The Catalog Entry: Document
// Immutable once registered. Bytes live in the blob store under `blob_key`.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub display_name: String,
    pub blob_key: String,
    pub original_file_name: String,
    pub content_type: String,
    pub byte_size: i64,
    pub uploaded_at: DateTime<Utc>,
    pub uploader_kind: UploaderKind,
    pub category: Option<String>,
    pub section: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Registry input; id and upload time are assigned on creation.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub display_name: String,
    pub blob_key: String,
    pub original_file_name: String,
    pub content_type: String,
    pub byte_size: i64,
    pub uploader_kind: UploaderKind,
    pub category: Option<String>,
    pub section: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploaderKind {
    Admin,
    User,
}

impl UploaderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploaderKind::Admin => "admin",
            UploaderKind::User => "user",
        }
    }
}

impl fmt::Display for UploaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for UploaderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UploaderKind::Admin),
            "user" => Ok(UploaderKind::User),
            other => Err(Error::InvalidInput(format!("unknown uploader kind '{}'", other))),
        }
    }
}

impl Document {
    /// Whether the pipeline can transform this file. Declared content type
    /// wins; the extension is the fallback for generic uploads.
    pub fn is_pdf(&self) -> bool {
        is_pdf(&self.content_type, &self.original_file_name)
    }

    /// Name offered to the client for the delivered file.
    pub fn attachment_name(&self) -> String {
        attachment_name(&self.display_name, &self.original_file_name)
    }
}

pub fn is_pdf(content_type: &str, file_name: &str) -> bool {
    let content_type = content_type.trim().to_ascii_lowercase();
    if content_type.starts_with("application/pdf") {
        return true;
    }
    let generic = content_type.is_empty()
        || content_type == "application/octet-stream"
        || content_type == "binary/octet-stream";
    generic && extension(file_name).is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Keeps the display name, makes sure it carries the original file's
/// extension and strips characters that break a Content-Disposition header.
pub fn attachment_name(display_name: &str, original_file_name: &str) -> String {
    let mut name: String = display_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '"' | ':' | '*' | '?' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if name.is_empty() {
        name = "document".to_string();
    }

    if let Some(ext) = extension(original_file_name) {
        let has_ext = extension(&name).is_some_and(|current| current.eq_ignore_ascii_case(ext));
        if !has_ext {
            name.push('.');
            name.push_str(&ext.to_ascii_lowercase());
        }
    }
    name
}

fn extension(file_name: &str) -> Option<&str> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.contains(['/', '\\']) {
        return None;
    }
    Some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_detection_prefers_content_type() {
        assert!(is_pdf("application/pdf", "notes.bin"));
        assert!(is_pdf("", "Notes.PDF"));
        assert!(is_pdf("application/octet-stream", "notes.pdf"));
        assert!(!is_pdf("application/zip", "notes.pdf"));
        assert!(!is_pdf("", "notes.docx"));
    }

    #[test]
    fn attachment_name_gains_missing_extension() {
        assert_eq!(attachment_name("Calculus Notes", "calc-v2.PDF"), "Calculus Notes.pdf");
        assert_eq!(attachment_name("Calculus Notes.pdf", "calc.pdf"), "Calculus Notes.pdf");
        assert_eq!(attachment_name("Unit 3", "slides.pptx"), "Unit 3.pptx");
    }

    #[test]
    fn attachment_name_is_header_safe() {
        assert_eq!(attachment_name("a/b \"c\"", "x.pdf"), "a_b _c_.pdf");
        assert_eq!(attachment_name("   ", "x.pdf"), "document.pdf");
        assert_eq!(attachment_name("Readme", "LICENSE"), "Readme");
    }
}
