//! Error types for document export

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A Typst diagnostic reduced to what a caller can act on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileError {
    /// Human-readable error message
    pub message: String,
    /// Helpful hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub severity: ErrorSeverity,
}

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    Error,
    Warning,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: None,
            severity: ErrorSeverity::Error,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn as_warning(mut self) -> Self {
        self.severity = ErrorSeverity::Warning;
        self
    }
}

/// Export failures surfaced to the caller
///
/// Font fetch problems never show up here; they degrade to the embedded
/// fonts inside the PDF exporter.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Proposal has no variants to export")]
    EmptyProposal,

    #[error("Another export is already in progress")]
    Busy,

    #[error("Template compilation failed: {}", summarize(.0))]
    Compile(Vec<CompileError>),

    #[error("Rendering timeout after {0}ms")]
    Timeout(u64),

    #[error("PDF export failed: {0}")]
    Pdf(String),

    #[error("DOCX export failed: {0}")]
    Docx(String),

    #[error("Font fetch failed: {0}")]
    FontFetch(String),

    #[error("Render task failed: {0}")]
    Task(String),

    #[error("Invalid template input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn summarize(errors: &[CompileError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_builder() {
        let err = CompileError::new("unknown variable: foo")
            .with_hint("did you mean `for`?")
            .as_warning();

        assert_eq!(err.message, "unknown variable: foo");
        assert_eq!(err.hint.as_deref(), Some("did you mean `for`?"));
        assert_eq!(err.severity, ErrorSeverity::Warning);
    }

    #[test]
    fn test_compile_error_serialization_skips_missing_hint() {
        let json = serde_json::to_string(&CompileError::new("boom")).unwrap();
        assert_eq!(json, r#"{"message":"boom","severity":"error"}"#);
    }

    #[test]
    fn test_compile_variant_lists_messages() {
        let err = ExportError::Compile(vec![CompileError::new("a"), CompileError::new("b")]);
        assert_eq!(err.to_string(), "Template compilation failed: a; b");
    }
}
