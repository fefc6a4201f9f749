//! Export orchestration
//!
//! `ProposalExporter` turns named quotes into a downloadable document:
//! lay out, render in the requested format, name the file. At most one
//! export runs at a time per exporter; a second request while one is in
//! flight is rejected with `ExportError::Busy` instead of queueing.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use proposal_core::NamedQuote;
use serde::{Deserialize, Serialize};

use crate::docx::render_docx;
use crate::error::ExportError;
use crate::layout::{ExportOptions, ProposalLayout};
use crate::pdf::PdfExporter;

const DOCUMENT_KIND: &str = "Commercial_Proposal";
const COMBINED_SCOPE: &str = "combined";
const CUSTOM_SCOPE: &str = "custom";

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Docx,
    Pdf,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "docx" => Ok(DocumentFormat::Docx),
            "pdf" => Ok(DocumentFormat::Pdf),
            other => Err(format!("unknown document format: {other}")),
        }
    }
}

/// `Commercial_Proposal_<scope>_<YYYY-MM-DD>.<ext>`
///
/// The scope is the variant key for a single variant quote, `combined` for
/// more than one quote and `custom` for a single quote without a variant.
pub fn file_name(quotes: &[NamedQuote], format: DocumentFormat, date: NaiveDate) -> String {
    let scope = match quotes {
        [single] => single.variant.map_or(CUSTOM_SCOPE, |v| v.key()),
        _ => COMBINED_SCOPE,
    };
    format!(
        "{DOCUMENT_KIND}_{scope}_{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// A finished document handed to the caller for saving
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
    /// Pages in the PDF; `None` for DOCX, which paginates in the reader
    pub page_count: Option<usize>,
}

/// At-most-one-in-flight guard for exports
#[derive(Debug, Clone, Default)]
pub struct ExportSlot {
    busy: Arc<AtomicBool>,
}

impl ExportSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot; it is released when the guard drops, on success or failure
    pub fn try_acquire(&self) -> Result<ExportGuard, ExportError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::Busy)?;
        Ok(ExportGuard {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Holds the export slot until dropped
#[derive(Debug)]
pub struct ExportGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Produces DOCX and PDF proposals
pub struct ProposalExporter {
    pdf: PdfExporter,
    slot: ExportSlot,
}

impl ProposalExporter {
    pub fn new(pdf: PdfExporter) -> Self {
        Self {
            pdf,
            slot: ExportSlot::new(),
        }
    }

    /// The slot guarding this exporter, for callers that show a loading state
    pub fn slot(&self) -> &ExportSlot {
        &self.slot
    }

    /// Export one or more named quotes
    ///
    /// # Errors
    ///
    /// `Busy` while another export is in flight, `EmptyProposal` without
    /// quotes, and any render failure. The slot is free again afterwards.
    pub async fn export(
        &self,
        quotes: &[NamedQuote],
        format: DocumentFormat,
        options: &ExportOptions,
    ) -> Result<ExportedDocument, ExportError> {
        let _guard = self.slot.try_acquire()?;
        let date = options.date();

        tracing::info!(%format, variants = quotes.len(), "Starting export");

        let result = self.render(quotes, format, options, date).await;
        match &result {
            Ok(doc) => tracing::info!(
                file = %doc.file_name,
                bytes = doc.bytes.len(),
                "Export finished"
            ),
            Err(e) => tracing::error!(%format, error = %e, "Export failed"),
        }
        result
    }

    async fn render(
        &self,
        quotes: &[NamedQuote],
        format: DocumentFormat,
        options: &ExportOptions,
        date: NaiveDate,
    ) -> Result<ExportedDocument, ExportError> {
        let layout = ProposalLayout::build(quotes, options)?;

        let (bytes, page_count) = match format {
            DocumentFormat::Docx => (render_docx(&layout)?, None),
            DocumentFormat::Pdf => {
                let rendered = self.pdf.render(&layout, date).await?;
                (rendered.bytes, Some(rendered.page_count))
            }
        };

        let file_name = match &options.file_name {
            Some(name) if name.ends_with(&format!(".{}", format.extension())) => name.clone(),
            Some(name) => format!("{name}.{}", format.extension()),
            None => file_name(quotes, format, date),
        };

        Ok(ExportedDocument {
            file_name,
            mime_type: format.mime_type(),
            bytes,
            page_count,
        })
    }
}
