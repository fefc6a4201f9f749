//! PDF exporter
//!
//! Compiles the embedded Typst template against a `ProposalLayout` and
//! exports the result with `typst-pdf`. Typst paginates on its own; the
//! template's page footer stamps the label and page number on every page.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use typst::diag::{Severity, SourceDiagnostic};
use typst::model::Document;

use crate::error::{CompileError, ExportError};
use crate::fonts::{load_font_cache, FontCache, FontSource, FontUrls};
use crate::layout::ProposalLayout;
use crate::world::VirtualWorld;

/// Proposal template, embedded at compile time
pub const PROPOSAL_TEMPLATE: &str = include_str!("../templates/proposal.typ");

/// Default render timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A finished PDF
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub warnings: Vec<CompileError>,
}

/// Renders layouts to PDF, fetching the configured fonts first
pub struct PdfExporter {
    font_source: Arc<dyn FontSource>,
    font_urls: FontUrls,
    timeout: Duration,
}

impl PdfExporter {
    pub fn new(font_source: Arc<dyn FontSource>) -> Self {
        Self {
            font_source,
            font_urls: FontUrls::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_font_urls(mut self, font_urls: FontUrls) -> Self {
        self.font_urls = font_urls;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Render a layout, dated `today`
    pub async fn render(
        &self,
        layout: &ProposalLayout,
        today: NaiveDate,
    ) -> Result<RenderedPdf, ExportError> {
        let fonts = load_font_cache(self.font_source.as_ref(), &self.font_urls).await;
        let world = proposal_world(layout, fonts, today)?;

        let timeout_ms = self.timeout.as_millis() as u64;
        let result = tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || compile_pdf(&world)),
        )
        .await;

        match result {
            Ok(Ok(rendered)) => rendered,
            Ok(Err(join_error)) => Err(ExportError::Task(join_error.to_string())),
            Err(_timeout) => Err(ExportError::Timeout(timeout_ms)),
        }
    }
}

/// World compiling the proposal template with `layout` as its input
pub fn proposal_world(
    layout: &ProposalLayout,
    fonts: Arc<FontCache>,
    today: NaiveDate,
) -> Result<VirtualWorld, ExportError> {
    let inputs = serde_json::json!({
        "proposal": serde_json::to_value(layout)?,
        "fonts": fonts.preferred_families(),
    });
    VirtualWorld::new(PROPOSAL_TEMPLATE, inputs, fonts, today)
}

/// Lay out a world into pages (blocking)
///
/// Returns the document together with the template warnings.
pub fn compile_document(
    world: &VirtualWorld,
) -> Result<(Document, Vec<CompileError>), ExportError> {
    let warned = typst::compile(world);
    let (_, warnings) = categorize_diagnostics(&warned.warnings);

    match warned.output {
        Ok(document) => Ok((document, warnings)),
        Err(diagnostics) => {
            let (errors, _) = categorize_diagnostics(&diagnostics);
            if errors.is_empty() {
                return Err(ExportError::Compile(vec![CompileError::new(
                    "Compilation failed with unknown error",
                )]));
            }
            Err(ExportError::Compile(errors))
        }
    }
}

/// Compile a world and export it to PDF bytes (blocking)
pub fn compile_pdf(world: &VirtualWorld) -> Result<RenderedPdf, ExportError> {
    let (document, warnings) = compile_document(world)?;

    for warning in &warnings {
        tracing::debug!(message = %warning.message, "Template warning");
    }

    let bytes = typst_pdf::pdf(&document, &typst_pdf::PdfOptions::default()).map_err(|diags| {
        let (errors, _) = categorize_diagnostics(&diags);
        let summary = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        ExportError::Pdf(summary)
    })?;

    Ok(RenderedPdf {
        bytes,
        page_count: document.pages.len(),
        warnings,
    })
}

/// Categorize diagnostics into errors and warnings
fn categorize_diagnostics(
    diagnostics: &[SourceDiagnostic],
) -> (Vec<CompileError>, Vec<CompileError>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for diag in diagnostics {
        let mut compile_error = CompileError::new(diag.message.to_string());

        if !diag.hints.is_empty() {
            let hint = diag
                .hints
                .iter()
                .map(|h| h.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            compile_error = compile_error.with_hint(hint);
        }

        match diag.severity {
            Severity::Error => errors.push(compile_error),
            Severity::Warning => warnings.push(compile_error.as_warning()),
        }
    }

    (errors, warnings)
}
