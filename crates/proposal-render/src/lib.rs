//! Document exporters for commercial proposals
//!
//! Renders one or more named quotes into a DOCX or PDF business document.
//!
//! # Architecture
//!
//! - `layout`: format-neutral document content (title block, one table per
//!   variant, terms, signature) with every amount already formatted
//! - `docx`: DOCX writer built on `docx-rs`
//! - `pdf`: Typst compilation of the embedded template, exported with
//!   `typst-pdf`
//! - `fonts`: embedded font cache plus optional fetched fonts with fallback
//! - `world`: in-memory Typst `World`
//! - `export`: orchestration, file naming, single in-flight export guard

pub mod docx;
pub mod error;
pub mod export;
pub mod fonts;
pub mod layout;
pub mod pdf;
pub mod world;

pub use error::{CompileError, ErrorSeverity, ExportError};
pub use export::{file_name, DocumentFormat, ExportSlot, ExportedDocument, ProposalExporter};
pub use fonts::{FontSource, FontUrls, HttpFontSource};
pub use layout::{ExportOptions, ProposalLayout, TableRow, VariantTable};
pub use pdf::{PdfExporter, RenderedPdf};
