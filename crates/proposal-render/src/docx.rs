//! DOCX exporter

use std::io::Cursor;

use docx_rs::{
    AlignmentType, Docx, LineSpacing, Paragraph, Run, Shading, Table, TableCell,
    TableRow as DocxRow, WidthType,
};

use crate::error::ExportError;
use crate::layout::{ProposalLayout, TableRow, VariantTable};

const HEADER_SHADING: &str = "E0E0E0";
/// Column widths in twentieths of a point, 50/10/20/20 of an A4 text width
const COLUMN_WIDTHS: [usize; 4] = [4819, 964, 1927, 1927];
const TABLE_WIDTH: usize = 9637;
const SIGNATURE_RULE: &str = "__________________________";

/// Render a layout to DOCX bytes
pub fn render_docx(layout: &ProposalLayout) -> Result<Vec<u8>, ExportError> {
    let mut docx = Docx::new()
        .add_paragraph(
            text_paragraph(&layout.title, true, 32)
                .align(AlignmentType::Center)
                .line_spacing(LineSpacing::new().after(200)),
        )
        .add_paragraph(
            text_paragraph(&layout.subtitle, true, 26)
                .align(AlignmentType::Center)
                .line_spacing(LineSpacing::new().after(400)),
        )
        .add_paragraph(
            text_paragraph(&layout.date_line, true, 22)
                .align(AlignmentType::Right)
                .line_spacing(LineSpacing::new().after(400)),
        )
        .add_paragraph(
            text_paragraph(&layout.description, false, 22)
                .align(AlignmentType::Both)
                .line_spacing(LineSpacing::new().after(400)),
        );

    for section in &layout.sections {
        docx = docx
            .add_paragraph(
                text_paragraph(&section.heading, true, 24)
                    .line_spacing(LineSpacing::new().before(200).after(200)),
            )
            .add_table(variant_table(section));
    }

    docx = docx.add_paragraph(
        text_paragraph(&layout.terms_heading, true, 24)
            .line_spacing(LineSpacing::new().before(400).after(200)),
    );
    for term in &layout.terms {
        docx = docx.add_paragraph(text_paragraph(term, false, 22));
    }

    docx = docx.add_paragraph(
        text_paragraph(
            &format!("{SIGNATURE_RULE} / {}", layout.signature_label),
            false,
            22,
        )
        .align(AlignmentType::Right)
        .line_spacing(LineSpacing::new().before(800)),
    );

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ExportError::Docx(e.to_string()))?;

    Ok(buffer.into_inner())
}

fn text_paragraph(text: &str, bold: bool, size: usize) -> Paragraph {
    let mut run = Run::new().add_text(text).size(size);
    if bold {
        run = run.bold();
    }
    Paragraph::new().add_run(run)
}

fn cell(text: &str, bold: bool, align: AlignmentType) -> TableCell {
    TableCell::new().add_paragraph(text_paragraph(text, bold, 20).align(align))
}

/// Alignment of each column: name left, quantity centered, amounts right
fn column_alignment(column: usize) -> AlignmentType {
    match column {
        0 => AlignmentType::Left,
        1 => AlignmentType::Center,
        _ => AlignmentType::Right,
    }
}

fn variant_table(section: &VariantTable) -> Table {
    let rows = section
        .rows()
        .into_iter()
        .map(|row| match row {
            TableRow::Header(cells) => DocxRow::new(
                cells
                    .iter()
                    .enumerate()
                    .map(|(i, text)| {
                        cell(text, true, column_alignment(i))
                            .width(COLUMN_WIDTHS[i], WidthType::Dxa)
                            .shading(Shading::new().fill(HEADER_SHADING))
                    })
                    .collect(),
            ),
            TableRow::Item(cells) => DocxRow::new(
                cells
                    .iter()
                    .enumerate()
                    .map(|(i, text)| {
                        cell(text, false, column_alignment(i))
                            .width(COLUMN_WIDTHS[i], WidthType::Dxa)
                    })
                    .collect(),
            ),
            TableRow::Total { label, amount } => DocxRow::new(vec![
                cell(&label, true, AlignmentType::Right).grid_span(3),
                cell(&amount, true, AlignmentType::Right).width(COLUMN_WIDTHS[3], WidthType::Dxa),
            ]),
        })
        .collect();

    Table::new(rows)
        .set_grid(COLUMN_WIDTHS.to_vec())
        .width(TABLE_WIDTH, WidthType::Dxa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ExportOptions;
    use chrono::NaiveDate;
    use proposal_core::{Category, LineItem, NamedQuote, Quote};

    fn layout() -> ProposalLayout {
        let quote = Quote {
            items: vec![LineItem {
                id: "server".to_string(),
                name: "Сервер".to_string(),
                qty: 1,
                price: 500_000,
                category: Category::Hardware,
            }],
            total_price: 500_000,
        };
        let named = NamedQuote {
            name: "Custom".to_string(),
            variant: None,
            quote,
        };
        let options = ExportOptions {
            date: NaiveDate::from_ymd_opt(2026, 10, 19),
            ..ExportOptions::default()
        };
        ProposalLayout::build(&[named], &options).unwrap()
    }

    #[test]
    fn test_render_produces_zip_container() {
        let bytes = render_docx(&layout()).unwrap();
        // DOCX is a ZIP archive
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_column_alignment() {
        assert!(matches!(column_alignment(0), AlignmentType::Left));
        assert!(matches!(column_alignment(1), AlignmentType::Center));
        assert!(matches!(column_alignment(2), AlignmentType::Right));
        assert!(matches!(column_alignment(3), AlignmentType::Right));
    }
}
