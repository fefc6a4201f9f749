//! Format-neutral proposal layout
//!
//! Both exporters render the same `ProposalLayout`: a title block, a fixed
//! description, one four-column table per variant and a closing block with
//! terms and the signature line. Every amount is formatted here, once, so
//! the DOCX and PDF outputs always show identical strings.

use chrono::{Local, NaiveDate};
use proposal_core::{Locale, NamedQuote};
use serde::Serialize;

use crate::error::ExportError;

pub const DEFAULT_TITLE: &str = "Коммерческое предложение";
pub const DEFAULT_SUBTITLE: &str = "Локальный ИИ-агент для 1С:Предприятие";

const DESCRIPTION: &str = "Предлагаем рассмотреть внедрение автономной системы искусственного \
интеллекта для автоматизации финансово-хозяйственных операций. Решение разворачивается в \
локальном контуре предприятия, обеспечивая полную конфиденциальность данных и соответствие \
требованиям импортозамещения.";

const SECTION_PREFIX: &str = "Конфигурация решения";
const HEADER: [&str; 4] = ["Наименование", "Кол-во", "Цена за ед.", "Сумма"];
const TOTAL_LABEL: &str = "ИТОГО:";
const TERMS_HEADING: &str = "Условия реализации";
const TERMS: [&str; 4] = [
    "1. Цены на оборудование являются ориентировочными и уточняются на момент закупки.",
    "2. Срок действия предложения: 30 календарных дней.",
    "3. Условия оплаты: 50% предоплата, 50% после подписания акта приемки-передачи.",
    "4. Гарантия на работы: 12 месяцев с момента ввода в эксплуатацию.",
];
const SIGNATURE_LABEL: &str = "Подпись исполнителя";
const STAMP_LABEL: &str = "М.П.";
const FOOTER_LABEL: &str = "AZONE AI // Проектное предложение v3.0";
const PAGE_LABEL: &str = "Страница";

/// Per-export overrides
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub locale: Locale,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    /// File name to use instead of the generated one
    pub file_name: Option<String>,
    /// Generation date; today when absent
    pub date: Option<NaiveDate>,
}

impl ExportOptions {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            ..Self::default()
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// One rendered table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRow {
    Header([String; 4]),
    Item([String; 4]),
    /// Label spanning the first three columns, amount in the last
    Total { label: String, amount: String },
}

impl TableRow {
    /// Text of the last column
    pub fn rightmost(&self) -> &str {
        match self {
            TableRow::Header(cells) | TableRow::Item(cells) => &cells[3],
            TableRow::Total { amount, .. } => amount,
        }
    }
}

/// Heading plus table for one variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantTable {
    pub heading: String,
    pub header: [String; 4],
    pub items: Vec<[String; 4]>,
    pub total_label: String,
    pub total: String,
}

impl VariantTable {
    fn from_quote(named: &NamedQuote, locale: Locale) -> Self {
        let items = named
            .quote
            .items
            .iter()
            .map(|item| {
                [
                    item.name.clone(),
                    item.qty.to_string(),
                    locale.format_currency(item.price),
                    locale.format_currency(item.line_total()),
                ]
            })
            .collect();

        Self {
            heading: format!("{SECTION_PREFIX}: {}", named.name),
            header: HEADER.map(String::from),
            items,
            total_label: TOTAL_LABEL.to_string(),
            total: locale.format_currency(named.quote.total_price),
        }
    }

    /// Header row, one row per line item, then the total row
    pub fn rows(&self) -> Vec<TableRow> {
        let mut rows = Vec::with_capacity(self.items.len() + 2);
        rows.push(TableRow::Header(self.header.clone()));
        rows.extend(self.items.iter().cloned().map(TableRow::Item));
        rows.push(TableRow::Total {
            label: self.total_label.clone(),
            amount: self.total.clone(),
        });
        rows
    }
}

/// The complete document content, ready for either exporter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposalLayout {
    pub title: String,
    pub subtitle: String,
    pub date_line: String,
    pub description: String,
    pub sections: Vec<VariantTable>,
    pub terms_heading: String,
    pub terms: Vec<String>,
    pub signature_label: String,
    pub stamp_label: String,
    pub footer_label: String,
    pub page_label: String,
    pub lang: String,
}

impl ProposalLayout {
    /// Lay out one or more named quotes
    ///
    /// # Errors
    ///
    /// Returns `ExportError::EmptyProposal` when `quotes` is empty.
    pub fn build(quotes: &[NamedQuote], options: &ExportOptions) -> Result<Self, ExportError> {
        if quotes.is_empty() {
            return Err(ExportError::EmptyProposal);
        }

        let locale = options.locale;
        let date = locale.format_long_date(options.date());

        Ok(Self {
            title: options
                .title
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            subtitle: options
                .subtitle
                .clone()
                .unwrap_or_else(|| DEFAULT_SUBTITLE.to_string()),
            date_line: format!("Дата: {date}"),
            description: DESCRIPTION.to_string(),
            sections: quotes
                .iter()
                .map(|named| VariantTable::from_quote(named, locale))
                .collect(),
            terms_heading: TERMS_HEADING.to_string(),
            terms: TERMS.iter().map(|t| t.to_string()).collect(),
            signature_label: SIGNATURE_LABEL.to_string(),
            stamp_label: STAMP_LABEL.to_string(),
            footer_label: FOOTER_LABEL.to_string(),
            page_label: PAGE_LABEL.to_string(),
            lang: locale.language().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proposal_core::{Category, LineItem, Quote, Variant};

    fn three_item_quote() -> NamedQuote {
        let items = vec![
            LineItem {
                id: "server".to_string(),
                name: "Сервер".to_string(),
                qty: 1,
                price: 1_000_000,
                category: Category::Hardware,
            },
            LineItem {
                id: "os".to_string(),
                name: "ОС".to_string(),
                qty: 2,
                price: 50_000,
                category: Category::Software,
            },
            LineItem {
                id: "phase".to_string(),
                name: "Этап 1".to_string(),
                qty: 1,
                price: 150_000,
                category: Category::Implementation,
            },
        ];
        NamedQuote {
            name: Variant::Basic.display_name().to_string(),
            variant: Some(Variant::Basic),
            quote: Quote {
                items,
                total_price: 1_250_000,
            },
        }
    }

    fn fixed_options() -> ExportOptions {
        ExportOptions {
            date: NaiveDate::from_ymd_opt(2026, 10, 19),
            ..ExportOptions::default()
        }
    }

    #[test]
    fn test_three_items_give_five_rows() {
        let layout = ProposalLayout::build(&[three_item_quote()], &fixed_options()).unwrap();
        let rows = layout.sections[0].rows();

        assert_eq!(rows.len(), 5);
        assert!(matches!(rows[0], TableRow::Header(_)));
        assert!(matches!(rows[4], TableRow::Total { .. }));
        assert_eq!(rows[4].rightmost(), "1\u{a0}250\u{a0}000\u{a0}₽");
    }

    #[test]
    fn test_item_row_cells() {
        let layout = ProposalLayout::build(&[three_item_quote()], &fixed_options()).unwrap();
        let rows = layout.sections[0].rows();

        assert_eq!(
            rows[2],
            TableRow::Item([
                "ОС".to_string(),
                "2".to_string(),
                "50\u{a0}000\u{a0}₽".to_string(),
                "100\u{a0}000\u{a0}₽".to_string(),
            ])
        );
    }

    #[test]
    fn test_defaults_and_overrides() {
        let layout = ProposalLayout::build(&[three_item_quote()], &fixed_options()).unwrap();
        assert_eq!(layout.title, DEFAULT_TITLE);
        assert_eq!(layout.subtitle, DEFAULT_SUBTITLE);
        assert_eq!(layout.sections[0].heading, "Конфигурация решения: Базовый");
        assert_eq!(layout.terms.len(), 4);
        assert!(layout.date_line.starts_with("Дата: 19 "));

        let options = ExportOptions {
            locale: Locale::EnUs,
            title: Some("Proposal".to_string()),
            ..fixed_options()
        };
        let layout = ProposalLayout::build(&[three_item_quote()], &options).unwrap();
        assert_eq!(layout.title, "Proposal");
        assert_eq!(layout.date_line, "Дата: October 19, 2026");
        assert_eq!(layout.sections[0].total, "RUB\u{a0}1,250,000");
        assert_eq!(layout.lang, "en");
    }

    #[test]
    fn test_empty_proposal_is_rejected() {
        let result = ProposalLayout::build(&[], &fixed_options());
        assert!(matches!(result, Err(ExportError::EmptyProposal)));
    }

    #[test]
    fn test_quote_without_items_still_has_header_and_total() {
        let mut named = three_item_quote();
        named.quote = Quote {
            items: Vec::new(),
            total_price: 0,
        };
        let layout = ProposalLayout::build(&[named], &fixed_options()).unwrap();
        let rows = layout.sections[0].rows();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].rightmost(), "0\u{a0}₽");
    }
}
