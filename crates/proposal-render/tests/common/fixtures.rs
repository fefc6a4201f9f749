//! Shared quotes for the exporter integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use proposal_core::{
    compose_named, CatalogSeed, Category, LineItem, NamedQuote, Preset, PriceStore, Quote,
    Selection, Variant,
};
use proposal_render::ExportOptions;

pub fn export_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

pub fn options() -> ExportOptions {
    ExportOptions {
        date: Some(export_date()),
        ..ExportOptions::default()
    }
}

/// Three line items totalling 1 250 000
pub fn three_item_quote() -> NamedQuote {
    let item = |id: &str, name: &str, qty: u32, price: u64, category: Category| LineItem {
        id: id.to_string(),
        name: name.to_string(),
        qty,
        price,
        category,
    };

    NamedQuote {
        name: "Тестовый".to_string(),
        variant: Some(Variant::Basic),
        quote: Quote {
            items: vec![
                item("server", "Сервер Гравитон", 1, 1_000_000, Category::Hardware),
                item("os", "Альт Сервер", 2, 50_000, Category::Software),
                item("phase", "Этап 1", 1, 150_000, Category::Implementation),
            ],
            total_price: 1_250_000,
        },
    }
}

/// Full quote for a variant at seed prices
pub fn variant_quote(variant: Variant) -> NamedQuote {
    let mut store = PriceStore::seeded(7);
    store.initialize(&CatalogSeed::builtin());
    compose_named(&Selection::new(variant, Preset::Full), &store)
}
