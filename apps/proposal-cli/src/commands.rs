//! Subcommand handlers
//!
//! Each handler owns the presentation side only: it builds the store and
//! selections from the configuration, calls the pure core functions and
//! prints the result.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context;
use proposal_core::variants::variant_items;
use proposal_core::{
    compose_named, estimate_roi, AppConfig, Locale, NamedQuote, Preset, PriceChange, PriceLookup,
    PriceStore, Requirements, RoiEstimate, RoiInputs, Selection, Variant,
};
use proposal_render::{
    DocumentFormat, ExportOptions, FontUrls, HttpFontSource, PdfExporter, ProposalExporter,
};
use tokio::sync::{mpsc, RwLock};

/// Build a store from the configured seed, overrides and live flag
fn price_store(config: &AppConfig) -> PriceStore {
    let mut store = match config.pricing.seed {
        Some(seed) => PriceStore::seeded(seed),
        None => PriceStore::new(),
    };
    store.initialize(&config.catalog_seed());
    store.set_live(config.pricing.live);
    store
}

/// Apply a preset, then flip each id that belongs to the variant
///
/// Returns the ids that are not part of the variant.
fn build_selection(
    variant: Variant,
    preset: Preset,
    toggles: &[String],
) -> (Selection, Vec<String>) {
    let known: Vec<String> = variant_items(variant).into_iter().map(|e| e.id).collect();
    let mut selection = Selection::new(variant, preset);
    let mut unknown = Vec::new();

    for id in toggles {
        if known.contains(id) {
            selection.toggle(id);
        } else {
            unknown.push(id.clone());
        }
    }

    (selection, unknown)
}

pub fn catalog(config: &AppConfig, ticks: u32, json: bool) -> anyhow::Result<()> {
    let mut store = price_store(config);
    if ticks > 0 {
        store.set_live(true);
        for _ in 0..ticks {
            store.tick();
        }
    }

    if json {
        let items: Vec<_> = store.items().collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    print!("{}", render_catalog(&store, config.export.locale));
    Ok(())
}

fn render_catalog(store: &PriceStore, locale: Locale) -> String {
    let mut out = String::new();
    let updated = store.last_update();
    let _ = writeln!(
        out,
        "Last update: {} {} UTC ({})",
        locale.format_short_date(updated.date_naive()),
        updated.format("%H:%M:%S"),
        if store.is_live() { "live" } else { "paused" },
    );
    for item in store.items() {
        let _ = writeln!(
            out,
            "{:<26} {:>18} {:>18} {}  {}",
            item.id,
            locale.format_currency(item.base_price),
            locale.format_currency(item.current_price),
            item.trend.symbol(),
            item.name
        );
    }
    out
}

pub fn quote(
    config: &AppConfig,
    variant: Variant,
    preset: Preset,
    toggles: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let store = price_store(config);
    let (selection, unknown) = build_selection(variant, preset, toggles);
    for id in &unknown {
        tracing::warn!(%variant, id = %id, "Item is not part of the variant, ignoring");
    }

    let named = compose_named(&selection, &store);
    if json {
        println!("{}", serde_json::to_string_pretty(&named)?);
    } else {
        print!("{}", render_quote(&named, config.export.locale));
    }
    Ok(())
}

fn render_quote(named: &NamedQuote, locale: Locale) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} items)", named.name, named.quote.items.len());

    for item in &named.quote.items {
        let _ = writeln!(
            out,
            "  {:<60} {:>3} x {:>16} = {:>18}",
            truncate(&item.name, 60),
            item.qty,
            locale.format_currency(item.price),
            locale.format_currency(item.line_total())
        );
    }

    for category in [
        proposal_core::Category::Hardware,
        proposal_core::Category::Software,
        proposal_core::Category::Implementation,
    ] {
        let _ = writeln!(
            out,
            "  {:<16} {:>18}",
            category.as_str(),
            locale.format_currency(named.quote.subtotal(category))
        );
    }
    let _ = writeln!(
        out,
        "  {:<16} {:>18}",
        "TOTAL",
        locale.format_currency(named.quote.total_price)
    );
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

pub fn roi(config: &AppConfig, inputs: &RoiInputs, json: bool) -> anyhow::Result<()> {
    let estimate = estimate_roi(inputs, &config.roi);
    if json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        print!("{}", render_roi(&estimate, config.export.locale));
    }
    Ok(())
}

fn render_roi(estimate: &RoiEstimate, locale: Locale) -> String {
    let money = |value: f64| locale.format_currency(value.round() as i64);
    let roi = estimate
        .roi_percent
        .map_or_else(|| "n/a".to_string(), |pct| format!("{pct}%"));
    let payback = match estimate.payback.months() {
        Some(months) => format!("{months:.1} months"),
        None => estimate.payback.to_string(),
    };

    let mut out = String::new();
    let _ = writeln!(out, "Labor savings:     {}", money(estimate.labor_savings));
    let _ = writeln!(out, "Error savings:     {}", money(estimate.error_savings));
    let _ = writeln!(out, "Fraud savings:     {}", money(estimate.fraud_savings));
    let _ = writeln!(
        out,
        "Annual savings:    {}",
        locale.format_currency(estimate.annual_savings)
    );
    let _ = writeln!(
        out,
        "Investment:        {}",
        locale.format_currency(estimate.investment)
    );
    let _ = writeln!(out, "Payback:           {payback}");
    let _ = writeln!(out, "3-year cost:       {}", money(estimate.three_year_cost));
    let _ = writeln!(out, "3-year ROI:        {roi}");
    out
}

pub fn recommend(documents: u32, high_availability: bool) {
    let variant = proposal_core::recommend(&Requirements {
        monthly_documents: documents,
        high_availability,
    });
    println!("{} ({})", variant.display_name(), variant.key());
}

/// Run the ticker until `ticks` updates were applied or Ctrl-C
///
/// A spawned task is the only writer of the store; this task reads it after
/// every change to show live variant totals.
pub async fn live(config: &AppConfig, ticks: Option<u32>) -> anyhow::Result<()> {
    let mut store = price_store(config);
    store.set_live(true);
    let store = Arc::new(RwLock::new(store));
    let locale = config.export.locale;
    let period = config.pricing.tick_interval;
    anyhow::ensure!(!period.is_zero(), "Tick interval must be greater than zero");

    let (tx, mut rx) = mpsc::channel::<PriceChange>(16);
    let writer = Arc::clone(&store);
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let change = writer.write().await.tick();
            if let Some(change) = change {
                if tx.send(change).await.is_err() {
                    break;
                }
            }
        }
    });

    tracing::info!(interval_ms = period.as_millis() as u64, "Live pricing started");

    let mut seen = 0u32;
    let mut closed = false;
    loop {
        tokio::select! {
            change = rx.recv() => {
                let Some(change) = change else {
                    closed = true;
                    break;
                };
                let snapshot = store.read().await.snapshot();
                println!(
                    "{} {:<26} {:>18} -> {:>18} | basic {} | optimal {}",
                    change.trend.symbol(),
                    change.id,
                    locale.format_currency(change.old_price),
                    locale.format_currency(change.new_price),
                    locale.format_currency(full_total(Variant::Basic, &snapshot)),
                    locale.format_currency(full_total(Variant::Optimal, &snapshot)),
                );
                seen += 1;
                if ticks.is_some_and(|limit| seen >= limit) {
                    break;
                }
            }
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    if closed {
        // The writer only drops its sender by exiting
        ticker.await.context("Price ticker task failed")?;
    } else {
        ticker.abort();
    }
    tracing::info!(updates = seen, "Live pricing stopped");
    Ok(())
}

fn full_total(variant: Variant, prices: &impl PriceLookup) -> proposal_core::Amount {
    Selection::new(variant, Preset::Full).compose(prices).total_price
}

/// What to export
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub format: DocumentFormat,
    pub variants: Vec<Variant>,
    pub preset: Preset,
    pub toggles: Vec<String>,
    pub file_name: Option<String>,
}

fn compose_quotes(
    variants: &[Variant],
    preset: Preset,
    toggles: &[String],
    prices: &impl PriceLookup,
) -> Vec<NamedQuote> {
    let mut variants = variants.to_vec();
    let mut seen = Vec::new();
    variants.retain(|v| {
        let first = !seen.contains(v);
        seen.push(*v);
        first
    });

    let quotes: Vec<NamedQuote> = variants
        .iter()
        .map(|&variant| {
            let (selection, _) = build_selection(variant, preset, toggles);
            compose_named(&selection, prices)
        })
        .collect();

    for id in toggles {
        let known = variants
            .iter()
            .any(|&v| variant_items(v).iter().any(|e| &e.id == id));
        if !known {
            tracing::warn!(id = %id, "Item is not part of any selected variant, ignoring");
        }
    }

    quotes
}

pub async fn export(config: &AppConfig, request: ExportRequest) -> anyhow::Result<()> {
    let store = price_store(config);
    let quotes = compose_quotes(&request.variants, request.preset, &request.toggles, &store);

    let export = &config.export;
    let timeout = std::time::Duration::from_millis(export.timeout_ms);
    let font_source = HttpFontSource::new(timeout).context("Failed to create HTTP client")?;
    let pdf = PdfExporter::new(Arc::new(font_source))
        .with_timeout(timeout)
        .with_font_urls(FontUrls {
            regular: export.font_url.clone(),
            bold: export.bold_font_url.clone(),
        });
    let exporter = ProposalExporter::new(pdf);

    let options = ExportOptions {
        locale: export.locale,
        title: export.title.clone(),
        subtitle: export.subtitle.clone(),
        file_name: request.file_name,
        date: None,
    };

    let document = exporter
        .export(&quotes, request.format, &options)
        .await
        .context("Export failed")?;

    tokio::fs::create_dir_all(&export.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", export.output_dir.display()))?;
    let path = export.output_dir.join(&document.file_name);
    tokio::fs::write(&path, &document.bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    match document.page_count {
        Some(pages) => println!(
            "{} ({} bytes, {} pages)",
            path.display(),
            document.bytes.len(),
            pages
        ),
        None => println!("{} ({} bytes)", path.display(), document.bytes.len()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proposal_core::{CatalogSeed, Payback};

    fn seed_prices() -> std::collections::BTreeMap<String, proposal_core::Amount> {
        let mut store = PriceStore::seeded(1);
        store.initialize(&CatalogSeed::builtin());
        store.snapshot()
    }

    #[test]
    fn test_selection_ignores_foreign_ids() {
        let toggles = vec!["yadro-g4208p".to_string(), "alt-linux".to_string()];
        let (selection, unknown) = build_selection(Variant::Basic, Preset::Full, &toggles);

        assert_eq!(unknown, vec!["yadro-g4208p".to_string()]);
        assert!(!selection.is_included("alt-linux"));
    }

    #[test]
    fn test_render_catalog_header() {
        let mut store = PriceStore::seeded(3);
        store.initialize(&CatalogSeed::builtin());
        let date = Locale::EnUs.format_short_date(store.last_update().date_naive());

        let paused = render_catalog(&store, Locale::EnUs);
        let header = paused.lines().next().unwrap();
        assert!(header.contains(&date));
        assert!(header.ends_with("(paused)"));
        assert_eq!(paused.lines().count(), 1 + store.items().count());

        store.set_live(true);
        let live = render_catalog(&store, Locale::EnUs);
        assert!(live.lines().next().unwrap().ends_with("(live)"));
    }

    #[test]
    fn test_compose_quotes_dedups_and_orders() {
        let quotes = compose_quotes(
            &[Variant::Basic, Variant::Optimal, Variant::Basic],
            Preset::Full,
            &[],
            &seed_prices(),
        );

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].variant, Some(Variant::Basic));
        assert_eq!(quotes[1].variant, Some(Variant::Optimal));
    }

    #[test]
    fn test_render_roi_reference() {
        let estimate = estimate_roi(&RoiInputs::default(), &Default::default());
        let text = render_roi(&estimate, Locale::EnUs);

        assert!(text.contains("RUB\u{a0}30,750,000"));
        assert!(text.contains("8.4 months"));
        assert!(text.contains("256%"));
    }

    #[test]
    fn test_render_roi_not_recoverable() {
        let inputs = RoiInputs {
            doc_volume: 0.0,
            ..RoiInputs::default()
        };
        let estimate = estimate_roi(&inputs, &Default::default());
        assert_eq!(estimate.payback, Payback::NotRecoverable);
        assert!(render_roi(&estimate, Locale::RuRu).contains("not recoverable"));
    }

    #[test]
    fn test_render_quote_has_total_line() {
        let (selection, _) = build_selection(Variant::Basic, Preset::Minimal, &[]);
        let named = compose_named(&selection, &seed_prices());
        let text = render_quote(&named, Locale::RuRu);

        let last = text.lines().last().unwrap();
        assert!(last.trim_start().starts_with("TOTAL"));
        assert!(last.ends_with(&Locale::RuRu.format_currency(named.quote.total_price)));
    }

    #[tokio::test]
    async fn test_live_rejects_zero_interval() {
        let mut config = AppConfig::default();
        config.pricing.tick_interval = std::time::Duration::ZERO;

        let err = live(&config, Some(3)).await.unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[tokio::test]
    async fn test_live_stops_after_tick_limit() {
        let mut config = AppConfig::default();
        config.pricing.tick_interval = std::time::Duration::from_millis(1);
        config.pricing.seed = Some(7);

        live(&config, Some(2)).await.unwrap();
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("абвгдеёжзи", 5), "абвг…");
    }
}
