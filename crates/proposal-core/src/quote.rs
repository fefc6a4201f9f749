//! Quote composition
//!
//! Pure function of a selection and a catalog snapshot. Every change to
//! either input means calling `compose_quote` again; nothing is cached.

use crate::catalog::PriceLookup;
use crate::model::{Amount, LineItem, NamedQuote, PriceSource, Quote};
use crate::variants::{Selection, SelectionEntry};

/// Resolve the unit price of a selected entry
///
/// Fixed prices win over the catalog. An id missing from the catalog
/// resolves to zero so a proposal can be rendered while prices load.
pub fn resolve_price(entry: &SelectionEntry, catalog: &impl PriceLookup) -> Amount {
    match entry.pricing {
        PriceSource::Fixed { amount } => amount,
        PriceSource::Catalog => catalog.current_price(&entry.id).unwrap_or(0),
    }
}

/// Turn a selection into priced line items and a grand total
pub fn compose_quote(selection: &[SelectionEntry], catalog: &impl PriceLookup) -> Quote {
    let items: Vec<LineItem> = selection
        .iter()
        .map(|entry| LineItem {
            id: entry.id.clone(),
            name: entry.name.clone(),
            qty: entry.qty,
            price: resolve_price(entry, catalog),
            category: entry.category,
        })
        .collect();

    let total_price = items
        .iter()
        .map(LineItem::line_total)
        .fold(0, Amount::saturating_add);

    Quote { items, total_price }
}

/// Compose a quote and label it with the variant's display name
pub fn compose_named(selection: &Selection, catalog: &impl PriceLookup) -> NamedQuote {
    let variant = selection.variant();
    NamedQuote {
        name: variant.display_name().to_string(),
        variant: Some(variant),
        quote: selection.compose(catalog),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use super::*;
    use crate::catalog::{CatalogSeed, PriceStore};
    use crate::model::{Category, Variant};
    use crate::variants::Preset;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn prices(pairs: &[(&str, Amount)]) -> HashMap<String, Amount> {
        pairs.iter().map(|(id, p)| (id.to_string(), *p)).collect()
    }

    #[test]
    fn test_fixed_price_overrides_catalog() {
        let entry = SelectionEntry::fixed("ai-module-ocr", "OCR", 1, Category::Software, 500_000);
        let catalog = prices(&[("ai-module-ocr", 1)]);
        assert_eq!(resolve_price(&entry, &catalog), 500_000);
    }

    #[test]
    fn test_missing_price_is_zero() {
        let entry = SelectionEntry::catalog("unknown", "Unknown", 3, Category::Hardware);
        let quote = compose_quote(&[entry], &prices(&[]));

        assert_eq!(quote.items[0].price, 0);
        assert_eq!(quote.total_price, 0);
    }

    #[test]
    fn test_basic_full_quote_at_base_prices() {
        let mut store = PriceStore::seeded(0);
        store.initialize(&CatalogSeed::builtin());

        let quote = Selection::new(Variant::Basic, Preset::Full).compose(&store);

        // 9 122 600 + 186 550 + 48 600 + 4 * 238 781 + 800 000 + 850 000 + 11 000 000
        assert_eq!(quote.items.len(), 9);
        assert_eq!(quote.total_price, 22_962_874);
        assert_eq!(quote.subtotal(Category::Implementation), 11_000_000);
    }

    #[test]
    fn test_optimal_full_quote_includes_fixed_modules() {
        let mut store = PriceStore::seeded(0);
        store.initialize(&CatalogSeed::builtin());

        let named = compose_named(&Selection::new(Variant::Optimal, Preset::Full), &store);
        let modules: Vec<Amount> = named
            .quote
            .items
            .iter()
            .filter(|item| item.id.starts_with("ai-module"))
            .map(|item| item.price)
            .collect();

        assert_eq!(named.name, "Оптимальный");
        assert_eq!(modules, vec![500_000, 750_000, 1_200_000]);
    }

    #[test]
    fn test_huge_override_saturates_total() {
        let overrides = BTreeMap::from([("postgres-pro".to_string(), 9_000_000_000_000_000_000)]);
        let mut store = PriceStore::seeded(0);
        store.initialize(&CatalogSeed::builtin().with_overrides(&overrides));

        let quote = Selection::new(Variant::Basic, Preset::Full).compose(&store);

        assert_eq!(quote.items.len(), 9);
        assert_eq!(quote.total_price, Amount::MAX);
        assert_eq!(quote.subtotal(Category::Software), Amount::MAX);
    }

    #[test]
    fn test_empty_selection() {
        let quote = compose_quote(&[], &prices(&[]));
        assert!(quote.is_empty());
        assert_eq!(quote.total_price, 0);
    }

    fn entry_strategy() -> impl Strategy<Value = SelectionEntry> {
        (
            "[a-z]{1,8}",
            1u32..50,
            prop::option::of(0u64..50_000_000),
        )
            .prop_map(|(id, qty, fixed)| match fixed {
                Some(amount) => SelectionEntry::fixed(&id, &id, qty, Category::Software, amount),
                None => SelectionEntry::catalog(&id, &id, qty, Category::Hardware),
            })
    }

    proptest! {
        #[test]
        fn total_equals_sum_of_line_totals(
            selection in prop::collection::vec(entry_strategy(), 0..20),
            catalog in prop::collection::hash_map("[a-z]{1,8}", 0u64..50_000_000, 0..20),
        ) {
            let quote = compose_quote(&selection, &catalog);
            let manual: Amount = quote.items.iter().map(|item| item.price * item.qty as Amount).sum();

            prop_assert_eq!(quote.total_price, manual);
            prop_assert_eq!(quote.items.len(), selection.len());
        }
    }
}
