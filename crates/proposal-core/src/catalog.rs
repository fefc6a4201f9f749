//! Pricing catalog store
//!
//! Holds the simulated "live" price of every catalog entry. The store is an
//! owned value with an explicit `initialize` / `tick` / `set_live` lifecycle;
//! whoever composes the page (the CLI here) owns it and drives the timer.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::model::{Amount, CatalogItem, Trend};

/// Maximum relative fluctuation applied by a single tick (±2%)
pub const MAX_FLUCTUATION: f64 = 0.02;

/// Live prices are rounded to this step
pub const PRICE_STEP: f64 = 1000.0;

/// Currency of every seeded entry
pub const DEFAULT_CURRENCY: &str = "RUB";

/// A single seed entry: id, display name and base price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedEntry {
    pub id: String,
    pub name: String,
    pub base_price: Amount,
}

/// Static id → base price mapping loaded at start-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSeed {
    pub entries: Vec<SeedEntry>,
}

impl CatalogSeed {
    /// The built-in equipment, license and service prices
    pub fn builtin() -> Self {
        const SEED: &[(&str, &str, Amount)] = &[
            ("graviton-h22i", "Сервер Гравитон Н22И", 9_122_600),
            ("das-storage", "Дисковая полка DAS", 900_000),
            ("eltex-mes2300-24", "Коммутатор Eltex MES2300-24", 186_550),
            ("yadro-g4208p", "Сервер YADRO G4208P G3", 18_390_000),
            ("aerodisk-storage", "СХД Аэродиск", 9_800_000),
            ("eltex-mes5324", "Коммутатор Eltex MES5324", 499_000),
            ("alt-linux", "ОС Альт СП Сервер", 48_600),
            ("alt-virtualization", "Альт Виртуализация PVE", 101_200),
            ("postgres-pro", "СУБД Postgres Pro Certified", 238_781),
            ("ml-platform", "ML Платформа", 800_000),
            ("data-connectors", "Коннекторы данных", 850_000),
            ("impl-basic-phase-1", "Внедрение (базовый): Анализ", 3_000_000),
            ("impl-basic-phase-2", "Внедрение (базовый): Развертывание", 5_000_000),
            ("impl-basic-phase-3", "Внедрение (базовый): Запуск", 3_000_000),
            ("impl-optimal-phase-1", "Внедрение (оптимальный): Анализ", 5_000_000),
            ("impl-optimal-phase-2", "Внедрение (оптимальный): Развертывание", 7_000_000),
            ("impl-optimal-phase-3", "Внедрение (оптимальный): Запуск", 4_000_000),
            ("server-budget", "Сервер начального уровня", 1_200_000),
            ("storage-budget", "Сетевое хранилище NAS", 300_000),
            ("switch-budget", "Коммутатор L2", 45_000),
            ("linux-free", "ОС Linux (Community)", 0),
            ("postgres-free", "СУБД PostgreSQL (Community)", 0),
            ("virtualization-free", "Виртуализация KVM/Proxmox", 0),
            ("ml-platform-opensource", "ML-инструменты (Open Source)", 0),
            ("connectors-opensource", "Коннекторы (Open Source)", 0),
            ("impl-budget-phase-1", "Внедрение (бюджетный): Анализ", 1_000_000),
            ("impl-budget-phase-2", "Внедрение (бюджетный): Развертывание", 1_500_000),
            ("impl-budget-phase-3", "Внедрение (бюджетный): Обучение", 500_000),
        ];

        Self {
            entries: SEED
                .iter()
                .map(|(id, name, price)| SeedEntry {
                    id: id.to_string(),
                    name: name.to_string(),
                    base_price: *price,
                })
                .collect(),
        }
    }

    /// Replace base prices (or add entries) from a configuration table
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, Amount>) -> Self {
        for (id, price) in overrides {
            match self.entries.iter_mut().find(|entry| &entry.id == id) {
                Some(entry) => entry.base_price = *price,
                None => self.entries.push(SeedEntry {
                    id: id.clone(),
                    name: id.clone(),
                    base_price: *price,
                }),
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CatalogSeed {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Read access to unit prices by catalog id
pub trait PriceLookup {
    fn current_price(&self, id: &str) -> Option<Amount>;
}

impl PriceLookup for HashMap<String, Amount> {
    fn current_price(&self, id: &str) -> Option<Amount> {
        self.get(id).copied()
    }
}

impl PriceLookup for BTreeMap<String, Amount> {
    fn current_price(&self, id: &str) -> Option<Amount> {
        self.get(id).copied()
    }
}

/// Result of a tick that mutated an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceChange {
    pub id: String,
    pub old_price: Amount,
    pub new_price: Amount,
    pub trend: Trend,
}

/// Mutable store of simulated live prices
#[derive(Debug)]
pub struct PriceStore<R = StdRng> {
    items: BTreeMap<String, CatalogItem>,
    live: bool,
    last_update: DateTime<Utc>,
    rng: R,
}

impl PriceStore<StdRng> {
    /// Create an empty store with an entropy-seeded generator
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an empty store whose drift is reproducible
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for PriceStore<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> PriceStore<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            items: BTreeMap::new(),
            live: false,
            last_update: Utc::now(),
            rng,
        }
    }

    /// Populate the store, resetting every current price to its base price
    pub fn initialize(&mut self, seed: &CatalogSeed) {
        let now = Utc::now();
        self.items = seed
            .entries
            .iter()
            .map(|entry| {
                let item = CatalogItem {
                    id: entry.id.clone(),
                    name: entry.name.clone(),
                    currency: DEFAULT_CURRENCY.to_string(),
                    base_price: entry.base_price,
                    current_price: entry.base_price,
                    trend: Trend::Stable,
                    last_updated: now,
                };
                (entry.id.clone(), item)
            })
            .collect();
        self.last_update = now;

        tracing::debug!("Price store initialized with {} entries", self.items.len());
    }

    /// Gate whether `tick` has any effect. Prices are kept as they are.
    pub fn set_live(&mut self, enabled: bool) {
        self.live = enabled;
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Apply one random fluctuation to one random entry
    ///
    /// Returns `None` when live mode is off or the store is empty; the
    /// caller's timer keeps firing either way.
    pub fn tick(&mut self) -> Option<PriceChange> {
        if !self.live || self.items.is_empty() {
            return None;
        }

        let index = self.rng.gen_range(0..self.items.len());
        let fluctuation = self.rng.gen_range(-MAX_FLUCTUATION..=MAX_FLUCTUATION);
        let item = self.items.values_mut().nth(index)?;

        let old_price = item.current_price;
        let new_price = round_to_step(old_price as f64 * (1.0 + fluctuation));
        let trend = Trend::between(old_price, new_price);
        let now = Utc::now();

        item.current_price = new_price;
        item.trend = trend;
        item.last_updated = now;
        self.last_update = now;

        tracing::debug!(
            id = %item.id,
            old_price,
            new_price,
            "Simulated price update"
        );

        Some(PriceChange {
            id: item.id.clone(),
            old_price,
            new_price,
            trend,
        })
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.get(id)
    }

    /// Entries ordered by id
    pub fn items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    /// Copy of every current price, detached from the store
    pub fn snapshot(&self) -> BTreeMap<String, Amount> {
        self.items
            .values()
            .map(|item| (item.id.clone(), item.current_price))
            .collect()
    }
}

impl<R> PriceLookup for PriceStore<R> {
    fn current_price(&self, id: &str) -> Option<Amount> {
        self.items.get(id).map(|item| item.current_price)
    }
}

/// Round a price to the nearest step, never below zero
pub fn round_to_step(price: f64) -> Amount {
    if !price.is_finite() {
        return 0;
    }
    ((price / PRICE_STEP).round() * PRICE_STEP).max(0.0) as Amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn live_store(seed: u64) -> PriceStore {
        let mut store = PriceStore::seeded(seed);
        store.initialize(&CatalogSeed::builtin());
        store.set_live(true);
        store
    }

    #[test]
    fn test_initialize_resets_to_base() {
        let store = live_store(1);
        assert_eq!(store.len(), CatalogSeed::builtin().len());
        for item in store.items() {
            assert_eq!(item.current_price, item.base_price);
            assert_eq!(item.trend, Trend::Stable);
        }
    }

    #[test]
    fn test_reinitialize_discards_drift() {
        let mut store = live_store(7);
        for _ in 0..50 {
            store.tick();
        }
        store.initialize(&CatalogSeed::builtin());
        assert!(store.items().all(|item| item.current_price == item.base_price));
    }

    #[test]
    fn test_tick_is_noop_when_not_live() {
        let mut store = live_store(3);
        store.set_live(false);
        let before = store.snapshot();

        assert!(store.tick().is_none());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_toggle_live_keeps_prices() {
        let mut store = live_store(11);
        for _ in 0..10 {
            store.tick();
        }
        let drifted = store.snapshot();
        store.set_live(false);
        store.set_live(true);
        assert_eq!(store.snapshot(), drifted);
    }

    #[test]
    fn test_tick_on_empty_store() {
        let mut store = PriceStore::seeded(5);
        store.set_live(true);
        assert!(store.tick().is_none());
    }

    #[test]
    fn test_tick_sets_trend() {
        let mut store = live_store(42);
        let change = store.tick().unwrap();
        let item = store.get(&change.id).unwrap();

        assert_eq!(item.current_price, change.new_price);
        assert_eq!(item.trend, Trend::between(change.old_price, change.new_price));
    }

    #[test]
    fn test_round_to_step() {
        assert_eq!(round_to_step(9_122_600.0), 9_123_000);
        assert_eq!(round_to_step(186_499.0), 186_000);
        assert_eq!(round_to_step(186_500.0), 187_000);
        assert_eq!(round_to_step(-5.0), 0);
        assert_eq!(round_to_step(f64::NAN), 0);
    }

    #[test]
    fn test_overrides_merge() {
        let mut overrides = BTreeMap::new();
        overrides.insert("alt-linux".to_string(), 50_000);
        overrides.insert("gpu-node".to_string(), 2_000_000);

        let seed = CatalogSeed::builtin().with_overrides(&overrides);
        let mut store = PriceStore::seeded(0);
        store.initialize(&seed);

        assert_eq!(store.current_price("alt-linux"), Some(50_000));
        assert_eq!(store.current_price("gpu-node"), Some(2_000_000));
    }

    proptest! {
        #[test]
        fn tick_moves_exactly_one_entry_within_bounds(seed in any::<u64>()) {
            let mut store = live_store(seed);
            let before = store.snapshot();

            let change = store.tick().unwrap();
            let after = store.snapshot();

            let low = round_to_step(change.old_price as f64 * (1.0 - MAX_FLUCTUATION));
            let high = round_to_step(change.old_price as f64 * (1.0 + MAX_FLUCTUATION));
            prop_assert!(change.new_price >= low && change.new_price <= high);
            prop_assert_eq!(change.new_price % 1000, 0);

            for (id, price) in &before {
                if id != &change.id {
                    prop_assert_eq!(after.get(id), Some(price));
                }
            }
        }
    }
}
