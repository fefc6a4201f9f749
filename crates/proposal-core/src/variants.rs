//! Variant bundles, presets and the toggleable selection set

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::PriceLookup;
use crate::error::ProposalError;
use crate::model::{Amount, Category, PriceSource, Quote, Variant};
use crate::quote::compose_quote;

/// One entry a user can select for a quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub id: String,
    pub name: String,
    pub qty: u32,
    pub category: Category,
    pub pricing: PriceSource,
}

impl SelectionEntry {
    pub fn catalog(id: &str, name: &str, qty: u32, category: Category) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            qty,
            category,
            pricing: PriceSource::Catalog,
        }
    }

    pub fn fixed(id: &str, name: &str, qty: u32, category: Category, amount: Amount) -> Self {
        Self {
            pricing: PriceSource::Fixed { amount },
            ..Self::catalog(id, name, qty, category)
        }
    }
}

/// Preset inclusion states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// The variant's server plus its implementation phases
    Minimal,
    /// Every item of the variant
    Full,
}

impl FromStr for Preset {
    type Err = ProposalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minimal" => Ok(Preset::Minimal),
            "full" => Ok(Preset::Full),
            other => Err(ProposalError::UnknownPreset(other.to_string())),
        }
    }
}

const OS_NAME: &str =
    "ОС Альт СП / 4305 / Лицензия на право использования Альт СП Сервер релиз 10";
const POSTGRES_NAME: &str = "Лицензия СУБД Postgres Pro Certified на 1 ядро x86-64";
const VIRTUALIZATION_NAME: &str = "Альт Виртуализация / 6487 / Лицензия на право использования Альт Виртуализация 11 редакция PVE";

/// Ordered item list of a variant
pub fn variant_items(variant: Variant) -> Vec<SelectionEntry> {
    use Category::*;

    match variant {
        Variant::Basic => vec![
            SelectionEntry::catalog("graviton-h22i", "Сервер Гравитон С2122ИУ", 1, Hardware),
            SelectionEntry::catalog("eltex-mes2300-24", "Коммутатор Eltex MES2300-24", 1, Hardware),
            SelectionEntry::catalog("alt-linux", OS_NAME, 1, Software),
            SelectionEntry::catalog("postgres-pro", POSTGRES_NAME, 4, Software),
            SelectionEntry::catalog("ml-platform", "ML Платформа", 1, Software),
            SelectionEntry::catalog("data-connectors", "Коннекторы данных", 1, Software),
            SelectionEntry::catalog("impl-basic-phase-1", "Внедрение: Этап 1 (Анализ)", 1, Implementation),
            SelectionEntry::catalog("impl-basic-phase-2", "Внедрение: Этап 2 (Развертывание)", 1, Implementation),
            SelectionEntry::catalog("impl-basic-phase-3", "Внедрение: Этап 3 (Запуск)", 1, Implementation),
        ],
        Variant::Optimal => vec![
            SelectionEntry::catalog("yadro-g4208p", "Сервер YADRO G4208P G3", 1, Hardware),
            SelectionEntry::catalog("eltex-mes2300-24", "Коммутатор Eltex MES2300-24", 1, Hardware),
            SelectionEntry::catalog("alt-linux", OS_NAME, 1, Software),
            SelectionEntry::catalog("postgres-pro", POSTGRES_NAME, 4, Software),
            SelectionEntry::catalog("alt-virtualization", VIRTUALIZATION_NAME, 3, Software),
            SelectionEntry::catalog("ml-platform", "ML Платформа", 1, Software),
            SelectionEntry::catalog("data-connectors", "Коннекторы данных", 1, Software),
            SelectionEntry::fixed("ai-module-ocr", "Модуль: Документооборот (OCR)", 1, Software, 500_000),
            SelectionEntry::fixed("ai-module-estimates", "Модуль: Сметы и Закупки", 1, Software, 750_000),
            SelectionEntry::fixed("ai-module-video", "Модуль: Видеоаналитика", 1, Software, 1_200_000),
            SelectionEntry::catalog("impl-optimal-phase-1", "Внедрение: Этап 1 (Анализ)", 1, Implementation),
            SelectionEntry::catalog("impl-optimal-phase-2", "Внедрение: Этап 2 (Развертывание)", 1, Implementation),
            SelectionEntry::catalog("impl-optimal-phase-3", "Внедрение: Этап 3 (Запуск)", 1, Implementation),
        ],
        Variant::Budget => vec![
            SelectionEntry::catalog("server-budget", "Сервер начального уровня", 1, Hardware),
            SelectionEntry::catalog("storage-budget", "Сетевое хранилище NAS", 1, Hardware),
            SelectionEntry::catalog("switch-budget", "Коммутатор L2", 1, Hardware),
            SelectionEntry::catalog("linux-free", "ОС Linux (Community)", 1, Software),
            SelectionEntry::catalog("postgres-free", "СУБД PostgreSQL (Community)", 1, Software),
            SelectionEntry::catalog("virtualization-free", "Виртуализация KVM/Proxmox", 1, Software),
            SelectionEntry::catalog("ml-platform-opensource", "ML-инструменты (Open Source)", 1, Software),
            SelectionEntry::catalog("connectors-opensource", "Коннекторы (Open Source)", 1, Software),
            SelectionEntry::catalog("impl-budget-phase-1", "Внедрение: Этап 1 (Упрощенный анализ)", 1, Implementation),
            SelectionEntry::catalog("impl-budget-phase-2", "Внедрение: Этап 2 (Базовое развертывание)", 1, Implementation),
            SelectionEntry::catalog("impl-budget-phase-3", "Внедрение: Этап 3 (Обучение)", 1, Implementation),
        ],
    }
}

/// Ids included by a preset
pub fn preset_ids(variant: Variant, preset: Preset) -> BTreeSet<String> {
    let items = variant_items(variant);
    match preset {
        Preset::Full => items.into_iter().map(|entry| entry.id).collect(),
        Preset::Minimal => {
            let server = match variant {
                Variant::Basic => "graviton-h22i",
                Variant::Optimal => "yadro-g4208p",
                Variant::Budget => "server-budget",
            };
            items
                .into_iter()
                .filter(|entry| entry.id == server || entry.category == Category::Implementation)
                .map(|entry| entry.id)
                .collect()
        }
    }
}

/// The set of included item ids for one variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    variant: Variant,
    included: BTreeSet<String>,
}

impl Selection {
    pub fn new(variant: Variant, preset: Preset) -> Self {
        Self {
            variant,
            included: preset_ids(variant, preset),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Flip the inclusion state of an id; returns the new state
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.included.remove(id) {
            false
        } else {
            self.included.insert(id.to_string());
            true
        }
    }

    pub fn is_included(&self, id: &str) -> bool {
        self.included.contains(id)
    }

    /// Variant entries that are currently included, in variant order
    pub fn entries(&self) -> Vec<SelectionEntry> {
        variant_items(self.variant)
            .into_iter()
            .filter(|entry| self.included.contains(&entry.id))
            .collect()
    }

    pub fn compose(&self, catalog: &impl PriceLookup) -> Quote {
        compose_quote(&self.entries(), catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_variant_sizes() {
        assert_eq!(variant_items(Variant::Basic).len(), 9);
        assert_eq!(variant_items(Variant::Optimal).len(), 13);
        assert_eq!(variant_items(Variant::Budget).len(), 11);
    }

    #[test]
    fn test_minimal_preset() {
        let ids = preset_ids(Variant::Basic, Preset::Minimal);
        let expected: BTreeSet<String> = [
            "graviton-h22i",
            "impl-basic-phase-1",
            "impl-basic-phase-2",
            "impl-basic-phase-3",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_full_preset_is_every_item() {
        let selection = Selection::new(Variant::Optimal, Preset::Full);
        assert_eq!(selection.entries(), variant_items(Variant::Optimal));
    }

    #[test]
    fn test_toggle_reports_state() {
        let mut selection = Selection::new(Variant::Basic, Preset::Minimal);
        assert!(!selection.is_included("alt-linux"));
        assert!(selection.toggle("alt-linux"));
        assert!(selection.is_included("alt-linux"));
        assert!(!selection.toggle("alt-linux"));
    }

    #[test]
    fn test_entries_keep_variant_order() {
        let mut selection = Selection::new(Variant::Basic, Preset::Minimal);
        selection.toggle("postgres-pro");
        let ids: Vec<String> = selection.entries().into_iter().map(|e| e.id).collect();
        assert_eq!(
            ids,
            vec![
                "graviton-h22i",
                "postgres-pro",
                "impl-basic-phase-1",
                "impl-basic-phase-2",
                "impl-basic-phase-3"
            ]
        );
    }

    fn variant_strategy() -> impl Strategy<Value = Variant> {
        prop_oneof![
            Just(Variant::Basic),
            Just(Variant::Optimal),
            Just(Variant::Budget)
        ]
    }

    proptest! {
        #[test]
        fn double_toggle_restores_selection(
            variant in variant_strategy(),
            full in any::<bool>(),
            id in "[a-z-]{1,24}",
        ) {
            let preset = if full { Preset::Full } else { Preset::Minimal };
            let mut selection = Selection::new(variant, preset);
            let original = selection.clone();

            selection.toggle(&id);
            selection.toggle(&id);
            prop_assert_eq!(selection, original);
        }
    }
}
