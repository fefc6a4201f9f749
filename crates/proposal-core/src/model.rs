//! Core data model shared by the pricing, quoting and export layers

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProposalError;

/// Whole currency units (roubles). Prices never carry fractional parts.
pub type Amount = u64;

/// Line item category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Hardware,
    Software,
    Implementation,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hardware => "hardware",
            Category::Software => "software",
            Category::Implementation => "implementation",
        }
    }
}

/// Predefined proposal tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Basic,
    Optimal,
    Budget,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Basic, Variant::Optimal, Variant::Budget];

    /// Stable key used in file names and on the command line
    pub fn key(&self) -> &'static str {
        match self {
            Variant::Basic => "basic",
            Variant::Optimal => "optimal",
            Variant::Budget => "budget",
        }
    }

    /// Short display name used as the document heading
    pub fn display_name(&self) -> &'static str {
        match self {
            Variant::Basic => "Базовый",
            Variant::Optimal => "Оптимальный",
            Variant::Budget => "Бюджетный",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Variant {
    type Err = ProposalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Variant::Basic),
            "optimal" => Ok(Variant::Optimal),
            "budget" => Ok(Variant::Budget),
            other => Err(ProposalError::UnknownVariant(other.to_string())),
        }
    }
}

/// Direction of the most recent price change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

impl Trend {
    /// Compare a new price against the previous one
    pub fn between(old: Amount, new: Amount) -> Self {
        match new.cmp(&old) {
            std::cmp::Ordering::Greater => Trend::Up,
            std::cmp::Ordering::Less => Trend::Down,
            std::cmp::Ordering::Equal => Trend::Stable,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
            Trend::Stable => "–",
        }
    }
}

/// A catalog entry with its simulated live price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub currency: String,
    pub base_price: Amount,
    pub current_price: Amount,
    pub trend: Trend,
    pub last_updated: DateTime<Utc>,
}

/// Where a selected entry takes its unit price from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceSource {
    /// Current price of the catalog entry with the same id
    Catalog,
    /// Item-specific price that ignores the catalog
    Fixed { amount: Amount },
}

/// One priced, quantified entry within a quote or document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub qty: u32,
    pub price: Amount,
    pub category: Category,
}

impl LineItem {
    /// Price times quantity, saturating at `Amount::MAX`
    pub fn line_total(&self) -> Amount {
        self.price.saturating_mul(Amount::from(self.qty))
    }
}

/// A computed list of line items plus their total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub items: Vec<LineItem>,
    pub total_price: Amount,
}

impl Quote {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line totals restricted to one category
    pub fn subtotal(&self, category: Category) -> Amount {
        self.items
            .iter()
            .filter(|item| item.category == category)
            .map(LineItem::line_total)
            .fold(0, Amount::saturating_add)
    }
}

/// A named quote, the unit the document exporters render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedQuote {
    pub name: String,
    pub variant: Option<Variant>,
    pub quote: Quote,
}
