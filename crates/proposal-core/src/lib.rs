//! Pricing and quoting core for the AI-agent deployment proposal
//!
//! This crate holds everything the proposal pages compute:
//! - Pricing catalog store with simulated live price drift
//! - Quote composition over variant bundles, presets and selections
//! - ROI estimation with overridable business constants
//! - Locale-aware currency and date formatting
//!
//! All computation is pure and synchronous. The only mutable state is the
//! `PriceStore`, owned by the caller and driven by the caller's timer.

pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod quote;
pub mod recommend;
pub mod roi;
pub mod variants;

pub use catalog::{CatalogSeed, PriceChange, PriceLookup, PriceStore};
pub use config::AppConfig;
pub use error::ProposalError;
pub use format::Locale;
pub use model::{
    Amount, CatalogItem, Category, LineItem, NamedQuote, PriceSource, Quote, Trend, Variant,
};
pub use quote::{compose_named, compose_quote};
pub use recommend::{recommend, Requirements};
pub use roi::{estimate_roi, InvestmentTier, Payback, RoiAssumptions, RoiEstimate, RoiInputs};
pub use variants::{Preset, Selection, SelectionEntry};
