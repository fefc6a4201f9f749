//! Configuration parsing
//!
//! This module provides TOML-based configuration for the price simulation,
//! the ROI model constants and the document exporters. Every section and
//! field is optional; an empty file yields the built-in defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogSeed;
use crate::format::Locale;
use crate::model::Amount;
use crate::roi::RoiAssumptions;

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Live price simulation settings
    pub pricing: PricingConfig,
    /// Savings model constants
    pub roi: RoiAssumptions,
    /// Document export settings
    pub export: ExportConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the price ticker cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.pricing.tick_interval.is_zero(),
            "pricing.tick_interval_ms must be greater than zero"
        );
        Ok(())
    }

    /// The catalog seed with the configured base-price overrides applied
    pub fn catalog_seed(&self) -> CatalogSeed {
        CatalogSeed::builtin().with_overrides(&self.pricing.overrides)
    }
}

/// Live price simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Timer period between simulated price updates
    #[serde(with = "duration_ms", rename = "tick_interval_ms")]
    pub tick_interval: Duration,
    /// Start with live mode enabled
    pub live: bool,
    /// Fixed RNG seed for reproducible drift
    pub seed: Option<u64>,
    /// Base price overrides keyed by catalog id
    pub overrides: BTreeMap<String, Amount>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(5000),
            live: false,
            seed: None,
            overrides: BTreeMap::new(),
        }
    }
}

/// Document export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub locale: Locale,
    /// Directory the generated files are written to
    pub output_dir: PathBuf,
    /// Optional regular-weight font fetched before rendering
    pub font_url: Option<String>,
    /// Optional bold font; the regular font is reused when absent
    pub bold_font_url: Option<String>,
    /// Render timeout in milliseconds
    pub timeout_ms: u64,
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            output_dir: PathBuf::from("."),
            font_url: None,
            bold_font_url: None,
            timeout_ms: 10_000,
            title: None,
            subtitle: None,
        }
    }
}

/// Serde module for serializing/deserializing Duration as milliseconds
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}
