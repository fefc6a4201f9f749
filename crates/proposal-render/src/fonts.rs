//! Font loading and caching
//!
//! The PDF exporter always has the fonts embedded by `typst-assets`. A
//! regular and an optional bold font can be fetched by URL on top of them;
//! any fetch or parse failure only logs a warning and the document is set
//! in the embedded fonts instead.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use typst::foundations::Bytes;
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;

use crate::error::ExportError;

/// Embedded families used when no fetched font is available (both cover Cyrillic)
pub const FALLBACK_FAMILIES: [&str; 2] = ["Libertinus Serif", "New Computer Modern"];

static EMBEDDED: OnceLock<Arc<FontCache>> = OnceLock::new();

/// Shared cache holding only the embedded fonts
pub fn embedded_font_cache() -> Arc<FontCache> {
    EMBEDDED
        .get_or_init(|| Arc::new(FontCache::with_extra(Vec::new())))
        .clone()
}

/// Fonts available to one compilation
#[derive(Debug)]
pub struct FontCache {
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    /// Families contributed by fetched fonts, in fetch order
    extra_families: Vec<String>,
}

impl FontCache {
    /// Embedded fonts plus the given raw font files
    ///
    /// Data that does not parse as a font is skipped.
    pub fn with_extra(extra: Vec<Vec<u8>>) -> Self {
        let mut book = FontBook::new();
        let mut fonts = Vec::new();
        let mut extra_families = Vec::new();

        for data in extra {
            let before = fonts.len();
            for font in Font::iter(Bytes::from(data)) {
                let family = font.info().family.clone();
                if !extra_families.contains(&family) {
                    extra_families.push(family);
                }
                book.push(font.info().clone());
                fonts.push(font);
            }
            if fonts.len() == before {
                tracing::warn!("Fetched font data could not be parsed, skipping");
            }
        }

        for data in typst_assets::fonts() {
            for font in Font::iter(Bytes::from_static(data)) {
                book.push(font.info().clone());
                fonts.push(font);
            }
        }

        tracing::info!(
            "Font cache initialized with {} fonts ({} fetched families)",
            fonts.len(),
            extra_families.len()
        );

        Self {
            book: LazyHash::new(book),
            fonts,
            extra_families,
        }
    }

    pub fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    pub fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Font list for the document: fetched families first, then the embedded fallbacks
    pub fn preferred_families(&self) -> Vec<String> {
        self.extra_families
            .iter()
            .cloned()
            .chain(FALLBACK_FAMILIES.iter().map(|f| f.to_string()))
            .collect()
    }

    /// List all font families
    pub fn list_font_families(&self) -> Vec<String> {
        let mut families: Vec<String> = self
            .book
            .families()
            .map(|(name, _)| name.to_string())
            .collect();

        families.sort();
        families.dedup();
        families
    }
}

/// Where remote font files come from
#[async_trait]
pub trait FontSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ExportError>;
}

/// Fetches fonts over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFontSource {
    client: reqwest::Client,
}

impl HttpFontSource {
    pub fn new(timeout: Duration) -> Result<Self, ExportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExportError::FontFetch(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FontSource for HttpFontSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ExportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ExportError::FontFetch(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExportError::FontFetch(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

/// Regular and bold font locations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontUrls {
    pub regular: Option<String>,
    /// The regular font is used for bold text when absent
    pub bold: Option<String>,
}

impl FontUrls {
    pub fn is_empty(&self) -> bool {
        self.regular.is_none() && self.bold.is_none()
    }

    fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.regular.iter().chain(self.bold.iter()).map(String::as_str)
    }
}

/// Fetch the configured fonts, degrading to the embedded cache on failure
pub async fn load_font_cache(source: &dyn FontSource, urls: &FontUrls) -> Arc<FontCache> {
    if urls.is_empty() {
        return embedded_font_cache();
    }

    let mut fetched = Vec::new();
    for url in urls.iter() {
        match source.fetch(url).await {
            Ok(data) => {
                tracing::debug!(url, bytes = data.len(), "Fetched font");
                fetched.push(data);
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Font fetch failed, using embedded fonts");
            }
        }
    }

    if fetched.is_empty() {
        embedded_font_cache()
    } else {
        Arc::new(FontCache::with_extra(fetched))
    }
}
