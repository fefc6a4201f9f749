//! Locale-aware currency and date formatting
//!
//! Every price and total shown in the CLI or in an exported document goes
//! through `Locale::format_currency`, so the whole proposal uses one format.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ProposalError;

const NBSP: char = '\u{a0}';

/// Display locale for documents and console output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "ru-RU")]
    RuRu,
    #[serde(rename = "en-US")]
    EnUs,
}

impl Locale {
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::RuRu => "ru-RU",
            Locale::EnUs => "en-US",
        }
    }

    /// Two-letter language code (used as the Typst `lang` setting)
    pub fn language(&self) -> &'static str {
        match self {
            Locale::RuRu => "ru",
            Locale::EnUs => "en",
        }
    }

    fn group_separator(&self) -> char {
        match self {
            Locale::RuRu => NBSP,
            Locale::EnUs => ',',
        }
    }

    /// Format a rouble amount with zero decimal places
    ///
    /// `ru-RU` yields `1 250 000 ₽` (no-break spaces), `en-US` yields
    /// `RUB 1,250,000`.
    pub fn format_currency(&self, value: impl Into<i128>) -> String {
        let value = value.into();
        let grouped = group_digits(value.unsigned_abs(), self.group_separator());
        let sign = if value < 0 { "-" } else { "" };

        match self {
            Locale::RuRu => format!("{sign}{grouped}{NBSP}₽"),
            Locale::EnUs => format!("{sign}RUB{NBSP}{grouped}"),
        }
    }

    /// Long date, e.g. `19 октября 2026` or `October 19, 2026`
    pub fn format_long_date(&self, date: NaiveDate) -> String {
        match self {
            Locale::RuRu => date
                .format_localized("%-d %B %Y", chrono::Locale::ru_RU)
                .to_string(),
            Locale::EnUs => date
                .format_localized("%B %-d, %Y", chrono::Locale::en_US)
                .to_string(),
        }
    }

    /// Numeric date, e.g. `19.10.2026` or `10/19/2026`
    pub fn format_short_date(&self, date: NaiveDate) -> String {
        match self {
            Locale::RuRu => date.format("%d.%m.%Y").to_string(),
            Locale::EnUs => date.format("%m/%d/%Y").to_string(),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = ProposalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "ru-ru" | "ru" => Ok(Locale::RuRu),
            "en-us" | "en" => Ok(Locale::EnUs),
            other => Err(ProposalError::UnknownLocale(other.to_string())),
        }
    }
}

fn group_digits(value: u128, separator: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * 2);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }

    out
}
