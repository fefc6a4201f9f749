//! ROI estimator
//!
//! Three-part savings model (labor, errors, fraud) plus payback period and
//! three-year return for a fixed investment tier. Deterministic: the same
//! inputs always produce the same estimate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProposalError;
use crate::model::Amount;

const MONTHS_PER_YEAR: f64 = 12.0;

/// Years covered by the ROI figure
pub const ROI_HORIZON_YEARS: u32 = 3;

/// Business constants of the savings model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiAssumptions {
    /// Share of manual processing cost removed by automation
    pub automation_share: f64,
    /// Share of document errors the agent catches
    pub error_catch_rate: f64,
    /// Share of risky documents that turn into an actual loss
    pub fraud_realization: f64,
    /// Yearly maintenance as a share of the investment, from year two on
    pub maintenance_rate: f64,
    pub basic_investment: Amount,
    pub optimal_investment: Amount,
}

impl Default for RoiAssumptions {
    fn default() -> Self {
        Self {
            automation_share: 0.8,
            error_catch_rate: 0.95,
            fraud_realization: 0.1,
            maintenance_rate: 0.1,
            basic_investment: 7_285_000,
            optimal_investment: 21_590_000,
        }
    }
}

impl RoiAssumptions {
    pub fn investment(&self, tier: InvestmentTier) -> Amount {
        match tier {
            InvestmentTier::Basic => self.basic_investment,
            InvestmentTier::Optimal => self.optimal_investment,
        }
    }
}

/// Investment tier the savings are measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentTier {
    Basic,
    #[default]
    Optimal,
}

impl FromStr for InvestmentTier {
    type Err = ProposalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(InvestmentTier::Basic),
            "optimal" => Ok(InvestmentTier::Optimal),
            other => Err(ProposalError::UnknownVariant(other.to_string())),
        }
    }
}

/// User-entered business parameters
///
/// No range checks happen here; zero and negative values are accepted and
/// flow through to `Payback::NotRecoverable` where they make savings vanish.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiInputs {
    /// Documents processed per month
    pub doc_volume: f64,
    /// Processing cost of one document
    pub avg_doc_cost: f64,
    /// Percentage of documents with errors
    pub error_rate: f64,
    pub avg_error_cost: f64,
    /// Percentage of documents carrying fraud risk
    pub fraud_risk: f64,
    pub avg_fraud_loss: f64,
    pub tier: InvestmentTier,
}

impl Default for RoiInputs {
    fn default() -> Self {
        Self {
            doc_volume: 5000.0,
            avg_doc_cost: 150.0,
            error_rate: 3.0,
            avg_error_cost: 5000.0,
            fraud_risk: 0.5,
            avg_fraud_loss: 500_000.0,
            tier: InvestmentTier::Optimal,
        }
    }
}

/// Months until cumulative savings cover the investment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "months", rename_all = "snake_case")]
pub enum Payback {
    /// Rounded to one decimal
    Months(f64),
    /// Annual savings are zero, negative or not a number
    NotRecoverable,
}

impl Payback {
    pub fn months(&self) -> Option<f64> {
        match self {
            Payback::Months(months) => Some(*months),
            Payback::NotRecoverable => None,
        }
    }
}

impl fmt::Display for Payback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payback::Months(months) => write!(f, "{:.1}", months),
            Payback::NotRecoverable => f.write_str("not recoverable"),
        }
    }
}

/// Output of the estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiEstimate {
    pub labor_savings: f64,
    pub error_savings: f64,
    pub fraud_savings: f64,
    /// Rounded sum of the three savings components
    pub annual_savings: i64,
    pub investment: Amount,
    pub payback: Payback,
    pub three_year_cost: f64,
    /// `None` when the three-year cost is not positive
    pub roi_percent: Option<i64>,
}

/// Run the savings model
pub fn estimate_roi(inputs: &RoiInputs, assumptions: &RoiAssumptions) -> RoiEstimate {
    let manual_cost = inputs.doc_volume * inputs.avg_doc_cost * MONTHS_PER_YEAR;
    let labor_savings = manual_cost * assumptions.automation_share;

    let annual_errors = (inputs.doc_volume * inputs.error_rate / 100.0) * MONTHS_PER_YEAR;
    let error_savings = annual_errors * inputs.avg_error_cost * assumptions.error_catch_rate;

    let risky_documents = (inputs.doc_volume * MONTHS_PER_YEAR) * (inputs.fraud_risk / 100.0);
    let fraud_savings = risky_documents * inputs.avg_fraud_loss * assumptions.fraud_realization;

    let total = labor_savings + error_savings + fraud_savings;
    let investment = assumptions.investment(inputs.tier);

    let payback = if total.is_finite() && total > 0.0 {
        let months = investment as f64 / (total / MONTHS_PER_YEAR);
        Payback::Months(round_one_decimal(months))
    } else {
        Payback::NotRecoverable
    };

    let maintenance_years = f64::from(ROI_HORIZON_YEARS - 1);
    let three_year_cost =
        investment as f64 + maintenance_years * (investment as f64 * assumptions.maintenance_rate);

    let roi_percent = if three_year_cost > 0.0 {
        let gain = total * f64::from(ROI_HORIZON_YEARS);
        let ratio = ((gain - three_year_cost) / three_year_cost) * 100.0;
        ratio.is_finite().then(|| ratio.round() as i64)
    } else {
        None
    };

    RoiEstimate {
        labor_savings,
        error_savings,
        fraud_savings,
        annual_savings: if total.is_finite() { total.round() as i64 } else { 0 },
        investment,
        payback,
        three_year_cost,
        roi_percent,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
