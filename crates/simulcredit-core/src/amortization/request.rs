//! Loan request and engine options.
//!
//! A [`LoanRequest`] carries the three inputs of a fixed-rate amortization:
//! principal, annual nominal rate in percentage points, and term in monthly
//! periods. [`AmortizationInput`] is the JSON shape accepted by the CLI and the
//! bindings: the request fields plus optional [`ScheduleOptions`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SimulcreditError;
use crate::types::{Money, RatePercent};
use crate::SimulcreditResult;

// ---------------------------------------------------------------------------
// Input Types
// ---------------------------------------------------------------------------

/// A fixed-rate, fixed-term loan to amortize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    /// Amount borrowed at period 0.
    pub principal: Money,
    /// Annual nominal rate in percentage points (12.5 = 12.5%/year).
    pub annual_rate_percent: RatePercent,
    /// Number of monthly periods.
    pub term_periods: u32,
}

/// How the running balance is carried between periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceCarry {
    /// Round the balance to 2 dp after every subtraction.
    #[default]
    Rounded,
    /// Keep full precision; only the emitted row fields are rounded.
    FullPrecision,
}

/// Engine options. Every field has a default so JSON inputs may omit them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOptions {
    #[serde(default)]
    pub balance_carry: BalanceCarry,
}

/// Request plus options, as read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationInput {
    #[serde(flatten)]
    pub loan: LoanRequest,
    #[serde(default)]
    pub options: ScheduleOptions,
}

// ---------------------------------------------------------------------------
// Construction & validation
// ---------------------------------------------------------------------------

impl LoanRequest {
    /// Build a validated request.
    pub fn new(
        principal: Money,
        annual_rate_percent: RatePercent,
        term_periods: u32,
    ) -> SimulcreditResult<Self> {
        let request = LoanRequest {
            principal,
            annual_rate_percent,
            term_periods,
        };
        request.validate()?;
        Ok(request)
    }

    /// Check `principal > 0`, `annual_rate_percent >= 0` and `term_periods >= 1`.
    pub fn validate(&self) -> SimulcreditResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(SimulcreditError::invalid(
                "principal",
                format!("Principal must be > 0 (got {})", self.principal),
            ));
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(SimulcreditError::invalid(
                "annual_rate_percent",
                format!(
                    "Annual rate must be >= 0 (got {})",
                    self.annual_rate_percent
                ),
            ));
        }
        if self.term_periods < 1 {
            return Err(SimulcreditError::invalid(
                "term_periods",
                "Term must be at least 1 period",
            ));
        }
        Ok(())
    }
}

impl AmortizationInput {
    pub fn new(loan: LoanRequest) -> Self {
        AmortizationInput {
            loan,
            options: ScheduleOptions::default(),
        }
    }

    /// Parse from a JSON document. Malformed JSON is a serialization error;
    /// the request invariant is checked later by the engine.
    pub fn from_json(json: &str) -> SimulcreditResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> SimulcreditResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}
