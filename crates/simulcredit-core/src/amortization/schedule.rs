//! Fixed-rate amortization engine.
//!
//! Produces the month-by-month decomposition of a loan into principal and
//! interest under either a level annuity payment or, for a zero rate, a linear
//! repayment. Every emitted figure is rounded to cents at emission time and the
//! aggregates are sums of those rounded figures, so totals can drift from the
//! exact values by a few cents over a long term. The final balance is reported
//! as an absolute value and is never netted into a last-payment adjustment.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::amortization::request::{
    AmortizationInput, BalanceCarry, LoanRequest, ScheduleOptions,
};
use crate::error::SimulcreditError;
use crate::time_value::{annuity_payment, periodic_rate};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::SimulcreditResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Decimal places of every emitted currency figure.
pub const CURRENCY_DP: u32 = 2;
/// Annual rates at or below this many percentage points repay linearly.
pub const ZERO_RATE_EPSILON: Decimal = dec!(0.000001);
const PERIODS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Output Types
// ---------------------------------------------------------------------------

/// Which repayment rule produced the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentMethod {
    /// Zero rate: principal / term each period, no interest.
    Linear,
    /// Level annuity payment at a positive periodic rate.
    Annuity,
}

/// One period of the schedule. All amounts are rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based period number.
    pub period: u32,
    pub payment_total: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
}

/// The full schedule: exactly `term_periods` rows in period order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AmortizationSchedule {
    rows: Vec<ScheduleRow>,
}

/// Headline figures derived from a schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanSummary {
    pub repayment_method: RepaymentMethod,
    /// Monthly decimal rate applied to the balance (0 for linear repayment).
    pub periodic_rate: Rate,
    pub monthly_payment: Money,
    pub total_paid: Money,
    pub total_interest: Money,
    /// Remaining balance after the last period (rounding residue).
    pub final_balance: Money,
}

/// Output of [`amortize`].
#[derive(Debug, Clone, Serialize)]
pub struct LoanAmortizationOutput {
    pub summary: LoanSummary,
    pub schedule: AmortizationSchedule,
}

// ---------------------------------------------------------------------------
// Schedule accessors & aggregates
// ---------------------------------------------------------------------------

impl AmortizationSchedule {
    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Payment of the first period.
    pub fn monthly_payment(&self) -> Money {
        self.rows
            .first()
            .map(|r| r.payment_total)
            .unwrap_or(Decimal::ZERO)
    }

    /// Sum of the rounded payments.
    pub fn total_paid(&self) -> Money {
        self.rows.iter().map(|r| r.payment_total).sum()
    }

    /// Sum of the rounded interest portions.
    pub fn total_interest(&self) -> Money {
        self.rows.iter().map(|r| r.interest_portion).sum()
    }

    /// Sum of the rounded principal portions.
    pub fn total_principal(&self) -> Money {
        self.rows.iter().map(|r| r.principal_portion).sum()
    }

    /// Remaining balance reported on the last row.
    pub fn final_balance(&self) -> Money {
        self.rows
            .last()
            .map(|r| r.remaining_balance)
            .unwrap_or(Decimal::ZERO)
    }
}

impl<'a> IntoIterator for &'a AmortizationSchedule {
    type Item = &'a ScheduleRow;
    type IntoIter = std::slice::Iter<'a, ScheduleRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the amortization schedule with default options.
pub fn compute_schedule(request: &LoanRequest) -> SimulcreditResult<AmortizationSchedule> {
    compute_schedule_with(request, &ScheduleOptions::default())
}

/// Compute the amortization schedule.
///
/// Fails only when the request violates `principal > 0`,
/// `annual_rate_percent >= 0` or `term_periods >= 1`, or when its figures
/// (payment, interest, total paid) fall outside the decimal range; no row is
/// produced in either case.
pub fn compute_schedule_with(
    request: &LoanRequest,
    options: &ScheduleOptions,
) -> SimulcreditResult<AmortizationSchedule> {
    request.validate()?;

    let (method, rate) = select_method(request)?;
    let n = request.term_periods;
    let payment = match method {
        RepaymentMethod::Linear => request.principal / Decimal::from(n),
        RepaymentMethod::Annuity => annuity_payment(rate, n, request.principal)?,
    };

    debug!(
        ?method,
        %rate,
        %payment,
        term_periods = n,
        carry = ?options.balance_carry,
        "computing amortization schedule"
    );

    let emitted_payment = round_currency(payment);
    // Every row pays the same amount, so this bounds all the aggregates.
    emitted_payment
        .checked_mul(Decimal::from(n))
        .ok_or_else(|| SimulcreditError::out_of_range("total paid"))?;

    let mut balance = request.principal;
    let mut rows = Vec::with_capacity(n as usize);

    for period in 1..=n {
        let interest = balance
            .checked_mul(rate)
            .ok_or_else(|| SimulcreditError::out_of_range("periodic interest"))?;
        let principal_portion = payment
            .checked_sub(interest)
            .ok_or_else(|| SimulcreditError::out_of_range("principal portion"))?;

        balance = balance
            .checked_sub(principal_portion)
            .ok_or_else(|| SimulcreditError::out_of_range("remaining balance"))?;
        if options.balance_carry == BalanceCarry::Rounded {
            balance = balance.round_dp(CURRENCY_DP);
        }

        rows.push(ScheduleRow {
            period,
            payment_total: emitted_payment,
            principal_portion: round_currency(principal_portion),
            interest_portion: round_currency(interest),
            remaining_balance: round_currency(balance.abs()),
        });
    }

    debug!(final_balance = %balance, "schedule complete");

    Ok(AmortizationSchedule { rows })
}

/// Compute the schedule plus summary, wrapped in the standard output envelope.
pub fn amortize(
    input: &AmortizationInput,
) -> SimulcreditResult<ComputationOutput<LoanAmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let loan = &input.loan;
    let schedule = compute_schedule_with(loan, &input.options)?;
    let (method, rate) = select_method(loan)?;

    if method == RepaymentMethod::Linear {
        warnings.push(format!(
            "Annual rate {}% is at or below the zero-rate threshold of {}%: \
             principal repaid linearly, no interest accrues",
            loan.annual_rate_percent, ZERO_RATE_EPSILON
        ));
    }

    let final_balance = schedule.final_balance();
    if !final_balance.is_zero() {
        warnings.push(format!(
            "Final remaining balance {} is rounding residue and is not netted into the last payment",
            final_balance
        ));
    }

    let summary = LoanSummary {
        repayment_method: method,
        periodic_rate: rate,
        monthly_payment: schedule.monthly_payment(),
        total_paid: schedule.total_paid(),
        total_interest: schedule.total_interest(),
        final_balance,
    };

    let methodology = match method {
        RepaymentMethod::Linear => {
            "Fixed-rate amortization — linear repayment at or below the zero-rate threshold"
        }
        RepaymentMethod::Annuity => "Fixed-rate amortization — level annuity payment",
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &serde_json::json!({
            "principal": loan.principal.to_string(),
            "annual_rate_percent": loan.annual_rate_percent.to_string(),
            "term_periods": loan.term_periods,
            "periods_per_year": PERIODS_PER_YEAR,
            "balance_carry": input.options.balance_carry,
            "rounding": format!("{CURRENCY_DP} dp per period, half to even"),
        }),
        warnings,
        elapsed,
        LoanAmortizationOutput { summary, schedule },
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn select_method(request: &LoanRequest) -> SimulcreditResult<(RepaymentMethod, Rate)> {
    if request.annual_rate_percent <= ZERO_RATE_EPSILON {
        Ok((RepaymentMethod::Linear, Decimal::ZERO))
    } else {
        let rate = periodic_rate(request.annual_rate_percent, PERIODS_PER_YEAR)?;
        Ok((RepaymentMethod::Annuity, rate))
    }
}

/// Round to cents and pin the scale so every figure renders with two decimals.
fn round_currency(value: Money) -> Money {
    let mut rounded = value.round_dp(CURRENCY_DP);
    rounded.rescale(CURRENCY_DP);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(principal: Decimal, rate: Decimal, term: u32) -> LoanRequest {
        LoanRequest::new(principal, rate, term).unwrap()
    }

    #[test]
    fn test_round_currency_pins_scale() {
        let v = round_currency(dec!(100));
        assert_eq!(v.to_string(), "100.00");
        assert_eq!(round_currency(dec!(888.48788)).to_string(), "888.49");
    }

    #[test]
    fn test_round_currency_half_to_even() {
        assert_eq!(round_currency(dec!(0.125)), dec!(0.12));
        assert_eq!(round_currency(dec!(0.135)), dec!(0.14));
    }

    #[test]
    fn test_select_method_epsilon() {
        let (m, r) = select_method(&request(dec!(1000), dec!(0.0000005), 12)).unwrap();
        assert_eq!(m, RepaymentMethod::Linear);
        assert_eq!(r, Decimal::ZERO);

        let (m, r) = select_method(&request(dec!(1000), dec!(6), 12)).unwrap();
        assert_eq!(m, RepaymentMethod::Annuity);
        assert_eq!(r, dec!(0.005));
    }

    #[test]
    fn test_linear_rows_are_constant() {
        let schedule = compute_schedule(&request(dec!(1200), Decimal::ZERO, 12)).unwrap();
        assert_eq!(schedule.len(), 12);
        for (i, row) in schedule.iter().enumerate() {
            assert_eq!(row.period, i as u32 + 1);
            assert_eq!(row.payment_total, dec!(100));
            assert_eq!(row.principal_portion, dec!(100));
            assert_eq!(row.interest_portion, Decimal::ZERO);
        }
        assert_eq!(schedule.rows()[0].remaining_balance, dec!(1100));
        assert_eq!(schedule.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_annuity_first_row() {
        let schedule = compute_schedule(&request(dec!(10000), dec!(12), 12)).unwrap();
        let first = &schedule.rows()[0];
        assert_eq!(first.period, 1);
        assert_eq!(first.payment_total, dec!(888.49));
        assert_eq!(first.interest_portion, dec!(100.00));
        assert_eq!(first.principal_portion, dec!(788.49));
        assert_eq!(first.remaining_balance, dec!(9211.51));
    }

    #[test]
    fn test_rounded_carry_feeds_next_interest() {
        // Period 2 interest accrues on the rounded 9211.51 balance
        let schedule = compute_schedule(&request(dec!(10000), dec!(12), 12)).unwrap();
        assert_eq!(schedule.rows()[1].interest_portion, dec!(92.12));
    }

    #[test]
    fn test_overflowing_rate_is_error_not_panic() {
        let req = request(dec!(1000000), dec!(1e27), 12);
        let result = std::panic::catch_unwind(|| compute_schedule(&req));
        match result {
            Ok(Err(SimulcreditError::InvalidRequest { field, .. })) => assert_eq!(field, "request"),
            other => panic!("Expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_near_limit_principal_still_computes() {
        let schedule = compute_schedule(&request(dec!(7e28), dec!(12), 12)).unwrap();
        assert_eq!(schedule.len(), 12);
    }

    #[test]
    fn test_aggregates_on_empty_schedule() {
        let empty = AmortizationSchedule { rows: Vec::new() };
        assert!(empty.is_empty());
        assert_eq!(empty.monthly_payment(), Decimal::ZERO);
        assert_eq!(empty.total_paid(), Decimal::ZERO);
        assert_eq!(empty.final_balance(), Decimal::ZERO);
    }
}
