use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::SimulcreditError;
use crate::types::{Money, Rate, RatePercent};
use crate::SimulcreditResult;

const PERCENT_DIVISOR: Decimal = dec!(100);

/// Convert an annual nominal rate in percentage points to a periodic decimal rate.
///
/// `periodic_rate(dec!(12), 12)` is `0.01`.
pub fn periodic_rate(
    annual_rate_percent: RatePercent,
    periods_per_year: u32,
) -> SimulcreditResult<Rate> {
    if periods_per_year == 0 {
        return Err(SimulcreditError::invalid(
            "periods_per_year",
            "Periods per year must be > 0",
        ));
    }

    Ok(annual_rate_percent / Decimal::from(periods_per_year) / PERCENT_DIVISOR)
}

/// Level payment that fully amortizes `principal` over `nper` periods at `rate`.
///
/// Uses `P · r / (1 − (1+r)^−n)`, algebraically the same as
/// `P · r · (1+r)^n / ((1+r)^n − 1)` but free of overflow in the numerator.
/// A zero rate, or one too small to move `(1+r)^n` within decimal resolution,
/// repays linearly. A payment beyond the decimal range is an invalid request.
pub fn annuity_payment(rate: Rate, nper: u32, principal: Money) -> SimulcreditResult<Money> {
    if nper == 0 {
        return Err(SimulcreditError::invalid(
            "nper",
            "Number of periods must be > 0",
        ));
    }

    if rate <= dec!(-1) {
        return Err(SimulcreditError::invalid(
            "rate",
            "Periodic rate must be greater than -100%",
        ));
    }

    let linear = principal / Decimal::from(nper);
    if rate.is_zero() {
        return Ok(linear);
    }

    let one_plus_r = Decimal::ONE + rate;
    // Past the decimal range the discount term vanishes and the payment is P·r.
    let discount = match one_plus_r.checked_powu(u64::from(nper)) {
        Some(factor) if !factor.is_zero() => Decimal::ONE / factor,
        _ => Decimal::ZERO,
    };

    let annuity_factor = Decimal::ONE - discount;
    if annuity_factor.is_zero() {
        return Ok(linear);
    }

    principal
        .checked_mul(rate)
        .and_then(|interest| interest.checked_div(annuity_factor))
        .ok_or_else(|| SimulcreditError::out_of_range("annuity payment"))
}
