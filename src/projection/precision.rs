//! Decimal/floating-point precision boundary
//!
//! Everything additive or multiplicative stays in `Decimal`. The one place a
//! fractional power is needed, `(1 + r/n)^(n*t)`, goes through `f64` here and
//! nowhere else, so swapping in an arbitrary-precision power later only
//! touches [`compound_factor`].

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{PricingError, PricingResult};

/// Decimal places kept on money amounts and quoted rates
pub const MONEY_SCALE: u32 = 2;

const MONTHS_PER_YEAR: f64 = 12.0;
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round half-up (away from zero) to 2 decimal places
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Per-period growth `1 + (annual_rate / 100) / periods_per_year`
pub fn compounding_base(annual_rate: Decimal, periods_per_year: u32) -> PricingResult<Decimal> {
    if periods_per_year == 0 {
        return Err(PricingError::invalid("periods_per_year", "must be positive"));
    }
    let periodic = annual_rate / HUNDRED / Decimal::from(periods_per_year);
    Ok(Decimal::ONE + periodic)
}

/// Compounding exponent `n * t` for `months` elapsed, `t` in fractional years
///
/// Aggregate and monthly figures both go through here so the last month of a
/// schedule reproduces the maturity value bit for bit.
pub fn compounding_exponent(periods_per_year: u32, months: u32) -> f64 {
    f64::from(periods_per_year) * (f64::from(months) / MONTHS_PER_YEAR)
}

/// `base ^ exponent`, evaluated in `f64` and brought back to `Decimal`
pub fn compound_factor(base: Decimal, exponent: f64) -> PricingResult<Decimal> {
    let base_f = base
        .to_f64()
        .ok_or_else(|| PricingError::computation(format!("compounding base {} has no f64 form", base)))?;

    let factor = base_f.powf(exponent);
    if !factor.is_finite() {
        return Err(PricingError::computation(format!(
            "compound factor {}^{} is not finite",
            base, exponent
        )));
    }

    Decimal::from_f64(factor)
        .ok_or_else(|| PricingError::computation(format!("compound factor {} out of decimal range", factor)))
}

/// `principal * factor`, guarding against decimal overflow
pub fn grow(principal: Decimal, factor: Decimal) -> PricingResult<Decimal> {
    principal
        .checked_mul(factor)
        .ok_or_else(|| PricingError::computation(format!("{} x {} overflows", principal, factor)))
}
