//! Compound interest engine for fixed deposits
//!
//! `M = P * (1 + r/n)^(n*t)` with `r` the annual rate as a fraction, `n` the
//! compounding periods per year and `t` the tenure in fractional years. All
//! money results are rounded half-up to 2 decimals.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::precision::{compound_factor, compounding_base, compounding_exponent, grow, round_money};
use super::schedule::{DepositProjection, MonthlyEntry};
use crate::deposit::CompoundingFrequency;
use crate::error::{PricingError, PricingResult};

/// Inputs to the compounding formulas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompoundingSpec {
    /// Final annual rate in percent (base + additional)
    pub annual_rate: Decimal,

    /// Tenure in months
    pub tenure_months: u32,

    /// Compounding periods per year
    pub periods_per_year: u32,

    /// Tax withheld on interest, in percent
    pub tds_rate: Decimal,
}

impl CompoundingSpec {
    pub fn new(annual_rate: Decimal, tenure_months: u32, frequency: CompoundingFrequency) -> Self {
        Self {
            annual_rate,
            tenure_months,
            periods_per_year: frequency.periods_per_year(),
            tds_rate: Decimal::ZERO,
        }
    }

    pub fn with_tds(mut self, tds_rate: Decimal) -> Self {
        self.tds_rate = tds_rate;
        self
    }

    /// Reject anything the formulas cannot take, before any division happens
    pub fn validate(&self) -> PricingResult<()> {
        if self.annual_rate < Decimal::ZERO {
            return Err(PricingError::invalid(
                "annual_rate",
                format!("must not be negative, got {}", self.annual_rate),
            ));
        }
        if self.tenure_months == 0 {
            return Err(PricingError::invalid("tenure_months", "must be positive"));
        }
        if self.periods_per_year == 0 {
            return Err(PricingError::invalid("periods_per_year", "must be positive"));
        }
        if self.tds_rate < Decimal::ZERO || self.tds_rate > Decimal::ONE_HUNDRED {
            return Err(PricingError::invalid(
                "tds_rate",
                format!("must be between 0 and 100, got {}", self.tds_rate),
            ));
        }
        Ok(())
    }
}

/// Stateless compounding calculator for one rate/tenure/frequency
#[derive(Debug, Clone)]
pub struct CompoundInterestEngine {
    spec: CompoundingSpec,
    base: Decimal,
}

impl CompoundInterestEngine {
    /// Create an engine, validating the spec
    pub fn new(spec: CompoundingSpec) -> PricingResult<Self> {
        spec.validate()?;
        let base = compounding_base(spec.annual_rate, spec.periods_per_year)?;
        Ok(Self { spec, base })
    }

    pub fn spec(&self) -> &CompoundingSpec {
        &self.spec
    }

    /// Balance after `months`, recomputed from the principal
    fn balance_after(&self, principal: Decimal, months: u32) -> PricingResult<Decimal> {
        let exponent = compounding_exponent(self.spec.periods_per_year, months);
        let factor = compound_factor(self.base, exponent)?;
        Ok(round_money(grow(principal, factor)?))
    }

    fn check_principal(principal: Decimal) -> PricingResult<()> {
        if principal <= Decimal::ZERO {
            return Err(PricingError::invalid(
                "principal",
                format!("must be positive, got {}", principal),
            ));
        }
        Ok(())
    }

    /// Maturity value before tax
    pub fn maturity_before_tax(&self, principal: Decimal) -> PricingResult<Decimal> {
        Self::check_principal(principal)?;
        self.balance_after(principal, self.spec.tenure_months)
    }

    /// Interest over the whole tenure
    pub fn interest_earned(&self, principal: Decimal) -> PricingResult<Decimal> {
        let maturity = self.maturity_before_tax(principal)?;
        Ok(round_money(maturity - principal))
    }

    /// Tax withheld, levied on interest only
    pub fn tds_amount(&self, principal: Decimal) -> PricingResult<Decimal> {
        let maturity = self.maturity_before_tax(principal)?;
        self.tds_on(maturity - principal)
    }

    fn tds_on(&self, interest: Decimal) -> PricingResult<Decimal> {
        let withheld = interest
            .checked_mul(self.spec.tds_rate)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(|| {
                PricingError::computation(format!("TDS on {} at {}% overflows", interest, self.spec.tds_rate))
            })?;
        Ok(round_money(withheld))
    }

    /// Maturity value net of TDS
    pub fn maturity_after_tax(&self, principal: Decimal) -> PricingResult<Decimal> {
        let maturity = self.maturity_before_tax(principal)?;
        let tds = self.tds_on(maturity - principal)?;
        Ok(round_money(maturity - tds))
    }

    /// Effective annual yield `((1 + r/n)^n - 1) * 100`
    pub fn annual_percentage_yield(&self) -> PricingResult<Decimal> {
        let factor = compound_factor(self.base, f64::from(self.spec.periods_per_year))?;
        let apy = (factor - Decimal::ONE)
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(|| PricingError::computation(format!("yield from factor {} overflows", factor)))?;
        Ok(round_money(apy))
    }

    /// Month-by-month growth from `start_date`
    ///
    /// Each closing balance is recomputed from the principal at elapsed time
    /// `m/12`, so the final entry equals [`Self::maturity_before_tax`] and the
    /// monthly interest sums to [`Self::interest_earned`].
    pub fn monthly_breakdown(&self, principal: Decimal, start_date: NaiveDate) -> PricingResult<Vec<MonthlyEntry>> {
        Self::check_principal(principal)?;

        let mut entries = Vec::with_capacity(self.spec.tenure_months as usize);
        let mut opening = principal;
        let mut previous_cumulative = Decimal::ZERO;

        for month in 1..=self.spec.tenure_months {
            let closing = self.balance_after(principal, month)?;
            let cumulative = closing - principal;

            entries.push(MonthlyEntry {
                month,
                date: add_months(start_date, month)?,
                opening_balance: round_money(opening),
                interest_earned: round_money(cumulative - previous_cumulative),
                closing_balance: closing,
                cumulative_interest: round_money(cumulative),
            });

            opening = closing;
            previous_cumulative = cumulative;
        }

        Ok(entries)
    }

    /// Every derived figure for one principal
    pub fn project(&self, principal: Decimal, start_date: NaiveDate) -> PricingResult<DepositProjection> {
        let maturity_before_tax = self.maturity_before_tax(principal)?;
        let interest_earned = round_money(maturity_before_tax - principal);
        let tds_amount = self.tds_on(maturity_before_tax - principal)?;
        let maturity_after_tax = round_money(maturity_before_tax - tds_amount);

        log::debug!(
            "Projected {} at {}% for {} months: maturity {}, interest {}, tds {}",
            principal,
            self.spec.annual_rate,
            self.spec.tenure_months,
            maturity_before_tax,
            interest_earned,
            tds_amount
        );

        Ok(DepositProjection {
            principal,
            maturity_before_tax,
            interest_earned,
            tds_amount,
            net_interest: interest_earned - tds_amount,
            maturity_after_tax,
            annual_percentage_yield: self.annual_percentage_yield()?,
            start_date,
            maturity_date: add_months(start_date, self.spec.tenure_months)?,
            schedule: self.monthly_breakdown(principal, start_date)?,
        })
    }
}

/// Calendar month arithmetic; month ends clamp (Jan 31 + 1 month = Feb 28/29)
pub fn add_months(date: NaiveDate, months: u32) -> PricingResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| PricingError::computation(format!("{} + {} months is out of range", date, months)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn engine(rate: Decimal, months: u32, frequency: CompoundingFrequency, tds: Decimal) -> CompoundInterestEngine {
        CompoundInterestEngine::new(CompoundingSpec::new(rate, months, frequency).with_tds(tds)).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_quarterly_one_year() {
        let e = engine(dec!(7), 12, CompoundingFrequency::Quarterly, dec!(10));
        let p = dec!(100000);

        assert_eq!(e.maturity_before_tax(p).unwrap(), dec!(107185.90));
        assert_eq!(e.interest_earned(p).unwrap(), dec!(7185.90));
        assert_eq!(e.tds_amount(p).unwrap(), dec!(718.59));
        assert_eq!(e.maturity_after_tax(p).unwrap(), dec!(106467.31));
        assert_eq!(e.annual_percentage_yield().unwrap(), dec!(7.19));
    }

    #[test]
    fn test_frequency_changes_maturity() {
        let p = dec!(100000);
        let monthly = engine(dec!(7), 12, CompoundingFrequency::Monthly, Decimal::ZERO);
        let annual = engine(dec!(7), 12, CompoundingFrequency::Annually, Decimal::ZERO);

        assert_eq!(monthly.maturity_before_tax(p).unwrap(), dec!(107229.01));
        assert_eq!(annual.maturity_before_tax(p).unwrap(), dec!(107000.00));
        assert_eq!(monthly.annual_percentage_yield().unwrap(), dec!(7.23));
        assert_eq!(annual.annual_percentage_yield().unwrap(), dec!(7.00));
        assert_eq!(
            engine(dec!(7), 12, CompoundingFrequency::HalfYearly, Decimal::ZERO)
                .annual_percentage_yield()
                .unwrap(),
            dec!(7.12)
        );
    }

    #[test]
    fn test_fractional_year_tenure() {
        let e = engine(dec!(7), 18, CompoundingFrequency::Quarterly, Decimal::ZERO);
        assert_eq!(e.maturity_before_tax(dec!(100000)).unwrap(), dec!(110970.24));

        let e = engine(dec!(8), 9, CompoundingFrequency::Quarterly, Decimal::ZERO);
        assert_eq!(e.maturity_before_tax(dec!(250000)).unwrap(), dec!(265302.00));
    }

    #[test]
    fn test_zero_rate() {
        let e = engine(Decimal::ZERO, 24, CompoundingFrequency::Monthly, dec!(10));
        let p = dec!(5000);
        assert_eq!(e.maturity_before_tax(p).unwrap(), dec!(5000.00));
        assert_eq!(e.interest_earned(p).unwrap(), Decimal::ZERO);
        assert_eq!(e.maturity_after_tax(p).unwrap(), dec!(5000.00));
        assert_eq!(e.annual_percentage_yield().unwrap(), dec!(0.00));
    }

    #[test]
    fn test_spec_validation() {
        let bad = [
            CompoundingSpec::new(dec!(-1), 12, CompoundingFrequency::Quarterly),
            CompoundingSpec::new(dec!(7), 0, CompoundingFrequency::Quarterly),
            CompoundingSpec::new(dec!(7), 12, CompoundingFrequency::Quarterly).with_tds(dec!(-5)),
            CompoundingSpec::new(dec!(7), 12, CompoundingFrequency::Quarterly).with_tds(dec!(100.01)),
            CompoundingSpec {
                annual_rate: dec!(7),
                tenure_months: 12,
                periods_per_year: 0,
                tds_rate: Decimal::ZERO,
            },
        ];
        for spec in bad {
            assert!(CompoundInterestEngine::new(spec).unwrap_err().is_invalid_input(), "{:?}", spec);
        }
    }

    #[test]
    fn test_non_positive_principal_rejected() {
        let e = engine(dec!(7), 12, CompoundingFrequency::Quarterly, Decimal::ZERO);
        assert!(e.maturity_before_tax(Decimal::ZERO).unwrap_err().is_invalid_input());
        assert!(e.monthly_breakdown(dec!(-10), date(2025, 1, 1)).is_err());
    }

    #[test]
    fn test_monthly_breakdown_shape() {
        let e = engine(dec!(7), 12, CompoundingFrequency::Quarterly, Decimal::ZERO);
        let p = dec!(100000);
        let rows = e.monthly_breakdown(p, date(2025, 1, 31)).unwrap();

        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].month, 1);
        assert_eq!(rows[0].opening_balance, p);
        assert_eq!(rows[0].closing_balance, dec!(100579.96));
        assert_eq!(rows[0].interest_earned, dec!(579.96));
        assert_eq!(rows[0].date, date(2025, 2, 28));
        assert_eq!(rows[11].date, date(2026, 1, 31));

        for pair in rows.windows(2) {
            assert_eq!(pair[1].opening_balance, pair[0].closing_balance);
            assert!(pair[1].closing_balance >= pair[0].closing_balance);
        }

        let last = rows.last().unwrap();
        assert_eq!(last.closing_balance, e.maturity_before_tax(p).unwrap());
        assert_eq!(last.cumulative_interest, e.interest_earned(p).unwrap());
    }

    #[test]
    fn test_consistency_across_grid() {
        let principals = [dec!(1000), dec!(25000.50), dec!(100000), dec!(9999999)];
        let rates = [dec!(0.5), dec!(6.75), dec!(9)];
        let tenures = [1, 7, 12, 60, 120];
        let frequencies = [
            CompoundingFrequency::Monthly,
            CompoundingFrequency::Quarterly,
            CompoundingFrequency::HalfYearly,
            CompoundingFrequency::Annually,
        ];

        for &rate in &rates {
            for &months in &tenures {
                for &frequency in &frequencies {
                    let e = engine(rate, months, frequency, dec!(10));
                    let untaxed = engine(rate, months, frequency, Decimal::ZERO);
                    for &p in &principals {
                        let maturity = e.maturity_before_tax(p).unwrap();
                        let interest = e.interest_earned(p).unwrap();
                        assert_eq!(maturity - p, interest);

                        let monthly: Decimal = e
                            .monthly_breakdown(p, date(2025, 1, 1))
                            .unwrap()
                            .iter()
                            .map(|row| row.interest_earned)
                            .sum();
                        assert!((monthly - interest).abs() <= dec!(0.01));

                        assert!(e.maturity_after_tax(p).unwrap() < maturity);
                        assert_eq!(untaxed.maturity_after_tax(p).unwrap(), maturity);
                    }
                }
            }
        }
    }

    #[test]
    fn test_project_collects_everything() {
        let e = engine(dec!(7), 12, CompoundingFrequency::Quarterly, dec!(10));
        let projection = e.project(dec!(100000), date(2025, 4, 1)).unwrap();

        assert_eq!(projection.maturity_before_tax, dec!(107185.90));
        assert_eq!(projection.net_interest, dec!(6467.31));
        assert_eq!(projection.maturity_after_tax, dec!(106467.31));
        assert_eq!(projection.maturity_date, date(2026, 4, 1));
        assert_eq!(projection.schedule.len(), 12);

        let summary = projection.summary();
        assert_eq!(summary.total_months, 12);
        assert_eq!(summary.total_interest, dec!(7185.90));
        assert_eq!(summary.final_balance, dec!(107185.90));
    }

    #[test]
    fn test_tds_overflow_is_computation_error() {
        // the gross maturity still fits in a Decimal, interest * 100 does not
        let e = engine(dec!(50), 12, CompoundingFrequency::Annually, dec!(100));
        let p = dec!(10000000000000000000000000000);

        assert_eq!(e.maturity_before_tax(p).unwrap(), dec!(15000000000000000000000000000));
        assert!(matches!(e.tds_amount(p), Err(PricingError::Computation { .. })));
        assert!(matches!(e.maturity_after_tax(p), Err(PricingError::Computation { .. })));
        assert!(matches!(
            e.project(p, date(2025, 4, 1)),
            Err(PricingError::Computation { .. })
        ));
    }
}
