//! One row of an interest-rate matrix

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PricingError, PricingResult};

/// Inclusive principal range `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl AmountRange {
    pub fn new(min: Decimal, max: Decimal) -> PricingResult<Self> {
        if min <= Decimal::ZERO {
            return Err(PricingError::invalid("min_amount", format!("must be positive, got {}", min)));
        }
        if max <= min {
            return Err(PricingError::invalid(
                "max_amount",
                format!("must exceed min_amount {}, got {}", min, max),
            ));
        }
        Ok(Self { min, max })
    }

    /// Both ends inclusive
    pub fn contains(&self, amount: Decimal) -> bool {
        amount >= self.min && amount <= self.max
    }
}

/// Inclusive tenure range in months `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenureRange {
    pub min_months: u32,
    pub max_months: u32,
}

impl TenureRange {
    pub fn new(min_months: u32, max_months: u32) -> PricingResult<Self> {
        if max_months <= min_months {
            return Err(PricingError::invalid(
                "max_term_months",
                format!("must exceed min_term_months {}, got {}", min_months, max_months),
            ));
        }
        Ok(Self { min_months, max_months })
    }

    /// Both ends inclusive
    pub fn contains(&self, months: u32) -> bool {
        months >= self.min_months && months <= self.max_months
    }
}

/// A rate applicable over an amount/tenure range
///
/// Without a classification the slab carries the unconditional base rate for
/// its range. With one, it carries a bonus (`additional_rate`) for customers
/// holding that classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSlab {
    pub amount_range: AmountRange,
    pub tenure_range: TenureRange,
    pub classification: Option<String>,
    pub base_rate: Option<Decimal>,
    pub additional_rate: Decimal,

    /// Validity window; informational unless the caller pre-filters
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
}

impl RateSlab {
    /// Unconditional base-rate slab
    pub fn base(amount_range: AmountRange, tenure_range: TenureRange, base_rate: Decimal) -> Self {
        Self {
            amount_range,
            tenure_range,
            classification: None,
            base_rate: Some(base_rate),
            additional_rate: Decimal::ZERO,
            effective_from: None,
            effective_to: None,
        }
    }

    /// Classification bonus slab
    pub fn bonus(
        amount_range: AmountRange,
        tenure_range: TenureRange,
        classification: impl Into<String>,
        additional_rate: Decimal,
    ) -> Self {
        Self {
            amount_range,
            tenure_range,
            classification: Some(classification.into()),
            base_rate: None,
            additional_rate,
            effective_from: None,
            effective_to: None,
        }
    }

    pub fn with_window(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.effective_from = from;
        self.effective_to = to;
        self
    }

    /// Check the invariants a matrix row must hold
    pub fn validate(&self) -> PricingResult<()> {
        AmountRange::new(self.amount_range.min, self.amount_range.max)?;
        TenureRange::new(self.tenure_range.min_months, self.tenure_range.max_months)?;

        match (&self.classification, self.base_rate) {
            (None, None) => {
                return Err(PricingError::invalid(
                    "base_rate",
                    "required on slabs without a classification",
                ))
            }
            (Some(label), _) if label.trim().is_empty() => {
                return Err(PricingError::invalid("classification", "must not be blank"))
            }
            _ => {}
        }

        if self.base_rate.map_or(false, |r| r < Decimal::ZERO) || self.additional_rate < Decimal::ZERO {
            return Err(PricingError::invalid("rate", "rates must not be negative"));
        }

        if let (Some(from), Some(to)) = (self.effective_from, self.effective_to) {
            if to < from {
                return Err(PricingError::invalid(
                    "effective_to",
                    format!("{} precedes effective_from {}", to, from),
                ));
            }
        }

        Ok(())
    }

    /// True for slabs that carry the unconditional base rate
    pub fn is_unconditional(&self) -> bool {
        self.classification.is_none()
    }

    /// Amount and tenure both fall inside the slab's inclusive ranges
    pub fn covers(&self, principal: Decimal, tenure_months: u32) -> bool {
        self.amount_range.contains(principal) && self.tenure_range.contains(tenure_months)
    }

    /// Whether the validity window contains `date` (open ends are unbounded)
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.effective_from.map_or(true, |from| date >= from)
            && self.effective_to.map_or(true, |to| date <= to)
    }
}
