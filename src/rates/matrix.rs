//! Rate matrix resolution
//!
//! Slabs are scanned in the order the matrix was built with; the first
//! matching slab wins. Overlapping ranges are therefore resolved by
//! declaration order, which callers rely on.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::bonus::{capped_additional_rate, select_classifications};
use super::slab::RateSlab;
use crate::error::PricingResult;

/// What a deposit asks the matrix for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuery {
    pub principal: Decimal,
    pub tenure_months: u32,
    pub classifications: Vec<String>,
}

impl RateQuery {
    pub fn new(principal: Decimal, tenure_months: u32) -> Self {
        Self {
            principal,
            tenure_months,
            classifications: Vec::new(),
        }
    }

    pub fn with_classifications<I, S>(mut self, classifications: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classifications = classifications.into_iter().map(Into::into).collect();
        self
    }
}

/// Base rate plus capped classification bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRate {
    /// Zero when no unconditional slab matched
    pub base_rate: Decimal,
    /// Summed bonus, capped at 2.00 and rounded to 2 decimals
    pub additional_rate: Decimal,
}

impl ResolvedRate {
    pub fn final_rate(&self) -> Decimal {
        self.base_rate + self.additional_rate
    }
}

/// Ordered, immutable snapshot of rate slabs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateMatrix {
    slabs: Vec<RateSlab>,
}

impl RateMatrix {
    /// Build a matrix, validating every slab and keeping the given order
    pub fn new(slabs: Vec<RateSlab>) -> PricingResult<Self> {
        for slab in &slabs {
            slab.validate()?;
        }
        Ok(Self { slabs })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn slabs(&self) -> &[RateSlab] {
        &self.slabs
    }

    pub fn len(&self) -> usize {
        self.slabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slabs.is_empty()
    }

    /// First unconditional slab covering the principal and tenure
    pub fn find_base_slab(&self, principal: Decimal, tenure_months: u32) -> Option<&RateSlab> {
        log::debug!(
            "Searching for base rate: principal={}, tenureMonths={}",
            principal,
            tenure_months
        );
        self.slabs
            .iter()
            .filter(|slab| slab.is_unconditional())
            .find(|slab| {
                let matched = slab.covers(principal, tenure_months);
                log::debug!(
                    "Checking slab: amount=[{}, {}], term=[{}, {}], matched={}",
                    slab.amount_range.min,
                    slab.amount_range.max,
                    slab.tenure_range.min_months,
                    slab.tenure_range.max_months,
                    matched
                );
                matched
            })
    }

    /// Base rate of the first matching unconditional slab, or zero
    ///
    /// Zero is a sentinel: callers that need to tell "no slab" apart from a
    /// genuine 0% slab use [`RateMatrix::find_base_slab`].
    pub fn resolve_base_rate(&self, principal: Decimal, tenure_months: u32) -> Decimal {
        match self.find_base_slab(principal, tenure_months) {
            Some(slab) => {
                let rate = slab.base_rate.unwrap_or(Decimal::ZERO);
                log::debug!("Found matching base rate: {}%", rate);
                rate
            }
            None => {
                log::warn!(
                    "No matching base rate found for principal {} and tenure {} months",
                    principal,
                    tenure_months
                );
                Decimal::ZERO
            }
        }
    }

    /// First slab carrying the given classification, regardless of range
    pub fn find_classification_slab(&self, classification: &str) -> Option<&RateSlab> {
        self.slabs
            .iter()
            .find(|slab| slab.classification.as_deref() == Some(classification))
    }

    /// Capped sum of the bonuses for at most two distinct classifications
    pub fn resolve_additional_rate<S: AsRef<str>>(&self, classifications: &[S]) -> Decimal {
        let mut total = Decimal::ZERO;

        for label in select_classifications(classifications) {
            match self.find_classification_slab(label) {
                Some(slab) => {
                    log::debug!("Matched classification {} -> +{}%", label, slab.additional_rate);
                    total += slab.additional_rate;
                }
                None => log::warn!("No rate slab for classification {}; contributes 0%", label),
            }
        }

        capped_additional_rate(total)
    }

    /// Resolve both halves of a query
    pub fn resolve(&self, query: &RateQuery) -> ResolvedRate {
        ResolvedRate {
            base_rate: self.resolve_base_rate(query.principal, query.tenure_months),
            additional_rate: self.resolve_additional_rate(&query.classifications),
        }
    }

    /// Matrix restricted to slabs effective on `date`, order preserved
    pub fn effective_on(&self, date: NaiveDate) -> RateMatrix {
        RateMatrix {
            slabs: self
                .slabs
                .iter()
                .filter(|slab| slab.is_effective_on(date))
                .cloned()
                .collect(),
        }
    }
}
