//! Deposit request vocabulary matching the calculator request format

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PricingError, PricingResult};

/// How often interest is capitalized into principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompoundingFrequency {
    Monthly,
    Quarterly,
    HalfYearly,
    Annually,
}

impl CompoundingFrequency {
    /// Compounding periods per year
    pub fn periods_per_year(&self) -> u32 {
        match self {
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::HalfYearly => 2,
            CompoundingFrequency::Annually => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompoundingFrequency::Monthly => "MONTHLY",
            CompoundingFrequency::Quarterly => "QUARTERLY",
            CompoundingFrequency::HalfYearly => "HALF_YEARLY",
            CompoundingFrequency::Annually => "ANNUALLY",
        }
    }
}

impl Default for CompoundingFrequency {
    fn default() -> Self {
        CompoundingFrequency::Quarterly
    }
}

impl fmt::Display for CompoundingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CompoundingFrequency {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "MONTHLY" => Ok(CompoundingFrequency::Monthly),
            "QUARTERLY" => Ok(CompoundingFrequency::Quarterly),
            "HALF_YEARLY" | "SEMI_ANNUALLY" | "SEMI_ANNUAL" => Ok(CompoundingFrequency::HalfYearly),
            "ANNUALLY" | "YEARLY" => Ok(CompoundingFrequency::Annually),
            other => Err(PricingError::invalid(
                "compounding_frequency",
                format!("unknown compounding frequency '{}'", other),
            )),
        }
    }
}

/// Unit the caller expressed tenure in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenureUnit {
    Months,
    Years,
}

impl TenureUnit {
    /// Normalize a tenure to whole months
    pub fn to_months(&self, tenure: u32) -> PricingResult<u32> {
        match self {
            TenureUnit::Months => Ok(tenure),
            TenureUnit::Years => tenure.checked_mul(12).ok_or_else(|| {
                PricingError::invalid("tenure", format!("{} years overflows a month count", tenure))
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TenureUnit::Months => "MONTHS",
            TenureUnit::Years => "YEARS",
        }
    }
}

impl Default for TenureUnit {
    fn default() -> Self {
        TenureUnit::Months
    }
}

impl fmt::Display for TenureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TenureUnit {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MONTHS" | "MONTH" | "M" => Ok(TenureUnit::Months),
            "YEARS" | "YEAR" | "Y" => Ok(TenureUnit::Years),
            other => Err(PricingError::invalid(
                "tenure_unit",
                format!("unknown tenure unit '{}'", other),
            )),
        }
    }
}

/// A single deposit to be quoted
///
/// `interest_rate` is the caller-supplied base rate for manual quotes; quotes
/// priced from a rate matrix ignore it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositRequest {
    /// Amount deposited
    pub principal: Decimal,

    /// Tenure in `tenure_unit`
    pub tenure: u32,

    #[serde(default)]
    pub tenure_unit: TenureUnit,

    /// Falls back to the configured default (quarterly) when absent
    #[serde(default)]
    pub compounding_frequency: Option<CompoundingFrequency>,

    /// Tax withheld on interest, in percent
    #[serde(default)]
    pub tds_rate: Option<Decimal>,

    /// Base annual rate in percent for manual quotes
    #[serde(default)]
    pub interest_rate: Option<Decimal>,

    /// Customer classification labels, in the order the customer gave them
    #[serde(default)]
    pub classifications: Vec<String>,

    /// Deposit start date; today when absent
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

impl DepositRequest {
    /// Create a request with months tenure and all optional fields unset
    pub fn new(principal: Decimal, tenure_months: u32) -> Self {
        Self {
            principal,
            tenure: tenure_months,
            tenure_unit: TenureUnit::Months,
            compounding_frequency: None,
            tds_rate: None,
            interest_rate: None,
            classifications: Vec::new(),
            start_date: None,
        }
    }

    pub fn with_rate(mut self, interest_rate: Decimal) -> Self {
        self.interest_rate = Some(interest_rate);
        self
    }

    pub fn with_frequency(mut self, frequency: CompoundingFrequency) -> Self {
        self.compounding_frequency = Some(frequency);
        self
    }

    pub fn with_tds(mut self, tds_rate: Decimal) -> Self {
        self.tds_rate = Some(tds_rate);
        self
    }

    pub fn with_tenure_unit(mut self, unit: TenureUnit) -> Self {
        self.tenure_unit = unit;
        self
    }

    pub fn with_classifications<I, S>(mut self, classifications: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classifications = classifications.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Reject non-positive principal or tenure and return tenure in months
    pub fn validated_tenure_months(&self) -> PricingResult<u32> {
        if self.principal <= Decimal::ZERO {
            return Err(PricingError::invalid(
                "principal",
                format!("must be positive, got {}", self.principal),
            ));
        }
        if self.tenure == 0 {
            return Err(PricingError::invalid("tenure", "must be positive"));
        }
        self.tenure_unit.to_months(self.tenure)
    }
}

/// Several deposits compared side by side
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonRequest {
    pub scenarios: Vec<DepositRequest>,

    /// Overrides every scenario's principal when present
    #[serde(default)]
    pub common_principal: Option<Decimal>,
}
