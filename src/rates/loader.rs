//! Rate matrix loaders
//!
//! Two sources feed a [`RateMatrix`]: a CSV file kept alongside the
//! deployment (data/rates/) and the JSON rows returned by the product
//! catalog. Row order is preserved in both, since the resolver is
//! first-match.

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::Reader;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::matrix::RateMatrix;
use super::slab::{AmountRange, RateSlab, TenureRange};
use crate::error::{PricingError, PricingResult};

/// Default directory for rate matrix CSV files
pub const DEFAULT_RATES_PATH: &str = "data/rates";

/// Raw CSV row
#[derive(Debug, Deserialize)]
struct CsvRow {
    min_amount: String,
    max_amount: String,
    min_term_months: u32,
    max_term_months: u32,
    #[serde(default)]
    classification: Option<String>,
    #[serde(default)]
    base_rate: Option<String>,
    #[serde(default)]
    additional_rate: Option<String>,
    #[serde(default)]
    effective_from: Option<NaiveDate>,
    #[serde(default)]
    effective_to: Option<NaiveDate>,
}

impl CsvRow {
    fn to_slab(self) -> PricingResult<RateSlab> {
        let classification = self
            .classification
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let base_rate = optional_decimal("base_rate", self.base_rate.as_deref())?;
        let additional_rate =
            optional_decimal("additional_rate", self.additional_rate.as_deref())?.unwrap_or(Decimal::ZERO);

        build_slab(
            decimal("min_amount", &self.min_amount)?,
            decimal("max_amount", &self.max_amount)?,
            self.min_term_months,
            self.max_term_months,
            classification,
            base_rate,
            additional_rate,
            self.effective_from,
            self.effective_to,
        )
    }
}

/// One row as served by the product catalog
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRateRow {
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub min_term_months: Decimal,
    pub max_term_months: Decimal,
    #[serde(default)]
    pub customer_classification: Option<String>,
    #[serde(default)]
    pub interest_rate: Option<Decimal>,
    #[serde(default)]
    pub additional_rate: Option<Decimal>,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl CatalogRateRow {
    pub fn to_slab(&self) -> PricingResult<RateSlab> {
        let classification = self
            .customer_classification
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from);

        build_slab(
            self.min_amount,
            self.max_amount,
            whole_months("minTermMonths", self.min_term_months)?,
            whole_months("maxTermMonths", self.max_term_months)?,
            classification,
            self.interest_rate,
            self.additional_rate.unwrap_or(Decimal::ZERO),
            self.effective_date,
            self.end_date,
        )
    }
}

/// Catalog responses arrive either bare or wrapped in an API envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogPayload {
    Rows(Vec<CatalogRateRow>),
    Envelope {
        #[serde(default = "default_success")]
        success: bool,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        data: Option<Vec<CatalogRateRow>>,
    },
}

fn default_success() -> bool {
    true
}

#[allow(clippy::too_many_arguments)]
fn build_slab(
    min_amount: Decimal,
    max_amount: Decimal,
    min_term_months: u32,
    max_term_months: u32,
    classification: Option<String>,
    base_rate: Option<Decimal>,
    additional_rate: Decimal,
    effective_from: Option<NaiveDate>,
    effective_to: Option<NaiveDate>,
) -> PricingResult<RateSlab> {
    let slab = RateSlab {
        amount_range: AmountRange::new(min_amount, max_amount)?,
        tenure_range: TenureRange::new(min_term_months, max_term_months)?,
        classification,
        base_rate,
        additional_rate,
        effective_from,
        effective_to,
    };
    slab.validate()?;
    Ok(slab)
}

fn decimal(field: &str, value: &str) -> PricingResult<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|e| PricingError::invalid(field, format!("'{}' is not a decimal: {}", value, e)))
}

fn optional_decimal(field: &str, value: Option<&str>) -> PricingResult<Option<Decimal>> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => decimal(field, v).map(Some),
        _ => Ok(None),
    }
}

/// Catalog terms are decimals (e.g. `6.00`); only whole months are meaningful
fn whole_months(field: &str, value: Decimal) -> PricingResult<u32> {
    if !value.fract().is_zero() {
        return Err(PricingError::invalid(field, format!("{} is not a whole number of months", value)));
    }
    value
        .to_u32()
        .ok_or_else(|| PricingError::invalid(field, format!("{} is out of range", value)))
}

/// Load a rate matrix from a CSV file
pub fn load_rate_matrix<P: AsRef<Path>>(path: P) -> PricingResult<RateMatrix> {
    let path = path.as_ref();
    let matrix = collect_rows(Reader::from_path(path)?)?;
    log::info!("Loaded {} rate slabs from {}", matrix.len(), path.display());
    Ok(matrix)
}

/// Load a rate matrix from any CSV reader
pub fn load_rate_matrix_from_reader<R: std::io::Read>(reader: R) -> PricingResult<RateMatrix> {
    collect_rows(Reader::from_reader(reader))
}

/// Load `<name>.csv` from the default rates directory
pub fn load_named_matrix(name: &str) -> PricingResult<RateMatrix> {
    load_rate_matrix(Path::new(DEFAULT_RATES_PATH).join(format!("{}.csv", name)))
}

fn collect_rows<R: std::io::Read>(mut reader: Reader<R>) -> PricingResult<RateMatrix> {
    let mut slabs = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        slabs.push(row.to_slab()?);
    }
    RateMatrix::new(slabs)
}

/// Parse the catalog's interest-rate payload into a matrix
///
/// An envelope with `success: false` or without a `data` array is treated
/// as a failed fetch.
pub fn parse_catalog_rates(json: &str) -> PricingResult<RateMatrix> {
    let rows = match serde_json::from_str::<CatalogPayload>(json)? {
        CatalogPayload::Rows(rows) => rows,
        CatalogPayload::Envelope { success, message, data } => match data {
            Some(rows) if success => rows,
            _ => {
                let reason = message.unwrap_or_else(|| "no valid data array in catalog response".to_string());
                return Err(PricingError::unresolved(reason));
            }
        },
    };

    let slabs = rows
        .iter()
        .map(CatalogRateRow::to_slab)
        .collect::<PricingResult<Vec<_>>>()?;
    RateMatrix::new(slabs)
}
