//! Load comparison scenarios from CSV
//!
//! Columns: principal, tenure, tenure_unit, frequency, tds_rate,
//! interest_rate, classifications (`;`-separated).

use std::path::Path;
use std::str::FromStr;

use csv::Reader;
use rust_decimal::Decimal;

use super::{CompoundingFrequency, DepositRequest, TenureUnit};
use crate::error::{PricingError, PricingResult};

/// Raw CSV row matching the scenario file columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    principal: String,
    tenure: u32,
    #[serde(default)]
    tenure_unit: Option<String>,
    #[serde(default)]
    frequency: Option<String>,
    #[serde(default)]
    tds_rate: Option<String>,
    #[serde(default)]
    interest_rate: Option<String>,
    #[serde(default)]
    classifications: Option<String>,
}

impl CsvRow {
    fn to_request(self) -> PricingResult<DepositRequest> {
        let principal = parse_decimal("principal", &self.principal)?;

        let tenure_unit = match self.tenure_unit.as_deref() {
            Some(unit) if !unit.trim().is_empty() => TenureUnit::from_str(unit)?,
            _ => TenureUnit::Months,
        };

        let compounding_frequency = match self.frequency.as_deref() {
            Some(freq) if !freq.trim().is_empty() => Some(CompoundingFrequency::from_str(freq)?),
            _ => None,
        };

        let tds_rate = self
            .tds_rate
            .as_deref()
            .map(|v| parse_decimal("tds_rate", v))
            .transpose()?;

        let interest_rate = self
            .interest_rate
            .as_deref()
            .map(|v| parse_decimal("interest_rate", v))
            .transpose()?;

        let classifications = self
            .classifications
            .as_deref()
            .map(|list| {
                list.split(';')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(DepositRequest {
            principal,
            tenure: self.tenure,
            tenure_unit,
            compounding_frequency,
            tds_rate,
            interest_rate,
            classifications,
            start_date: None,
        })
    }
}

/// Parse a decimal CSV cell, naming the column on failure
pub(crate) fn parse_decimal(field: &str, value: &str) -> PricingResult<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|e| PricingError::invalid(field, format!("'{}' is not a decimal: {}", value, e)))
}

/// Load all scenarios from a CSV file
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> PricingResult<Vec<DepositRequest>> {
    let reader = Reader::from_path(path)?;
    collect_rows(reader)
}

/// Load scenarios from any reader (e.g., string buffer, network stream)
pub fn load_scenarios_from_reader<R: std::io::Read>(reader: R) -> PricingResult<Vec<DepositRequest>> {
    collect_rows(Reader::from_reader(reader))
}

fn collect_rows<R: std::io::Read>(mut reader: Reader<R>) -> PricingResult<Vec<DepositRequest>> {
    let mut scenarios = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        scenarios.push(row.to_request()?);
    }

    log::debug!("Loaded {} deposit scenarios", scenarios.len());
    Ok(scenarios)
}
