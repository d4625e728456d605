//! Single-deposit quoting
//!
//! The orchestrator is the only place where rate resolution and compounding
//! meet: it settles the final rate (matrix, product fallback or manual rate
//! plus the standard bonus table), then hands it to the engine.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::deposit::{CompoundingFrequency, DepositRequest, TenureUnit};
use crate::error::{PricingError, PricingResult};
use crate::projection::{CompoundInterestEngine, CompoundingSpec, MonthlyEntry, ScheduleSummary};
use crate::rates::{
    select_classifications, ClassificationBonusTable, ProductInfo, RateMatrix, RateMatrixSource, ResolvedRate,
};

/// Full pricing of one deposit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    pub principal: Decimal,

    /// Rate before classification bonuses, in percent
    pub base_rate: Decimal,

    /// Capped classification bonus, in percent
    pub additional_rate: Decimal,

    /// Rate actually compounded
    pub final_rate: Decimal,

    pub tenure: u32,
    pub tenure_unit: TenureUnit,
    pub tenure_months: u32,
    pub compounding_frequency: CompoundingFrequency,
    pub tds_rate: Decimal,

    pub interest_earned: Decimal,
    pub tds_amount: Decimal,
    pub net_interest: Decimal,
    pub maturity_before_tax: Decimal,

    /// Maturity value net of TDS
    pub maturity_amount: Decimal,

    /// Annual percentage yield, in percent
    pub apy: Decimal,

    pub start_date: NaiveDate,
    pub maturity_date: NaiveDate,

    /// Classifications that counted towards the bonus, in order
    pub classifications: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,

    pub monthly_breakdown: Vec<MonthlyEntry>,
}

impl QuoteResult {
    /// Summary statistics for the monthly breakdown
    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary::from_entries(self.principal, &self.monthly_breakdown)
    }
}

/// Sequences rate resolution and compounding for quote requests
#[derive(Debug, Clone, Default)]
pub struct QuoteOrchestrator {
    config: PricingConfig,
    bonus_table: ClassificationBonusTable,
}

impl QuoteOrchestrator {
    pub fn new(config: PricingConfig) -> Self {
        Self {
            config,
            bonus_table: ClassificationBonusTable::standard(),
        }
    }

    /// Replace the bonus table used for manually rated quotes
    pub fn with_bonus_table(mut self, bonus_table: ClassificationBonusTable) -> Self {
        self.bonus_table = bonus_table;
        self
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Quote with the caller's own base rate plus standard classification bonuses
    pub fn quote(&self, request: &DepositRequest) -> PricingResult<QuoteResult> {
        let base_rate = request
            .interest_rate
            .ok_or_else(|| PricingError::unresolved("manual quote requires an interest rate"))?;
        if base_rate < Decimal::ZERO {
            return Err(PricingError::invalid(
                "interest_rate",
                format!("must not be negative, got {}", base_rate),
            ));
        }

        log::info!(
            "Manual quote: principal={}, tenure={} {}, rate={}%",
            request.principal,
            request.tenure,
            request.tenure_unit,
            base_rate
        );

        let rates = ResolvedRate {
            base_rate,
            additional_rate: self.bonus_table.additional_rate(&request.classifications),
        };
        let applied = self.bonus_table.applied_classifications(&request.classifications);
        self.price(request, rates, applied, None)
    }

    /// Quote against a rate matrix, falling back to `default_rate` when no
    /// base slab covers the deposit
    pub fn quote_with_matrix(
        &self,
        request: &DepositRequest,
        matrix: &RateMatrix,
        default_rate: Option<Decimal>,
    ) -> PricingResult<QuoteResult> {
        let rates = self.resolve_rates(request, matrix, default_rate)?;
        self.price(request, rates, matrix_classifications(request), None)
    }

    /// Quote a catalog product, fetching its matrix through `source`
    ///
    /// Missing product metadata only costs the product fields and fallbacks;
    /// a missing matrix fails the quote.
    pub fn quote_product<S>(&self, request: &DepositRequest, product_id: u64, source: &S) -> PricingResult<QuoteResult>
    where
        S: RateMatrixSource + ?Sized,
    {
        log::info!(
            "Calculating FD for product={}, principal={}, tenure={} {}",
            product_id,
            request.principal,
            request.tenure,
            request.tenure_unit
        );

        let matrix = source.rate_matrix(product_id)?;
        let product = match source.product(product_id) {
            Ok(product) => Some(product),
            Err(e) => {
                log::warn!("Unable to fetch product metadata: {}", e);
                None
            }
        };

        let default_rate = product.as_ref().and_then(|p| p.base_interest_rate);
        let rates = self.resolve_rates(request, &matrix, default_rate)?;
        let product_tds = product.as_ref().and_then(|p| p.tds_rate);
        let mut result = self.price(request, rates, matrix_classifications(request), product_tds)?;

        result.product_id = Some(product_id);
        if let Some(ProductInfo { product_name, product_code, .. }) = product {
            result.product_name = Some(product_name);
            result.product_code = Some(product_code);
        }
        Ok(result)
    }

    fn resolve_rates(
        &self,
        request: &DepositRequest,
        matrix: &RateMatrix,
        default_rate: Option<Decimal>,
    ) -> PricingResult<ResolvedRate> {
        let tenure_months = request.validated_tenure_months()?;

        let base_rate = match matrix.find_base_slab(request.principal, tenure_months) {
            Some(slab) => slab.base_rate.unwrap_or(Decimal::ZERO),
            None => match default_rate {
                Some(rate) => {
                    log::warn!(
                        "No specific base rate found for principal {} and tenure {} months, falling back to default rate {}%",
                        request.principal,
                        tenure_months,
                        rate
                    );
                    rate
                }
                None => {
                    return Err(PricingError::unresolved(format!(
                        "no base rate for principal {} and tenure {} months, and no default rate",
                        request.principal, tenure_months
                    )))
                }
            },
        };

        let rates = ResolvedRate {
            base_rate,
            additional_rate: matrix.resolve_additional_rate(&request.classifications),
        };
        log::debug!("Found baseRate={}%, additionalRate={}%", rates.base_rate, rates.additional_rate);
        Ok(rates)
    }

    /// Run the engine for settled rates and assemble the result
    fn price(
        &self,
        request: &DepositRequest,
        rates: ResolvedRate,
        classifications: Vec<String>,
        product_tds: Option<Decimal>,
    ) -> PricingResult<QuoteResult> {
        let tenure_months = request.validated_tenure_months()?;
        let frequency = request
            .compounding_frequency
            .unwrap_or(self.config.default_frequency);
        let tds_rate = request
            .tds_rate
            .or(product_tds)
            .unwrap_or(self.config.default_tds_rate);
        let start_date = request
            .start_date
            .unwrap_or_else(|| Local::now().date_naive());

        let final_rate = rates.final_rate();
        let engine = CompoundInterestEngine::new(
            CompoundingSpec::new(final_rate, tenure_months, frequency).with_tds(tds_rate),
        )?;
        let projection = engine.project(request.principal, start_date)?;

        log::info!(
            "FD calculation complete: Maturity={}, APY={}%",
            projection.maturity_after_tax,
            projection.annual_percentage_yield
        );

        Ok(QuoteResult {
            principal: request.principal,
            base_rate: rates.base_rate,
            additional_rate: rates.additional_rate,
            final_rate,
            tenure: request.tenure,
            tenure_unit: request.tenure_unit,
            tenure_months,
            compounding_frequency: frequency,
            tds_rate,
            interest_earned: projection.interest_earned,
            tds_amount: projection.tds_amount,
            net_interest: projection.net_interest,
            maturity_before_tax: projection.maturity_before_tax,
            maturity_amount: projection.maturity_after_tax,
            apy: projection.annual_percentage_yield,
            start_date,
            maturity_date: projection.maturity_date,
            classifications,
            product_id: None,
            product_name: None,
            product_code: None,
            monthly_breakdown: projection.schedule,
        })
    }
}

/// Classifications a matrix lookup considers, exactly as given
fn matrix_classifications(request: &DepositRequest) -> Vec<String> {
    select_classifications(&request.classifications)
        .into_iter()
        .map(String::from)
        .collect()
}
