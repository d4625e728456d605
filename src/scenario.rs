//! Best-of-N comparison across deposit scenarios
//!
//! Scenarios are independent manual quotes, so they run on the rayon pool
//! when the config allows it. Results always come back in input order.

use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::deposit::{ComparisonRequest, DepositRequest};
use crate::error::{PricingError, PricingResult};
use crate::quote::{QuoteOrchestrator, QuoteResult};

/// Quotes for every scenario plus the winner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// One quote per scenario, in request order
    pub results: Vec<QuoteResult>,

    /// Scenario with the strictly greatest maturity amount; earliest wins ties
    pub best_index: usize,
}

impl ComparisonResult {
    /// The winning quote, `None` when `best_index` is out of range
    pub fn best(&self) -> Option<&QuoteResult> {
        self.results.get(self.best_index)
    }

    /// Maturity gap between the best scenario and each scenario
    pub fn shortfalls(&self) -> Vec<Decimal> {
        match self.best() {
            Some(best) => self
                .results
                .iter()
                .map(|r| best.maturity_amount - r.maturity_amount)
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Index of the first strictly greatest value
fn best_index<I>(maturities: I) -> Option<usize>
where
    I: IntoIterator<Item = Decimal>,
{
    let mut best: Option<(usize, Decimal)> = None;
    for (i, maturity) in maturities.into_iter().enumerate() {
        match best {
            Some((_, current)) if maturity > current => best = Some((i, maturity)),
            None => best = Some((i, maturity)),
            _ => {}
        }
    }
    best.map(|(i, _)| i)
}

impl QuoteOrchestrator {
    /// Quote every scenario and pick the one with the highest maturity amount
    pub fn compare(&self, request: &ComparisonRequest) -> PricingResult<ComparisonResult> {
        if request.scenarios.is_empty() {
            return Err(PricingError::invalid("scenarios", "at least one scenario is required"));
        }
        if let Some(principal) = request.common_principal {
            if principal <= Decimal::ZERO {
                return Err(PricingError::invalid(
                    "common_principal",
                    format!("must be positive, got {}", principal),
                ));
            }
        }

        log::info!(
            "Comparing {} FD scenarios (parallel={})",
            request.scenarios.len(),
            self.config().parallel_compare
        );

        let scenarios: Vec<DepositRequest> = request
            .scenarios
            .iter()
            .cloned()
            .map(|mut scenario| {
                if let Some(principal) = request.common_principal {
                    scenario.principal = principal;
                }
                scenario
            })
            .collect();

        let results = if self.config().parallel_compare {
            scenarios
                .par_iter()
                .map(|scenario| self.quote(scenario))
                .collect::<PricingResult<Vec<_>>>()?
        } else {
            scenarios
                .iter()
                .map(|scenario| self.quote(scenario))
                .collect::<PricingResult<Vec<_>>>()?
        };

        let best_index = best_index(results.iter().map(|r| r.maturity_amount))
            .ok_or_else(|| PricingError::computation("comparison produced no results"))?;

        log::info!(
            "Best scenario: #{} with maturity {}",
            best_index + 1,
            results[best_index].maturity_amount
        );

        Ok(ComparisonResult { results, best_index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PricingConfig;
    use crate::deposit::{load_scenarios, CompoundingFrequency};
    use rust_decimal_macros::dec;
    use std::path::Path;

    fn scenario(principal: Decimal, months: u32, rate: Decimal, frequency: CompoundingFrequency) -> DepositRequest {
        DepositRequest::new(principal, months)
            .with_rate(rate)
            .with_frequency(frequency)
    }

    #[test]
    fn test_best_index_strict() {
        assert_eq!(best_index([dec!(105000), dec!(110500), dec!(110500)]), Some(1));
        assert_eq!(best_index([dec!(1), dec!(1), dec!(1)]), Some(0));
        assert_eq!(best_index([dec!(3), dec!(2), dec!(1)]), Some(0));
        assert_eq!(best_index(Vec::<Decimal>::new()), None);
    }

    #[test]
    fn test_compare_picks_highest_maturity() {
        let request = ComparisonRequest {
            scenarios: vec![
                scenario(dec!(100000), 12, dec!(7), CompoundingFrequency::Annually),
                scenario(dec!(100000), 12, dec!(7), CompoundingFrequency::Monthly),
                scenario(dec!(100000), 12, dec!(7), CompoundingFrequency::Quarterly),
            ],
            common_principal: None,
        };
        let comparison = QuoteOrchestrator::default().compare(&request).unwrap();

        assert_eq!(comparison.results.len(), 3);
        assert_eq!(comparison.best_index, 1);
        assert_eq!(comparison.best().unwrap().maturity_amount, dec!(107229.01));
        assert_eq!(comparison.results[0].maturity_amount, dec!(107000.00));
        assert_eq!(comparison.results[2].maturity_amount, dec!(107185.90));
        assert_eq!(comparison.shortfalls()[0], dec!(229.01));
        assert_eq!(comparison.shortfalls()[1], Decimal::ZERO);
    }

    #[test]
    fn test_compare_tie_keeps_first() {
        let same = scenario(dec!(50000), 24, dec!(6.5), CompoundingFrequency::Quarterly);
        let request = ComparisonRequest {
            scenarios: vec![
                scenario(dec!(50000), 24, dec!(5), CompoundingFrequency::Quarterly),
                same.clone(),
                same,
            ],
            common_principal: None,
        };
        let comparison = QuoteOrchestrator::default().compare(&request).unwrap();
        assert_eq!(comparison.best_index, 1);
    }

    #[test]
    fn test_common_principal_overrides() {
        let request = ComparisonRequest {
            scenarios: vec![
                scenario(dec!(1000), 12, dec!(7), CompoundingFrequency::Quarterly),
                scenario(dec!(900000), 12, dec!(6), CompoundingFrequency::Quarterly),
            ],
            common_principal: Some(dec!(100000)),
        };
        let comparison = QuoteOrchestrator::default().compare(&request).unwrap();

        assert!(comparison.results.iter().all(|r| r.principal == dec!(100000)));
        assert_eq!(comparison.best_index, 0);
        assert_eq!(comparison.results[0].maturity_amount, dec!(107185.90));
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let scenarios: Vec<DepositRequest> = (1..=40)
            .map(|i| scenario(dec!(10000) * Decimal::from(i), i, dec!(5) + Decimal::from(i % 4), CompoundingFrequency::Monthly))
            .collect();
        let request = ComparisonRequest { scenarios, common_principal: None };

        let parallel = QuoteOrchestrator::default().compare(&request).unwrap();
        let sequential = QuoteOrchestrator::new(PricingConfig {
            parallel_compare: false,
            ..PricingConfig::default()
        })
        .compare(&request)
        .unwrap();

        assert_eq!(parallel.best_index, sequential.best_index);
        for (i, result) in parallel.results.iter().enumerate() {
            assert_eq!(result.tenure_months, (i + 1) as u32);
            assert_eq!(result.maturity_amount, sequential.results[i].maturity_amount);
        }
    }

    #[test]
    fn test_compare_errors() {
        let orchestrator = QuoteOrchestrator::default();
        assert!(orchestrator.compare(&ComparisonRequest::default()).unwrap_err().is_invalid_input());

        let bad_principal = ComparisonRequest {
            scenarios: vec![scenario(dec!(1000), 12, dec!(7), CompoundingFrequency::Quarterly)],
            common_principal: Some(Decimal::ZERO),
        };
        assert!(orchestrator.compare(&bad_principal).unwrap_err().is_invalid_input());

        let missing_rate = ComparisonRequest {
            scenarios: vec![
                scenario(dec!(1000), 12, dec!(7), CompoundingFrequency::Quarterly),
                DepositRequest::new(dec!(1000), 12),
            ],
            common_principal: None,
        };
        assert!(matches!(
            orchestrator.compare(&missing_rate),
            Err(PricingError::RateResolutionFailure { .. })
        ));
    }

    #[test]
    fn test_compare_sample_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/scenarios/sample.csv");
        let request = ComparisonRequest {
            scenarios: load_scenarios(path).unwrap(),
            common_principal: None,
        };
        let comparison = QuoteOrchestrator::default().compare(&request).unwrap();

        // 7% + SENIOR_CITIZEN bonus wins
        assert_eq!(comparison.best_index, 2);
        assert_eq!(comparison.best().unwrap().final_rate, dec!(8.00));
    }

    #[test]
    fn test_best_out_of_range_is_none() {
        let comparison: ComparisonResult = serde_json::from_str(r#"{"results": [], "bestIndex": 5}"#).unwrap();
        assert!(comparison.best().is_none());
        assert!(comparison.shortfalls().is_empty());
    }
}
