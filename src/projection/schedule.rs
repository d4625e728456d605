//! Monthly growth schedule and projection output

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One month of a deposit's growth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEntry {
    /// 1-based month number
    pub month: u32,

    /// Start date plus `month` months
    pub date: NaiveDate,

    pub opening_balance: Decimal,
    pub interest_earned: Decimal,
    pub closing_balance: Decimal,
    pub cumulative_interest: Decimal,
}

/// Everything the engine derives for one principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositProjection {
    pub principal: Decimal,
    pub maturity_before_tax: Decimal,
    pub interest_earned: Decimal,
    pub tds_amount: Decimal,
    pub net_interest: Decimal,
    pub maturity_after_tax: Decimal,
    pub annual_percentage_yield: Decimal,
    pub start_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub schedule: Vec<MonthlyEntry>,
}

impl DepositProjection {
    /// Summary statistics for the schedule
    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary::from_entries(self.principal, &self.schedule)
    }
}

/// Summary of a monthly schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub total_months: u32,
    pub total_interest: Decimal,
    pub largest_monthly_interest: Decimal,
    pub final_balance: Decimal,
}

impl ScheduleSummary {
    /// Totals over `entries`; an empty schedule leaves the balance at `principal`
    pub fn from_entries(principal: Decimal, entries: &[MonthlyEntry]) -> Self {
        Self {
            total_months: entries.len() as u32,
            total_interest: entries.iter().map(|e| e.interest_earned).sum(),
            largest_monthly_interest: entries
                .iter()
                .map(|e| e.interest_earned)
                .max()
                .unwrap_or(Decimal::ZERO),
            final_balance: entries.last().map_or(principal, |e| e.closing_balance),
        }
    }
}
