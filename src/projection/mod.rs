//! Compound interest projection for a single deposit

mod precision;
mod engine;
mod schedule;

pub use precision::{compound_factor, compounding_base, compounding_exponent, round_money, MONEY_SCALE};
pub use engine::{add_months, CompoundInterestEngine, CompoundingSpec};
pub use schedule::{DepositProjection, MonthlyEntry, ScheduleSummary};
