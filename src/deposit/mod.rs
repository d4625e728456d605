//! Deposit request structures and scenario loading

mod data;
pub mod loader;

pub use data::{CompoundingFrequency, TenureUnit, DepositRequest, ComparisonRequest};
pub use loader::{load_scenarios, load_scenarios_from_reader};
