//! Fixed Deposit Pricing - rate-matrix resolution and compound interest quoting
//!
//! This library provides:
//! - Slab-based rate matrices with first-match base rates and capped
//!   classification bonuses
//! - A compound interest engine (maturity, TDS, APY, monthly schedule)
//! - Single quotes (manual, matrix or catalog product) and best-of-N comparison
//! - CSV/JSON loaders and a read-through rate matrix cache

pub mod error;
pub mod config;
pub mod deposit;
pub mod rates;
pub mod projection;
pub mod quote;
pub mod scenario;

// Re-export commonly used types
pub use error::{PricingError, PricingResult};
pub use config::PricingConfig;
pub use deposit::{CompoundingFrequency, TenureUnit, DepositRequest, ComparisonRequest};
pub use rates::{RateSlab, RateMatrix, RateQuery, ResolvedRate, ClassificationBonusTable};
pub use projection::{CompoundInterestEngine, CompoundingSpec, MonthlyEntry};
pub use quote::{QuoteOrchestrator, QuoteResult};
pub use scenario::ComparisonResult;
