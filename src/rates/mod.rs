//! Interest rate matrices: slabs, resolution, classification bonuses and sources

mod slab;
mod matrix;
mod bonus;
pub mod loader;
pub mod cache;

pub use slab::{AmountRange, TenureRange, RateSlab};
pub use matrix::{RateMatrix, RateQuery, ResolvedRate};
pub use bonus::{
    ClassificationBonusTable, capped_additional_rate, select_classifications,
    MAX_ADDITIONAL_RATE, MAX_CLASSIFICATIONS,
};
pub use loader::{load_named_matrix, load_rate_matrix, load_rate_matrix_from_reader, parse_catalog_rates};
pub use cache::{RateMatrixSource, ProductInfo, InMemoryRateSource, CachedRateSource, CacheStats};
