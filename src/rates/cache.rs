//! Rate matrix sources and a read-through cache over them
//!
//! Fetching a matrix (over HTTP, from a database) is the caller's business;
//! pricing only needs something that answers [`RateMatrixSource`]. The cache
//! keeps one immutable snapshot per product and hands out shared references,
//! so resolution never observes a matrix changing underneath it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::matrix::RateMatrix;
use crate::config::PricingConfig;
use crate::error::{PricingError, PricingResult};

/// Product metadata the quote needs from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub product_id: u64,
    pub product_name: String,
    pub product_code: String,

    /// Product-level default rate, used when no base slab matches
    #[serde(default)]
    pub base_interest_rate: Option<Decimal>,

    /// Product-level TDS rate, used when the request carries none
    #[serde(default)]
    pub tds_rate: Option<Decimal>,
}

/// Anything that can supply a product's rate matrix and metadata
pub trait RateMatrixSource: Send + Sync {
    fn rate_matrix(&self, product_id: u64) -> PricingResult<Arc<RateMatrix>>;

    fn product(&self, product_id: u64) -> PricingResult<ProductInfo>;
}

/// Matrices supplied directly in-process
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateSource {
    matrices: HashMap<u64, Arc<RateMatrix>>,
    products: HashMap<u64, ProductInfo>,
}

impl InMemoryRateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product together with its matrix
    pub fn insert(&mut self, product: ProductInfo, matrix: RateMatrix) {
        self.matrices.insert(product.product_id, Arc::new(matrix));
        self.products.insert(product.product_id, product);
    }

    /// Register a matrix without product metadata
    pub fn insert_matrix(&mut self, product_id: u64, matrix: RateMatrix) {
        self.matrices.insert(product_id, Arc::new(matrix));
    }
}

impl RateMatrixSource for InMemoryRateSource {
    fn rate_matrix(&self, product_id: u64) -> PricingResult<Arc<RateMatrix>> {
        self.matrices
            .get(&product_id)
            .cloned()
            .ok_or_else(|| PricingError::RateSource {
                product_id,
                reason: "no rate matrix registered".to_string(),
            })
    }

    fn product(&self, product_id: u64) -> PricingResult<ProductInfo> {
        self.products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| PricingError::RateSource {
                product_id,
                reason: "product not found".to_string(),
            })
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    fetched_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
        }
    }

    fn is_fresh(&self, ttl: Option<Duration>) -> bool {
        ttl.map_or(true, |ttl| self.fetched_at.elapsed() < ttl)
    }
}

/// Cache statistics, mostly for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Read-through cache in front of another source
///
/// Entries expire `ttl` after they were fetched; `None` keeps them until
/// invalidated. Failed fetches are never cached.
pub struct CachedRateSource<S> {
    inner: S,
    ttl: Option<Duration>,
    matrices: RwLock<HashMap<u64, CacheEntry<Arc<RateMatrix>>>>,
    products: RwLock<HashMap<u64, CacheEntry<ProductInfo>>>,
    stats: RwLock<CacheStats>,
}

impl<S: RateMatrixSource> CachedRateSource<S> {
    pub fn new(inner: S, ttl: Option<Duration>) -> Self {
        Self {
            inner,
            ttl,
            matrices: RwLock::new(HashMap::new()),
            products: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Cache with the configured TTL
    pub fn from_config(inner: S, config: &PricingConfig) -> Self {
        Self::new(inner, config.cache_ttl())
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn stats(&self) -> CacheStats {
        *self.stats.read()
    }

    /// Drop everything cached for one product
    pub fn invalidate(&self, product_id: u64) {
        self.matrices.write().remove(&product_id);
        self.products.write().remove(&product_id);
    }

    pub fn clear(&self) {
        self.matrices.write().clear();
        self.products.write().clear();
    }

    fn get_or_fetch<T, F>(
        &self,
        cache: &RwLock<HashMap<u64, CacheEntry<T>>>,
        product_id: u64,
        fetch: F,
    ) -> PricingResult<T>
    where
        T: Clone,
        F: FnOnce() -> PricingResult<T>,
    {
        if let Some(entry) = cache.read().get(&product_id) {
            if entry.is_fresh(self.ttl) {
                self.stats.write().hits += 1;
                return Ok(entry.value.clone());
            }
        }

        self.stats.write().misses += 1;
        log::debug!("Cache miss for product {}, fetching", product_id);
        let value = fetch()?;
        cache.write().insert(product_id, CacheEntry::new(value.clone()));
        Ok(value)
    }
}

impl<S: RateMatrixSource> RateMatrixSource for CachedRateSource<S> {
    fn rate_matrix(&self, product_id: u64) -> PricingResult<Arc<RateMatrix>> {
        self.get_or_fetch(&self.matrices, product_id, || self.inner.rate_matrix(product_id))
    }

    fn product(&self, product_id: u64) -> PricingResult<ProductInfo> {
        self.get_or_fetch(&self.products, product_id, || self.inner.product(product_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::slab::{AmountRange, RateSlab, TenureRange};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn product(id: u64) -> ProductInfo {
        ProductInfo {
            product_id: id,
            product_name: "Standard Fixed Deposit".to_string(),
            product_code: "FD-STD-001".to_string(),
            base_interest_rate: Some(dec!(6.5)),
            tds_rate: Some(dec!(10)),
        }
    }

    fn matrix() -> RateMatrix {
        RateMatrix::new(vec![RateSlab::base(
            AmountRange::new(dec!(10000), dec!(100000)).unwrap(),
            TenureRange::new(6, 12).unwrap(),
            dec!(6.50),
        )])
        .unwrap()
    }

    /// Counts how often the wrapped source is actually hit
    struct CountingSource {
        inner: InMemoryRateSource,
        fetches: AtomicUsize,
    }

    impl RateMatrixSource for CountingSource {
        fn rate_matrix(&self, product_id: u64) -> PricingResult<Arc<RateMatrix>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.rate_matrix(product_id)
        }

        fn product(&self, product_id: u64) -> PricingResult<ProductInfo> {
            self.inner.product(product_id)
        }
    }

    fn counting() -> CountingSource {
        let mut inner = InMemoryRateSource::new();
        inner.insert(product(1), matrix());
        CountingSource {
            inner,
            fetches: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_in_memory_source() {
        let mut source = InMemoryRateSource::new();
        source.insert(product(1), matrix());
        source.insert_matrix(2, RateMatrix::empty());

        assert_eq!(source.rate_matrix(1).unwrap().len(), 1);
        assert_eq!(source.product(1).unwrap().product_code, "FD-STD-001");
        assert!(source.rate_matrix(2).unwrap().is_empty());
        assert!(source.product(2).is_err());
        assert!(matches!(
            source.rate_matrix(3),
            Err(PricingError::RateSource { product_id: 3, .. })
        ));
    }

    #[test]
    fn test_read_through_fetches_once() {
        let cache = CachedRateSource::new(counting(), None);

        let first = cache.rate_matrix(1).unwrap();
        let second = cache.rate_matrix(1).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.inner().fetches.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_invalidate_refetches() {
        let cache = CachedRateSource::new(counting(), None);
        cache.rate_matrix(1).unwrap();
        cache.invalidate(1);
        cache.rate_matrix(1).unwrap();
        assert_eq!(cache.inner().fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_expired_entries_refetch() {
        let cache = CachedRateSource::new(counting(), Some(Duration::ZERO));
        cache.rate_matrix(1).unwrap();
        cache.rate_matrix(1).unwrap();
        assert_eq!(cache.inner().fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let cache = CachedRateSource::new(counting(), None);
        assert!(cache.rate_matrix(99).is_err());
        assert!(cache.rate_matrix(99).is_err());
        assert_eq!(cache.inner().fetches.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().hits, 0);
    }
}
