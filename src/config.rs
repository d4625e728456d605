//! Pricing configuration

use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::deposit::CompoundingFrequency;
use crate::error::PricingResult;

/// Configuration for quoting and comparison runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Frequency used when a request does not name one
    pub default_frequency: CompoundingFrequency,

    /// TDS rate (percent) used when neither request nor product supplies one
    pub default_tds_rate: Decimal,

    /// Quote comparison scenarios on the rayon pool
    pub parallel_compare: bool,

    /// Lifetime of cached rate matrices; `None` keeps them until invalidated
    pub cache_ttl_secs: Option<u64>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_frequency: CompoundingFrequency::Quarterly,
            default_tds_rate: Decimal::ZERO,
            parallel_compare: true,
            cache_ttl_secs: Some(3600), // 60 minutes after write
        }
    }
}

impl PricingConfig {
    /// Load from a JSON file; missing keys keep their defaults
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> PricingResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: PricingConfig = serde_json::from_str(&contents)?;
        log::info!("Loaded pricing config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = PricingConfig::default();
        assert_eq!(config.default_frequency, CompoundingFrequency::Quarterly);
        assert_eq!(config.default_tds_rate, Decimal::ZERO);
        assert!(config.parallel_compare);
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: PricingConfig =
            serde_json::from_str(r#"{"default_frequency": "MONTHLY", "default_tds_rate": "10", "cache_ttl_secs": null}"#)
                .unwrap();
        assert_eq!(config.default_frequency, CompoundingFrequency::Monthly);
        assert_eq!(config.default_tds_rate, dec!(10));
        assert!(config.parallel_compare);
        assert_eq!(config.cache_ttl(), None);
    }

    #[test]
    fn test_missing_file() {
        assert!(PricingConfig::from_json_path("does/not/exist.json").is_err());
    }
}
