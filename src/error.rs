//! Error types for deposit pricing
//!
//! Unknown customer classifications are deliberately absent here: they are
//! recovered locally (zero bonus) and only reported through the log.

use thiserror::Error;

/// Result alias used across the crate
pub type PricingResult<T> = Result<T, PricingError>;

/// Errors surfaced by rate resolution, compounding and quoting
#[derive(Error, Debug)]
pub enum PricingError {
    /// Caller supplied a value the engine cannot price
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput {
        field: String,
        reason: String,
    },

    /// No base rate matched and no fallback rate was available
    #[error("Rate resolution failed: {reason}")]
    RateResolutionFailure {
        reason: String,
    },

    /// Arithmetic left the representable range (non-finite factor, overflow)
    #[error("Computation error: {reason}")]
    Computation {
        reason: String,
    },

    /// The external rate matrix collaborator failed
    #[error("Rate source error for product {product_id}: {reason}")]
    RateSource {
        product_id: u64,
        reason: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PricingError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PricingError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn unresolved(reason: impl Into<String>) -> Self {
        PricingError::RateResolutionFailure {
            reason: reason.into(),
        }
    }

    pub fn computation(reason: impl Into<String>) -> Self {
        PricingError::Computation {
            reason: reason.into(),
        }
    }

    /// True for errors caused by the request rather than the environment
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PricingError::InvalidInput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message() {
        let err = PricingError::invalid("principal", "must be positive, got -5");
        assert_eq!(
            err.to_string(),
            "Invalid input for principal: must be positive, got -5"
        );
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_rate_resolution_is_not_invalid_input() {
        let err = PricingError::unresolved("no slab for 500 over 3 months");
        assert!(!err.is_invalid_input());
        assert!(err.to_string().starts_with("Rate resolution failed"));
    }
}
