//! Error types for valuation and screening operations

use thiserror::Error;

/// Valuation specific errors
#[derive(Debug, Error)]
pub enum ValuationError {
    /// DCF preconditions violated (non-positive FCF or horizon, discount rate
    /// not above terminal growth, non-finite rates)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required screening ratio is absent or null
    #[error("Missing data: {field} is required for screening")]
    MissingData {
        field: &'static str,
    },

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Market data provider returned an error
    #[error("API error: {0}")]
    Api(String),

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded {
        provider: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl ValuationError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Api(_) | Self::RateLimitExceeded { .. }
        )
    }
}

/// Result type alias for valuation operations
pub type Result<T> = std::result::Result<T, ValuationError>;

/// Convert anyhow::Error to ValuationError
impl From<anyhow::Error> for ValuationError {
    fn from(err: anyhow::Error) -> Self {
        ValuationError::Other(err.to_string())
    }
}
