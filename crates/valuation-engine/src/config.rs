//! Configuration for valuation runs and market data access

use crate::error::{Result, ValuationError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on a single retry delay
pub const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(60);

/// User-adjustable DCF assumptions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfParameters {
    pub growth_rate: f64,
    pub discount_rate: f64,
    pub terminal_growth: f64,
    pub years: u32,
}

impl Default for DcfParameters {
    fn default() -> Self {
        Self {
            growth_rate: 0.10,
            discount_rate: 0.12,
            terminal_growth: 0.02,
            years: 5,
        }
    }
}

/// Configuration for valuation operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationConfig {
    /// Assumptions used when the caller does not override them
    pub dcf: DcfParameters,

    /// Suffix appended to symbols for price lookups (".JK" for IDX)
    pub exchange_suffix: Option<String>,

    /// Currency label used in formatted output
    pub currency_symbol: String,

    /// Share of market cap used as FCF when the provider has none
    pub fcf_fallback_market_cap_fraction: f64,

    /// FCF used when neither FCF nor market cap is known
    pub fcf_fallback_value: f64,

    /// Lifetime of cached fundamentals
    pub cache_ttl: Duration,

    /// Maximum number of attempts for provider calls
    pub max_retries: u32,

    /// Initial backoff duration for retries
    pub retry_backoff_base: Duration,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Alpha Vantage API key (optional)
    pub alpha_vantage_api_key: Option<String>,

    /// Alpha Vantage requests per minute
    pub alpha_vantage_rate_limit: u32,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            dcf: DcfParameters::default(),
            exchange_suffix: Some(".JK".to_string()),
            currency_symbol: "Rp".to_string(),
            fcf_fallback_market_cap_fraction: 0.05,
            fcf_fallback_value: 1e8,
            cache_ttl: Duration::from_secs(3600),   // 1 hour
            max_retries: 3,
            retry_backoff_base: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            alpha_vantage_api_key: None,
            alpha_vantage_rate_limit: 5,            // free tier
        }
    }
}

impl ValuationConfig {
    /// Create a new configuration builder
    pub fn builder() -> ValuationConfigBuilder {
        ValuationConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.dcf.discount_rate <= self.dcf.terminal_growth {
            return Err(ValuationError::Config(
                "default discount rate must be greater than terminal growth".to_string(),
            ));
        }

        if self.dcf.years == 0 {
            return Err(ValuationError::Config(
                "default projection horizon must be at least one year".to_string(),
            ));
        }

        if !(self.fcf_fallback_market_cap_fraction > 0.0 && self.fcf_fallback_market_cap_fraction <= 1.0) {
            return Err(ValuationError::Config(
                "fcf_fallback_market_cap_fraction must be in (0, 1]".to_string(),
            ));
        }

        if self.fcf_fallback_value <= 0.0 {
            return Err(ValuationError::Config(
                "fcf_fallback_value must be positive".to_string(),
            ));
        }

        if self.max_retries == 0 {
            return Err(ValuationError::Config(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get retry backoff duration for attempt number, doubling up to `MAX_RETRY_BACKOFF`
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.retry_backoff_base
            .checked_mul(factor)
            .map_or(MAX_RETRY_BACKOFF, |backoff| backoff.min(MAX_RETRY_BACKOFF))
    }

    /// Symbol as the price source expects it
    pub fn exchange_symbol(&self, symbol: &str) -> String {
        match &self.exchange_suffix {
            Some(suffix) if !symbol.ends_with(suffix.as_str()) => format!("{symbol}{suffix}"),
            _ => symbol.to_string(),
        }
    }
}

/// Builder for ValuationConfig
#[derive(Debug, Default)]
pub struct ValuationConfigBuilder {
    dcf: Option<DcfParameters>,
    exchange_suffix: Option<String>,
    currency_symbol: Option<String>,
    fcf_fallback_market_cap_fraction: Option<f64>,
    fcf_fallback_value: Option<f64>,
    cache_ttl: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    request_timeout: Option<Duration>,
    alpha_vantage_api_key: Option<String>,
    alpha_vantage_rate_limit: Option<u32>,
}

impl ValuationConfigBuilder {
    /// Set the default DCF assumptions
    pub fn dcf(mut self, params: DcfParameters) -> Self {
        self.dcf = Some(params);
        self
    }

    /// Set the exchange suffix; an empty string disables it
    pub fn exchange_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.exchange_suffix = Some(suffix.into());
        self
    }

    /// Set the currency label
    pub fn currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = Some(symbol.into());
        self
    }

    /// Set the market cap fraction used as fallback FCF
    pub fn fcf_fallback_market_cap_fraction(mut self, fraction: f64) -> Self {
        self.fcf_fallback_market_cap_fraction = Some(fraction);
        self
    }

    /// Set the last-resort fallback FCF
    pub fn fcf_fallback_value(mut self, value: f64) -> Self {
        self.fcf_fallback_value = Some(value);
        self
    }

    /// Set cache TTL for fundamentals
    pub fn cache_ttl(mut self, duration: Duration) -> Self {
        self.cache_ttl = Some(duration);
        self
    }

    /// Set maximum retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set Alpha Vantage requests per minute
    pub fn alpha_vantage_rate_limit(mut self, per_minute: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(per_minute);
        self
    }

    /// Load settings from ALPHA_VANTAGE_API_KEY, VALUATION_EXCHANGE_SUFFIX and
    /// VALUATION_CURRENCY
    pub fn with_env(mut self) -> Self {
        if let Ok(key) = std::env::var("ALPHA_VANTAGE_API_KEY") {
            self.alpha_vantage_api_key = Some(key);
        }
        if let Ok(suffix) = std::env::var("VALUATION_EXCHANGE_SUFFIX") {
            self.exchange_suffix = Some(suffix);
        }
        if let Ok(currency) = std::env::var("VALUATION_CURRENCY") {
            self.currency_symbol = Some(currency);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ValuationConfig> {
        let defaults = ValuationConfig::default();

        let config = ValuationConfig {
            dcf: self.dcf.unwrap_or(defaults.dcf),
            exchange_suffix: match self.exchange_suffix {
                Some(suffix) if suffix.is_empty() => None,
                Some(suffix) => Some(suffix),
                None => defaults.exchange_suffix,
            },
            currency_symbol: self.currency_symbol.unwrap_or(defaults.currency_symbol),
            fcf_fallback_market_cap_fraction: self
                .fcf_fallback_market_cap_fraction
                .unwrap_or(defaults.fcf_fallback_market_cap_fraction),
            fcf_fallback_value: self.fcf_fallback_value.unwrap_or(defaults.fcf_fallback_value),
            cache_ttl: self.cache_ttl.unwrap_or(defaults.cache_ttl),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(defaults.alpha_vantage_rate_limit),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValuationConfig::default();
        assert_eq!(config.dcf, DcfParameters::default());
        assert_eq!(config.dcf.years, 5);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.exchange_suffix.as_deref(), Some(".JK"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ValuationConfig::builder()
            .max_retries(5)
            .request_timeout(Duration::from_secs(60))
            .exchange_suffix("")
            .currency_symbol("$")
            .build()
            .unwrap();

        assert_eq!(config.max_retries, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.exchange_suffix, None);
        assert_eq!(config.currency_symbol, "$");
    }

    #[test]
    fn test_validation_rejects_inverted_rates() {
        let result = ValuationConfig::builder()
            .dcf(DcfParameters {
                discount_rate: 0.02,
                terminal_growth: 0.03,
                ..DcfParameters::default()
            })
            .build();

        assert!(matches!(result, Err(ValuationError::Config(_))));
    }

    #[test]
    fn test_validation_rejects_bad_fallbacks() {
        let config = ValuationConfig {
            fcf_fallback_market_cap_fraction: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ValuationConfig {
            fcf_fallback_value: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ValuationConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_backoff() {
        let config = ValuationConfig::default();
        assert_eq!(config.retry_backoff(0), Duration::from_secs(1));
        assert_eq!(config.retry_backoff(1), Duration::from_secs(2));
        assert_eq!(config.retry_backoff(2), Duration::from_secs(4));
    }

    #[test]
    fn test_retry_backoff_is_capped() {
        let config = ValuationConfig {
            max_retries: 100,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.retry_backoff(6), MAX_RETRY_BACKOFF);
        assert_eq!(config.retry_backoff(31), MAX_RETRY_BACKOFF);
        assert_eq!(config.retry_backoff(32), MAX_RETRY_BACKOFF);
        assert_eq!(config.retry_backoff(u32::MAX), MAX_RETRY_BACKOFF);
    }

    #[test]
    fn test_exchange_symbol() {
        let config = ValuationConfig::default();
        assert_eq!(config.exchange_symbol("SMDR"), "SMDR.JK");
        assert_eq!(config.exchange_symbol("SMDR.JK"), "SMDR.JK");

        let config = ValuationConfig {
            exchange_suffix: None,
            ..Default::default()
        };
        assert_eq!(config.exchange_symbol("AAPL"), "AAPL");
    }
}
