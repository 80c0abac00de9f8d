//! End-to-end analysis of a single symbol
//!
//! Fetches fundamentals (cached, retried on transient failures), scores them,
//! values the company with the DCF model and compares the result with the
//! market price.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::{CacheKey, FundamentalsCache};
use crate::config::{DcfParameters, ValuationConfig};
use crate::engine::{
    ScreeningResult, SensitivityGrid, ValuationInput, Verdict, compute_intrinsic_value,
    compute_screening_score, compute_sensitivity_grid, per_share,
};
use crate::error::{Result, ValuationError};
use crate::market::{Fundamentals, MarketDataProvider};

/// Where the FCF fed into the DCF model came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FcfSource {
    /// Reported by the provider
    Reported,
    /// Fraction of market capitalization
    MarketCapFraction,
    /// Configured constant
    Fallback,
}

/// Screening outcome, or why it could not be computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScreeningOutcome {
    Scored(ScreeningResult),
    Missing { field: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub fundamentals: Fundamentals,
    pub screening: ScreeningOutcome,
    pub parameters: DcfParameters,
    pub fcf_used: f64,
    pub fcf_source: FcfSource,
    pub intrinsic_value: f64,
    pub intrinsic_per_share: Option<f64>,
    pub sensitivity: SensitivityGrid,
    pub verdict: Option<Verdict>,
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

pub struct Analyzer {
    provider: Arc<dyn MarketDataProvider>,
    cache: FundamentalsCache,
    config: Arc<ValuationConfig>,
}

impl Analyzer {
    /// Create an analyzer with a timed cache from the configuration
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: Arc<ValuationConfig>) -> Self {
        let cache = FundamentalsCache::with_ttl(config.cache_ttl);
        Self::with_cache(provider, config, cache)
    }

    pub fn with_cache(
        provider: Arc<dyn MarketDataProvider>,
        config: Arc<ValuationConfig>,
        cache: FundamentalsCache,
    ) -> Self {
        Self {
            provider,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Fundamentals for `symbol`, served from cache when fresh
    pub async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        let symbol = normalize_symbol(symbol)?;
        let key = CacheKey::new(&symbol, self.provider.name());
        self.cache
            .get_or_fetch(key, || self.fetch_with_retry(&symbol))
            .await
    }

    async fn fetch_with_retry(&self, symbol: &str) -> Result<Fundamentals> {
        let mut attempt = 0;
        loop {
            match self.provider.fetch_fundamentals(symbol).await {
                Ok(fundamentals) => return Ok(fundamentals),
                Err(e) if e.is_transient() && attempt + 1 < self.config.max_retries => {
                    let backoff = self.config.retry_backoff(attempt);
                    warn!(
                        "Fetching {} from {} failed (attempt {}): {}; retrying in {:?}",
                        symbol,
                        self.provider.name(),
                        attempt + 1,
                        e,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Run screening and valuation for `symbol`
    pub async fn analyze(&self, symbol: &str, params: &DcfParameters) -> Result<AnalysisReport> {
        let fundamentals = self.fundamentals(symbol).await?;
        info!("Analyzing {}", fundamentals.symbol);
        self.evaluate(fundamentals, params)
    }

    /// Screening and valuation over already fetched fundamentals
    pub fn evaluate(&self, fundamentals: Fundamentals, params: &DcfParameters) -> Result<AnalysisReport> {
        let mut warnings = Vec::new();

        let screening = match compute_screening_score(&fundamentals.screening_input()) {
            Ok(result) => ScreeningOutcome::Scored(result),
            Err(ValuationError::MissingData { field }) => {
                warnings.push(format!("Screening skipped: {field} is not available"));
                ScreeningOutcome::Missing {
                    field: field.to_string(),
                }
            }
            Err(e) => return Err(e),
        };

        let (fcf_used, fcf_source) = self.resolve_fcf(&fundamentals);
        if fcf_source != FcfSource::Reported {
            warn!("No positive FCF for {}, using {:?}", fundamentals.symbol, fcf_source);
            warnings.push(format!(
                "Free cash flow unavailable; estimated from {}",
                match fcf_source {
                    FcfSource::MarketCapFraction => "market capitalization",
                    _ => "the configured default",
                }
            ));
        }

        let input = ValuationInput::new(
            fcf_used,
            params.growth_rate,
            params.discount_rate,
            params.terminal_growth,
            params.years,
        );
        let intrinsic_value = compute_intrinsic_value(&input)?;
        let sensitivity = compute_sensitivity_grid(&input)?;

        let intrinsic_per_share = fundamentals
            .shares_outstanding
            .and_then(|shares| per_share(intrinsic_value, shares));
        let verdict = match (intrinsic_per_share, fundamentals.price) {
            (Some(value), Some(price)) if price > 0.0 => Some(Verdict::assess(value, price)),
            (None, _) => {
                warnings.push("Shares outstanding unknown; no per-share comparison".to_string());
                None
            }
            (Some(_), _) => {
                warnings.push("Market price unavailable; no verdict".to_string());
                None
            }
        };

        Ok(AnalysisReport {
            symbol: fundamentals.symbol.clone(),
            fundamentals,
            screening,
            parameters: *params,
            fcf_used,
            fcf_source,
            intrinsic_value,
            intrinsic_per_share,
            sensitivity,
            verdict,
            warnings,
            generated_at: Utc::now(),
        })
    }

    fn resolve_fcf(&self, fundamentals: &Fundamentals) -> (f64, FcfSource) {
        if let Some(fcf) = fundamentals.fcf.filter(|f| *f > 0.0) {
            return (fcf, FcfSource::Reported);
        }
        if let Some(cap) = fundamentals.market_cap.filter(|c| *c > 0.0) {
            return (
                cap * self.config.fcf_fallback_market_cap_fraction,
                FcfSource::MarketCapFraction,
            );
        }
        (self.config.fcf_fallback_value, FcfSource::Fallback)
    }
}

fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() || symbol.chars().any(char::is_whitespace) {
        return Err(ValuationError::InvalidSymbol(symbol));
    }
    Ok(symbol)
}
