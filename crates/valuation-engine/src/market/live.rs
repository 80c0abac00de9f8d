//! Live provider combining Alpha Vantage fundamentals with Yahoo Finance prices

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::alpha_vantage::{self, AlphaVantageClient, CompanyOverview};
use super::yahoo::YahooFinanceClient;
use super::{Fundamentals, MarketDataProvider};
use crate::config::ValuationConfig;
use crate::error::{Result, ValuationError};

pub struct LiveMarketData {
    alpha_vantage: AlphaVantageClient,
    yahoo: YahooFinanceClient,
    config: Arc<ValuationConfig>,
}

impl LiveMarketData {
    /// Requires an Alpha Vantage API key in the configuration
    pub fn new(config: Arc<ValuationConfig>) -> Result<Self> {
        let key = config.alpha_vantage_api_key.as_ref().ok_or_else(|| {
            ValuationError::Config(
                "Alpha Vantage API key required for fundamental data (set ALPHA_VANTAGE_API_KEY)"
                    .to_string(),
            )
        })?;

        let alpha_vantage = AlphaVantageClient::new(
            key.clone(),
            config.alpha_vantage_rate_limit,
            config.request_timeout,
        )?;

        Ok(Self {
            alpha_vantage,
            yahoo: YahooFinanceClient::new(),
            config,
        })
    }

    async fn latest_price(&self, symbol: &str) -> Option<f64> {
        let exchange_symbol = self.config.exchange_symbol(symbol);
        match self.yahoo.get_latest_price(&exchange_symbol).await {
            Ok(quote) => Some(quote.close),
            Err(e) => {
                warn!("No price for {}: {}", exchange_symbol, e);
                None
            }
        }
    }
}

/// Lookups that come back empty leave the derived fields unknown
fn optional_statement<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ValuationError::DataUnavailable { symbol, reason }) => {
            debug!("Statement unavailable for {}: {}", symbol, reason);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Merge whatever the sources returned; fails only when every source is empty
///
/// Alpha Vantage does not list most non-US exchanges (IDX among them), so
/// those symbols usually arrive with a price and nothing else.
fn assemble_fundamentals(
    symbol: &str,
    overview: Option<&CompanyOverview>,
    balance_sheet: Option<&serde_json::Value>,
    cash_flow: Option<&serde_json::Value>,
    price: Option<f64>,
) -> Result<Fundamentals> {
    if overview.is_none() && balance_sheet.is_none() && cash_flow.is_none() && price.is_none() {
        return Err(ValuationError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "no fundamentals or price from any source".to_string(),
        });
    }
    if overview.is_none() {
        warn!("No company overview for {}; ratios left unknown", symbol);
    }

    Ok(Fundamentals {
        symbol: symbol.to_string(),
        price,
        per: overview.and_then(CompanyOverview::per),
        pbv: overview.and_then(CompanyOverview::pbv),
        roe: overview.and_then(CompanyOverview::roe_percent),
        der: balance_sheet.and_then(alpha_vantage::debt_to_equity),
        eps_growth: overview.and_then(CompanyOverview::eps_growth_percent),
        fcf: cash_flow.and_then(alpha_vantage::free_cash_flow),
        market_cap: overview.and_then(CompanyOverview::market_cap),
        shares_outstanding: overview.and_then(CompanyOverview::shares_outstanding),
    })
}

#[async_trait]
impl MarketDataProvider for LiveMarketData {
    fn name(&self) -> &str {
        "alpha_vantage+yahoo"
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        let (overview, balance_sheet, cash_flow, price) = tokio::join!(
            self.alpha_vantage.get_company_overview(symbol),
            self.alpha_vantage.get_balance_sheet(symbol),
            self.alpha_vantage.get_cash_flow(symbol),
            self.latest_price(symbol),
        );

        let overview = optional_statement(overview)?;
        let balance_sheet = optional_statement(balance_sheet)?;
        let cash_flow = optional_statement(cash_flow)?;

        assemble_fundamentals(
            symbol,
            overview.as_ref(),
            balance_sheet.as_ref(),
            cash_flow.as_ref(),
            price,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let config = Arc::new(ValuationConfig::default());
        assert!(matches!(
            LiveMarketData::new(config),
            Err(ValuationError::Config(_))
        ));
    }

    #[test]
    fn test_provider_name() {
        let config = Arc::new(ValuationConfig {
            alpha_vantage_api_key: Some("demo".to_string()),
            ..Default::default()
        });
        let provider = LiveMarketData::new(config).unwrap();
        assert_eq!(provider.name(), "alpha_vantage+yahoo");
    }

    #[test]
    fn test_optional_statement() {
        let missing = optional_statement::<()>(Err(ValuationError::DataUnavailable {
            symbol: "XYZ".to_string(),
            reason: "none".to_string(),
        }));
        assert!(matches!(missing, Ok(None)));

        let limited = optional_statement::<()>(Err(ValuationError::RateLimitExceeded {
            provider: "Alpha Vantage".to_string(),
        }));
        assert!(limited.is_err());
    }

    #[test]
    fn test_missing_overview_keeps_price() {
        let fundamentals = assemble_fundamentals("SMDR", None, None, None, Some(1_450.0)).unwrap();

        assert_eq!(fundamentals.symbol, "SMDR");
        assert_eq!(fundamentals.price, Some(1_450.0));
        assert_eq!(fundamentals.per, None);
        assert_eq!(fundamentals.market_cap, None);
        assert_eq!(fundamentals.fcf, None);
    }

    #[test]
    fn test_overview_fields_mapped() {
        let overview = CompanyOverview {
            pe_ratio: Some("12.5".to_string()),
            return_on_equity_ttm: Some("0.18".to_string()),
            market_cap: Some("2000000".to_string()),
            ..Default::default()
        };

        let fundamentals = assemble_fundamentals("AAPL", Some(&overview), None, None, None).unwrap();
        assert_eq!(fundamentals.per, Some(12.5));
        assert_eq!(fundamentals.market_cap, Some(2_000_000.0));
        assert!((fundamentals.roe.unwrap() - 18.0).abs() < 1e-9);
        assert_eq!(fundamentals.price, None);
    }

    #[test]
    fn test_nothing_from_any_source_is_unavailable() {
        assert!(matches!(
            assemble_fundamentals("NOPE", None, None, None, None),
            Err(ValuationError::DataUnavailable { .. })
        ));
    }
}
