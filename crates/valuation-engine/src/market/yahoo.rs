//! Yahoo Finance price lookups

use crate::error::{Result, ValuationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient {}

/// Latest traded price for a symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    /// Get the latest daily close for an exchange-qualified symbol
    pub async fn get_latest_price(&self, symbol: &str) -> Result<PriceQuote> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| ValuationError::Api(format!("Yahoo Finance: {e}")))?;

        let response = provider
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| ValuationError::Api(format!("Yahoo Finance: {e}")))?;

        let quote = response.last_quote().map_err(|e| ValuationError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;

        Ok(PriceQuote {
            symbol: symbol.to_string(),
            timestamp: DateTime::from_timestamp(quote.timestamp as i64, 0).unwrap_or_else(Utc::now),
            close: quote.close,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_latest_price() {
        let client = YahooFinanceClient::new();
        let quote = client.get_latest_price("BBCA.JK").await.unwrap();

        assert_eq!(quote.symbol, "BBCA.JK");
        assert!(quote.close > 0.0);
    }
}
