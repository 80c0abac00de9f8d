//! Market data boundary
//!
//! Providers deliver [`Fundamentals`] already converted into the units the
//! engines expect. Fields the source does not know stay `None`; deciding what
//! to do about them is left to the caller.

pub mod alpha_vantage;
pub mod live;
pub mod yahoo;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::engine::ScreeningInput;
use crate::error::Result;

pub use alpha_vantage::AlphaVantageClient;
pub use live::LiveMarketData;
pub use yahoo::YahooFinanceClient;

/// Fundamental data for one equity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub symbol: String,
    /// Latest market price per share
    pub price: Option<f64>,
    pub per: Option<f64>,
    pub pbv: Option<f64>,
    /// Return on equity, percent
    pub roe: Option<f64>,
    /// Debt to equity, plain ratio
    pub der: Option<f64>,
    /// EPS growth, percent
    pub eps_growth: Option<f64>,
    /// Latest annual free cash flow
    pub fcf: Option<f64>,
    pub market_cap: Option<f64>,
    pub shares_outstanding: Option<f64>,
}

impl Fundamentals {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Ratios for the screening engine
    pub fn screening_input(&self) -> ScreeningInput {
        ScreeningInput {
            per: self.per,
            pbv: self.pbv,
            roe: self.roe,
            der: self.der,
            eps_growth: self.eps_growth,
        }
    }
}

/// Source of fundamentals for a ticker symbol
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Provider name used in logs and cache keys
    fn name(&self) -> &str;

    /// Fetch the latest fundamentals for `symbol`
    async fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals>;
}

/// Parse a numeric field the way providers send them: strings, with "None"
/// or "-" for unknown values
pub(crate) fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty() && *s != "None" && *s != "-")
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(Some("12.5")), Some(12.5));
        assert_eq!(parse_number(Some(" 3 ")), Some(3.0));
        assert_eq!(parse_number(Some("None")), None);
        assert_eq!(parse_number(Some("-")), None);
        assert_eq!(parse_number(Some("")), None);
        assert_eq!(parse_number(Some("abc")), None);
        assert_eq!(parse_number(None), None);
    }

    #[test]
    fn test_screening_input_from_fundamentals() {
        let fundamentals = Fundamentals {
            per: Some(9.0),
            pbv: Some(1.1),
            roe: Some(17.0),
            der: None,
            eps_growth: Some(8.0),
            ..Fundamentals::new("SMDR")
        };

        let input = fundamentals.screening_input();
        assert_eq!(input.per, Some(9.0));
        assert_eq!(input.der, None);
    }
}
