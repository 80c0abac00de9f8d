//! Alpha Vantage API client

use crate::error::{Result, ValuationError};
use crate::market::parse_number;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

/// Company overview data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompanyOverview {
    pub symbol: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    pub market_cap: Option<String>,
    #[serde(rename = "PERatio")]
    pub pe_ratio: Option<String>,
    pub price_to_book_ratio: Option<String>,
    #[serde(rename = "ReturnOnEquityTTM")]
    pub return_on_equity_ttm: Option<String>,
    #[serde(rename = "QuarterlyEarningsGrowthYOY")]
    pub quarterly_earnings_growth_yoy: Option<String>,
    pub shares_outstanding: Option<String>,
}

impl CompanyOverview {
    pub fn per(&self) -> Option<f64> {
        parse_number(self.pe_ratio.as_deref())
    }

    pub fn pbv(&self) -> Option<f64> {
        parse_number(self.price_to_book_ratio.as_deref())
    }

    /// ROE in percent
    pub fn roe_percent(&self) -> Option<f64> {
        parse_number(self.return_on_equity_ttm.as_deref()).map(|r| r * 100.0)
    }

    /// Year-over-year quarterly EPS growth in percent
    pub fn eps_growth_percent(&self) -> Option<f64> {
        parse_number(self.quarterly_earnings_growth_yoy.as_deref()).map(|g| g * 100.0)
    }

    pub fn market_cap(&self) -> Option<f64> {
        parse_number(self.market_cap.as_deref())
    }

    pub fn shares_outstanding(&self) -> Option<f64> {
        parse_number(self.shares_outstanding.as_deref())
    }
}

/// Most recent annual report of a statement response
fn latest_annual(statement: &Value) -> Option<&Value> {
    statement.get("annualReports")?.as_array()?.first()
}

fn report_number(report: &Value, field: &str) -> Option<f64> {
    parse_number(report.get(field).and_then(Value::as_str))
}

/// Debt to equity from the latest annual balance sheet
pub fn debt_to_equity(balance_sheet: &Value) -> Option<f64> {
    let report = latest_annual(balance_sheet)?;
    let debt = report_number(report, "shortLongTermDebtTotal")
        .or_else(|| report_number(report, "totalLiabilities"))?;
    let equity = report_number(report, "totalShareholderEquity")?;

    (equity > 0.0).then(|| debt / equity)
}

/// Operating cash flow minus capital expenditures from the latest annual report
pub fn free_cash_flow(cash_flow: &Value) -> Option<f64> {
    let report = latest_annual(cash_flow)?;
    let operating = report_number(report, "operatingCashflow")?;
    let capex = report_number(report, "capitalExpenditures").unwrap_or(0.0);

    Some(operating - capex.abs())
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client with API key and rate limit
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (5 on the free tier)
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            rate_limiter,
        })
    }

    async fn query(&self, function: &str, symbol: &str) -> Result<Value> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let params = [
            ("function", function),
            ("symbol", symbol),
            ("apikey", self.api_key.as_str()),
        ];
        let response = self.client.get(BASE_URL).query(&params).send().await?;

        if !response.status().is_success() {
            return Err(ValuationError::Api(format!(
                "{PROVIDER} HTTP error: {}",
                response.status()
            )));
        }

        let data: Value = response.json().await?;
        check_response(&data, symbol)?;
        Ok(data)
    }

    /// Get the company overview (ratios, market cap, share count)
    pub async fn get_company_overview(&self, symbol: &str) -> Result<CompanyOverview> {
        let data = self.query("OVERVIEW", symbol).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Get annual and quarterly balance sheets
    pub async fn get_balance_sheet(&self, symbol: &str) -> Result<Value> {
        self.query("BALANCE_SHEET", symbol).await
    }

    /// Get annual and quarterly cash flow statements
    pub async fn get_cash_flow(&self, symbol: &str) -> Result<Value> {
        self.query("CASH_FLOW", symbol).await
    }
}

/// Map Alpha Vantage's in-body error conventions onto errors
fn check_response(data: &Value, symbol: &str) -> Result<()> {
    if let Some(error) = data.get("Error Message") {
        return Err(ValuationError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: error.to_string(),
        });
    }

    if data.get("Note").is_some() || data.get("Information").is_some() {
        return Err(ValuationError::RateLimitExceeded {
            provider: PROVIDER.to_string(),
        });
    }

    if data.as_object().is_some_and(serde_json::Map::is_empty) {
        return Err(ValuationError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: format!("{PROVIDER} returned no data"),
        });
    }

    Ok(())
}
