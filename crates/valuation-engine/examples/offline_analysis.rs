//! Offline analysis example
//!
//! Runs the full analysis pipeline against an in-memory provider, so no API
//! keys or network access are needed.
//!
//! To run this example:
//! ```bash
//! cargo run -p valuation-engine --example offline_analysis
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use valuation_engine::format::{format_currency, format_percent};
use valuation_engine::{
    Analyzer, DcfParameters, Fundamentals, MarketDataProvider, ScreeningOutcome, ValuationConfig,
};

/// Provider serving a fixed set of fundamentals
struct StaticProvider {
    fundamentals: Fundamentals,
}

#[async_trait]
impl MarketDataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> valuation_engine::Result<Fundamentals> {
        Ok(Fundamentals {
            symbol: symbol.to_string(),
            ..self.fundamentals.clone()
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt().with_env_filter("info").init();

    let provider = Arc::new(StaticProvider {
        fundamentals: Fundamentals {
            price: Some(1_450.0),
            per: Some(6.8),
            pbv: Some(1.05),
            roe: Some(17.4),
            der: Some(0.35),
            eps_growth: Some(11.0),
            fcf: Some(2_400_000_000_000.0),
            market_cap: Some(23_800_000_000_000.0),
            shares_outstanding: Some(16_400_000_000.0),
            ..Fundamentals::default()
        },
    });

    let config = Arc::new(ValuationConfig::default());
    let currency = config.currency_symbol.clone();
    let analyzer = Analyzer::new(provider, config);

    let report = analyzer.analyze("SMDR", &DcfParameters::default()).await?;

    println!("=== {} ===", report.symbol);
    if let ScreeningOutcome::Scored(result) = &report.screening {
        println!("Score: {:.2} (checklist {} / 5)", result.score, result.checklist_passed);
    }
    println!("Intrinsic value: {}", format_currency(report.intrinsic_value, &currency));
    if let Some(verdict) = &report.verdict {
        println!("{}", verdict.valuation);
        if let Some(margin) = verdict.margin_of_safety {
            println!("Margin of safety: {}", format_percent(margin));
        }
    }

    Ok(())
}
