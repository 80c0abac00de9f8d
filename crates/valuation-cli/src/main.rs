//! Command-line interface for valuation and screening

mod render;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use valuation_engine::engine::{ScreeningInput, ValuationInput, project_cash_flows};
use valuation_engine::{
    Analyzer, DcfParameters, FundamentalsCache, LiveMarketData, ValuationConfig,
    compute_screening_score, compute_sensitivity_grid,
};
use valuation_utils::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "valuate")]
#[command(about = "DCF valuation and value-investing screening for listed equities", long_about = None)]
struct Cli {
    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Log output format (pretty or json)
    #[arg(long, global = true, default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Intrinsic value from free cash flow
    Dcf {
        /// Last known free cash flow
        #[arg(long, allow_negative_numbers = true)]
        fcf: f64,

        #[command(flatten)]
        rates: RateArgs,

        /// Per-year growth rates overriding --growth, e.g. 0.15,0.12,0.10
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        growth_rates: Option<Vec<f64>>,
    },
    /// Intrinsic values over a 3x3 growth/discount grid
    Sensitivity {
        /// Last known free cash flow
        #[arg(long, allow_negative_numbers = true)]
        fcf: f64,

        #[command(flatten)]
        rates: RateArgs,
    },
    /// Value-investing score from five ratios
    Screen {
        /// Price to earnings
        #[arg(long, allow_negative_numbers = true)]
        per: Option<f64>,
        /// Price to book value
        #[arg(long, allow_negative_numbers = true)]
        pbv: Option<f64>,
        /// Return on equity in percent (15 = 15%)
        #[arg(long, allow_negative_numbers = true)]
        roe: Option<f64>,
        /// Debt to equity
        #[arg(long, allow_negative_numbers = true)]
        der: Option<f64>,
        /// EPS growth in percent
        #[arg(long, allow_negative_numbers = true)]
        eps_growth: Option<f64>,
    },
    /// Fetch fundamentals for a symbol, then screen and value it
    Analyze {
        /// Ticker symbol, e.g. SMDR
        symbol: String,

        #[command(flatten)]
        rates: RateArgs,

        /// Always fetch fresh data
        #[arg(long)]
        no_cache: bool,
    },
}

/// DCF assumptions as decimals (0.10 = 10%); unset values use the defaults
#[derive(Args, Debug, Default)]
struct RateArgs {
    /// Annual FCF growth rate
    #[arg(long, allow_negative_numbers = true)]
    growth: Option<f64>,
    /// Discount rate (cost of capital)
    #[arg(long, allow_negative_numbers = true)]
    discount: Option<f64>,
    /// Perpetual growth after the projection horizon
    #[arg(long, allow_negative_numbers = true)]
    terminal: Option<f64>,
    /// Projection horizon in years
    #[arg(long)]
    years: Option<u32>,
}

impl RateArgs {
    fn resolve(&self, defaults: &DcfParameters) -> DcfParameters {
        DcfParameters {
            growth_rate: self.growth.unwrap_or(defaults.growth_rate),
            discount_rate: self.discount.unwrap_or(defaults.discount_rate),
            terminal_growth: self.terminal.unwrap_or(defaults.terminal_growth),
            years: self.years.unwrap_or(defaults.years),
        }
    }
}

fn valuation_input(fcf: f64, params: &DcfParameters) -> ValuationInput {
    ValuationInput::new(
        fcf,
        params.growth_rate,
        params.discount_rate,
        params.terminal_growth,
        params.years,
    )
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    valuation_utils::init_tracing(cli.log_format, "warn,valuation_engine=info");

    let config = ValuationConfig::builder()
        .with_env()
        .build()
        .context("invalid configuration")?;
    let currency = config.currency_symbol.clone();

    match cli.command {
        Commands::Dcf {
            fcf,
            rates,
            growth_rates,
        } => {
            let params = rates.resolve(&config.dcf);
            let mut input = valuation_input(fcf, &params);
            if let Some(rates) = growth_rates {
                input = input.with_growth_rates(rates);
            }

            let breakdown = project_cash_flows(&input)?;
            if cli.json {
                print_json(&breakdown)?;
            } else {
                println!("{}", render::dcf_table(&breakdown, &currency));
                println!(
                    "Intrinsic value: {}",
                    valuation_engine::format::format_currency(breakdown.intrinsic_value(), &currency)
                );
            }
        }
        Commands::Sensitivity { fcf, rates } => {
            let params = rates.resolve(&config.dcf);
            let grid = compute_sensitivity_grid(&valuation_input(fcf, &params))?;
            if cli.json {
                print_json(&grid)?;
            } else {
                println!("{}", render::sensitivity_table(&grid, &currency));
            }
        }
        Commands::Screen {
            per,
            pbv,
            roe,
            der,
            eps_growth,
        } => {
            let input = ScreeningInput {
                per,
                pbv,
                roe,
                der,
                eps_growth,
            };
            let result = compute_screening_score(&input)?;
            if cli.json {
                print_json(&result)?;
            } else {
                println!("{}", render::screening_table(&result));
            }
        }
        Commands::Analyze {
            symbol,
            rates,
            no_cache,
        } => {
            let params = rates.resolve(&config.dcf);
            let config = Arc::new(config);
            let provider = Arc::new(LiveMarketData::new(Arc::clone(&config))?);
            let analyzer = if no_cache {
                Analyzer::with_cache(provider, config, FundamentalsCache::disabled())
            } else {
                Analyzer::new(provider, config)
            };

            info!("Running analysis for {}", symbol);
            let report = analyzer
                .analyze(&symbol, &params)
                .await
                .with_context(|| format!("analysis of {symbol} failed"))?;

            if cli.json {
                print_json(&report)?;
            } else {
                println!("{}", render::report(&report, &currency));
            }
        }
    }

    Ok(())
}
