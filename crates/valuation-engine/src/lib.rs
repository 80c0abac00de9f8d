//! Equity valuation and value-investing screening
//!
//! This crate estimates what a listed company is worth from its free cash
//! flow and scores it against a value-investing rubric. It includes:
//!
//! - A two-stage discounted cash flow (DCF) model with optional per-year growth
//! - A 3×3 growth/discount sensitivity grid around a base valuation
//! - A weighted screening score over PER, PBV, ROE, DER and EPS growth
//! - Margin of safety and undervalued/overvalued verdicts
//! - A market data boundary with an Alpha Vantage + Yahoo Finance provider
//! - A fundamentals cache with an injectable expiration policy
//!
//! # Architecture
//!
//! The [`engine`] module is pure and synchronous. The [`Analyzer`] sits on
//! top of it: it fetches [`Fundamentals`] through a [`MarketDataProvider`],
//! caches and retries those calls, then runs the engines.
//!
//! # Example
//!
//! ```rust
//! use valuation_engine::engine::{ScreeningInput, ValuationInput};
//! use valuation_engine::{compute_intrinsic_value, compute_screening_score};
//!
//! let input = ValuationInput::new(100.0, 0.0, 0.10, 0.03, 5);
//! let value = compute_intrinsic_value(&input)?;
//! assert_eq!((value * 100.0).round() / 100.0, 1292.72);
//!
//! let ratios = ScreeningInput::new(8.0, 0.7, 20.0, 0.2, 15.0);
//! assert_eq!(compute_screening_score(&ratios)?.score, 85.0);
//! # Ok::<(), valuation_engine::ValuationError>(())
//! ```

pub mod analyzer;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod market;

// Re-export main types for convenience
pub use analyzer::{AnalysisReport, Analyzer, FcfSource, ScreeningOutcome};
pub use cache::{CacheKey, CachePolicy, FundamentalsCache};
pub use config::{DcfParameters, ValuationConfig};
pub use engine::{
    SensitivityGrid, ScreeningResult, ValuationInput, compute_intrinsic_value,
    compute_screening_score, compute_sensitivity_grid,
};
pub use error::{Result, ValuationError};
pub use market::{Fundamentals, LiveMarketData, MarketDataProvider};
