//! Intrinsic value versus market price

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Valuation {
    /// Intrinsic value above market price
    Undervalued,
    /// Intrinsic value at or below market price
    Overvalued,
}

impl fmt::Display for Valuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undervalued => write!(f, "Undervalued (worth a closer look)"),
            Self::Overvalued => write!(f, "Overvalued (proceed with caution)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub valuation: Valuation,
    pub intrinsic_per_share: f64,
    pub price: f64,
    /// Percent of intrinsic value; negative when the price is above it
    pub margin_of_safety: Option<f64>,
}

impl Verdict {
    pub fn assess(intrinsic_per_share: f64, price: f64) -> Self {
        let valuation = if intrinsic_per_share > price {
            Valuation::Undervalued
        } else {
            Valuation::Overvalued
        };

        Self {
            valuation,
            intrinsic_per_share,
            price,
            margin_of_safety: margin_of_safety(intrinsic_per_share, price),
        }
    }

    pub fn is_undervalued(&self) -> bool {
        self.valuation == Valuation::Undervalued
    }
}

/// `(intrinsic - price) / intrinsic` in percent
pub fn margin_of_safety(intrinsic_per_share: f64, price: f64) -> Option<f64> {
    (intrinsic_per_share > 0.0).then(|| (intrinsic_per_share - price) / intrinsic_per_share * 100.0)
}

/// Spread a firm-level value over the share count
pub fn per_share(intrinsic_value: f64, shares_outstanding: f64) -> Option<f64> {
    (shares_outstanding > 0.0 && shares_outstanding.is_finite()).then(|| intrinsic_value / shares_outstanding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undervalued() {
        let verdict = Verdict::assess(2000.0, 1500.0);
        assert!(verdict.is_undervalued());
        assert_eq!(verdict.margin_of_safety, Some(25.0));
    }

    #[test]
    fn test_equal_price_is_overvalued() {
        let verdict = Verdict::assess(1500.0, 1500.0);
        assert_eq!(verdict.valuation, Valuation::Overvalued);
        assert_eq!(verdict.margin_of_safety, Some(0.0));
    }

    #[test]
    fn test_negative_margin() {
        assert_eq!(margin_of_safety(1000.0, 1250.0), Some(-25.0));
        assert_eq!(margin_of_safety(0.0, 10.0), None);
    }

    #[test]
    fn test_per_share() {
        assert_eq!(per_share(1_000_000.0, 4_000.0), Some(250.0));
        assert_eq!(per_share(1_000_000.0, 0.0), None);
        assert_eq!(per_share(1_000_000.0, f64::NAN), None);
    }
}
