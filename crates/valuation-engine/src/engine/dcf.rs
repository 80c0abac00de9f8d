//! Two-stage discounted cash flow model
//!
//! Free cash flow is projected over an explicit horizon, each year is
//! discounted back at the cost of capital, and a Gordon-growth terminal value
//! continues from the last projected year.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ValuationError};

/// Inputs for a single DCF valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationInput {
    /// Last known free cash flow
    pub fcf: f64,
    /// Constant annual growth (0.10 = 10%)
    pub growth_rate: f64,
    /// Cost of capital
    pub discount_rate: f64,
    /// Perpetual growth after the explicit horizon
    pub terminal_growth: f64,
    /// Projection horizon in years
    pub years: u32,
    /// Per-year growth schedule overriding `growth_rate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_rates: Option<Vec<f64>>,
}

impl ValuationInput {
    /// Create a constant-growth input
    pub fn new(
        fcf: f64,
        growth_rate: f64,
        discount_rate: f64,
        terminal_growth: f64,
        years: u32,
    ) -> Self {
        Self {
            fcf,
            growth_rate,
            discount_rate,
            terminal_growth,
            years,
            growth_rates: None,
        }
    }

    /// Use a per-year growth schedule; the last rate repeats past its end
    pub fn with_growth_rates(mut self, rates: impl Into<Vec<f64>>) -> Self {
        self.growth_rates = Some(rates.into());
        self
    }

    /// Check the preconditions of the DCF model
    pub fn validate(&self) -> Result<()> {
        let rates_finite = [self.growth_rate, self.discount_rate, self.terminal_growth]
            .iter()
            .chain(self.growth_rates.iter().flatten())
            .all(|r| r.is_finite());
        if !rates_finite || !self.fcf.is_finite() {
            return Err(ValuationError::InvalidInput(
                "rates and free cash flow must be finite numbers".to_string(),
            ));
        }

        if self.discount_rate <= self.terminal_growth {
            return Err(ValuationError::InvalidInput(format!(
                "discount rate ({}) must be greater than terminal growth ({})",
                self.discount_rate, self.terminal_growth
            )));
        }
        if self.fcf <= 0.0 {
            return Err(ValuationError::InvalidInput(format!(
                "free cash flow must be positive, got {}",
                self.fcf
            )));
        }
        if self.years == 0 {
            return Err(ValuationError::InvalidInput(
                "projection horizon must be at least one year".to_string(),
            ));
        }

        Ok(())
    }

    fn schedule(&self) -> Option<&[f64]> {
        self.growth_rates.as_deref().filter(|rates| !rates.is_empty())
    }
}

/// One explicit-horizon year of the projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedYear {
    pub year: u32,
    pub cash_flow: f64,
    pub discount_factor: f64,
    pub present_value: f64,
}

/// Every intermediate number of a DCF valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfBreakdown {
    pub years: Vec<ProjectedYear>,
    pub terminal_value: f64,
    pub terminal_present_value: f64,
}

impl DcfBreakdown {
    /// Sum of the discounted explicit-horizon cash flows
    pub fn explicit_present_value(&self) -> f64 {
        self.years.iter().map(|y| y.present_value).sum()
    }

    /// Intrinsic value: discounted cash flows plus discounted terminal value
    pub fn intrinsic_value(&self) -> f64 {
        self.explicit_present_value() + self.terminal_present_value
    }
}

/// Project, discount and sum the cash flows of `input`
pub fn project_cash_flows(input: &ValuationInput) -> Result<DcfBreakdown> {
    if let Err(e) = input.validate() {
        debug!("Rejected DCF input: {}", e);
        return Err(e);
    }

    let n = input.years as usize;
    let discount_factors: Vec<f64> = (1..=input.years)
        .map(|i| (1.0 + input.discount_rate).powi(i as i32))
        .collect();

    let projected: Vec<f64> = match input.schedule() {
        Some(rates) => {
            let mut flows = Vec::with_capacity(n);
            let mut previous = input.fcf;
            for i in 1..=n {
                let growth = rates.get(i - 1).or(rates.last()).copied().unwrap_or_default();
                previous *= 1.0 + growth;
                flows.push(previous);
            }
            flows
        }
        // Compound from the base year each time rather than from the previous year
        None => (1..=input.years)
            .map(|i| input.fcf * (1.0 + input.growth_rate).powi(i as i32))
            .collect(),
    };

    let years: Vec<ProjectedYear> = projected
        .iter()
        .zip(&discount_factors)
        .zip(1..)
        .map(|((&cash_flow, &discount_factor), year)| ProjectedYear {
            year,
            cash_flow,
            discount_factor,
            present_value: cash_flow / discount_factor,
        })
        .collect();

    let final_year_fcf = projected[n - 1];
    let terminal_value = final_year_fcf * (1.0 + input.terminal_growth)
        / (input.discount_rate - input.terminal_growth);
    let terminal_present_value =
        terminal_value / (1.0 + input.discount_rate).powi(input.years as i32);

    let breakdown = DcfBreakdown {
        years,
        terminal_value,
        terminal_present_value,
    };

    // Long horizons can overflow f64 and leave inf or NaN behind
    if !(breakdown.terminal_value.is_finite() && breakdown.intrinsic_value().is_finite()) {
        debug!("DCF overflowed over {} years", input.years);
        return Err(ValuationError::InvalidInput(format!(
            "valuation overflowed over a {}-year horizon",
            input.years
        )));
    }

    Ok(breakdown)
}

/// Estimate intrinsic value from free cash flow
pub fn compute_intrinsic_value(input: &ValuationInput) -> Result<f64> {
    project_cash_flows(input).map(|breakdown| breakdown.intrinsic_value())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round2(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }

    #[test]
    fn test_zero_growth_matches_closed_form() {
        let input = ValuationInput::new(100.0, 0.0, 0.10, 0.03, 5);
        let value = compute_intrinsic_value(&input).unwrap();

        let discounted: f64 = (1..=5).map(|i| 100.0 / 1.10_f64.powi(i)).sum();
        let terminal = 100.0 * 1.03 / (0.10 - 0.03) / 1.10_f64.powi(5);
        let expected = round2(discounted + terminal);

        assert_eq!(round2(value), expected);
        assert_eq!(round2(value), 1292.72);
    }

    #[test]
    fn test_constant_growth_compounds_from_base_year() {
        let input = ValuationInput::new(1000.0, 0.10, 0.12, 0.02, 5);
        let breakdown = project_cash_flows(&input).unwrap();

        for projected in &breakdown.years {
            let expected = 1000.0 * 1.10_f64.powi(projected.year as i32);
            assert_eq!(projected.cash_flow, expected);
        }
        assert_eq!(breakdown.years.len(), 5);
        assert_eq!(round2(breakdown.intrinsic_value()), 14059.67);
    }

    #[test]
    fn test_growth_schedule_repeats_last_rate() {
        let input =
            ValuationInput::new(100.0, 0.0, 0.10, 0.03, 3).with_growth_rates(vec![0.1, 0.2]);
        let breakdown = project_cash_flows(&input).unwrap();

        let flows: Vec<f64> = breakdown.years.iter().map(|y| round2(y.cash_flow)).collect();
        assert_eq!(flows, vec![110.0, 132.0, 158.4]);

        let terminal = 158.4 * 1.03 / 0.07;
        assert!((breakdown.terminal_value - terminal).abs() < 1e-9);
        assert_eq!(round2(breakdown.intrinsic_value()), 2079.22);
    }

    #[test]
    fn test_empty_schedule_behaves_as_constant_growth() {
        let constant = ValuationInput::new(250.0, 0.08, 0.11, 0.025, 7);
        let empty = constant.clone().with_growth_rates(Vec::new());

        assert_eq!(
            compute_intrinsic_value(&constant).unwrap(),
            compute_intrinsic_value(&empty).unwrap()
        );
    }

    #[test]
    fn test_discount_must_exceed_terminal_growth() {
        let pairs = [(0.05, 0.05), (0.03, 0.04), (0.10, 0.10), (0.0, 0.01), (-0.02, 0.0)];
        for (discount, terminal) in pairs {
            let input = ValuationInput::new(100.0, 0.05, discount, terminal, 5);
            assert!(
                matches!(compute_intrinsic_value(&input), Err(ValuationError::InvalidInput(_))),
                "discount {discount} terminal {terminal} should be rejected"
            );
        }
    }

    #[test]
    fn test_non_positive_fcf_and_years_rejected() {
        for fcf in [0.0, -1.0, -1e9] {
            let input = ValuationInput::new(fcf, 0.05, 0.10, 0.02, 5);
            assert!(matches!(
                compute_intrinsic_value(&input),
                Err(ValuationError::InvalidInput(_))
            ));
        }

        let input = ValuationInput::new(100.0, 0.05, 0.10, 0.02, 0);
        assert!(matches!(compute_intrinsic_value(&input), Err(ValuationError::InvalidInput(_))));
    }

    #[test]
    fn test_non_finite_rates_rejected() {
        let input = ValuationInput::new(100.0, f64::NAN, 0.10, 0.02, 5);
        assert!(compute_intrinsic_value(&input).is_err());

        let input = ValuationInput::new(100.0, 0.05, 0.10, 0.02, 5)
            .with_growth_rates(vec![0.1, f64::INFINITY]);
        assert!(compute_intrinsic_value(&input).is_err());
    }

    #[test]
    fn test_overflowing_horizon_rejected() {
        let input = ValuationInput::new(100.0, 0.2, 0.1, 0.03, 5_000);
        assert!(matches!(
            compute_intrinsic_value(&input),
            Err(ValuationError::InvalidInput(_))
        ));

        let input = ValuationInput::new(100.0, 0.0, 0.1, 0.03, 5_000).with_growth_rates(vec![0.2]);
        assert!(matches!(
            project_cash_flows(&input),
            Err(ValuationError::InvalidInput(_))
        ));

        // A long but representable horizon is still valued
        let long = ValuationInput::new(100.0, 0.05, 0.1, 0.03, 500);
        let value = compute_intrinsic_value(&long).unwrap();
        assert!(value.is_finite() && value > 0.0);
    }

    #[test]
    fn test_monotonic_in_growth_and_discount() {
        let growths = [-0.05, 0.0, 0.03, 0.08, 0.15, 0.30];
        let values: Vec<f64> = growths
            .iter()
            .map(|&g| {
                compute_intrinsic_value(&ValuationInput::new(500.0, g, 0.12, 0.02, 5)).unwrap()
            })
            .collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));

        let discounts = [0.04, 0.06, 0.09, 0.12, 0.20];
        let values: Vec<f64> = discounts
            .iter()
            .map(|&d| {
                compute_intrinsic_value(&ValuationInput::new(500.0, 0.07, d, 0.02, 5)).unwrap()
            })
            .collect();
        assert!(values.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_input_serde_omits_missing_schedule() {
        let input = ValuationInput::new(100.0, 0.1, 0.12, 0.02, 5);
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("growth_rates").is_none());

        let parsed: ValuationInput = serde_json::from_value(serde_json::json!({
            "fcf": 100.0,
            "growth_rate": 0.1,
            "discount_rate": 0.12,
            "terminal_growth": 0.02,
            "years": 5
        }))
        .unwrap();
        assert_eq!(parsed, input);
    }
}
