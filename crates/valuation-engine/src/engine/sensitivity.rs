//! Growth / discount sensitivity of the DCF valuation

use serde::{Deserialize, Serialize};

use super::dcf::{ValuationInput, compute_intrinsic_value};
use crate::error::Result;

/// Multipliers applied to the base growth rate (rows)
pub const GROWTH_MULTIPLIERS: [f64; 3] = [0.7, 1.0, 1.3];

/// Multipliers applied to the base discount rate (columns)
pub const DISCOUNT_MULTIPLIERS: [f64; 3] = [0.9, 1.0, 1.1];

/// Minimum spread kept between a scenario discount rate and terminal growth
pub const MIN_DISCOUNT_SPREAD: f64 = 0.01;

/// 3×3 matrix of intrinsic values, rows by growth scenario and columns by
/// discount scenario. Indices are 1-based: `(2, 2)` is the base case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    /// Growth rate used on each row
    pub growth_rates: [f64; 3],
    /// Discount rate used on each column, after clamping
    pub discount_rates: [f64; 3],
    values: [[f64; 3]; 3],
}

impl SensitivityGrid {
    /// Value at `(growth_index, discount_index)`, both in `1..=3`
    pub fn get(&self, growth_index: usize, discount_index: usize) -> Option<f64> {
        let row = self.values.get(growth_index.checked_sub(1)?)?;
        row.get(discount_index.checked_sub(1)?).copied()
    }

    /// The unperturbed scenario
    pub fn base_case(&self) -> f64 {
        self.values[1][1]
    }

    /// Number of scenarios, always 9
    pub fn len(&self) -> usize {
        self.values.len() * self.values[0].len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Row-major rows of values
    pub fn rows(&self) -> &[[f64; 3]; 3] {
        &self.values
    }

    /// `((growth_index, discount_index), value)` in growth-major order
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
        self.values.iter().enumerate().flat_map(|(g, row)| {
            row.iter()
                .enumerate()
                .map(move |(d, &value)| ((g + 1, d + 1), value))
        })
    }

    /// Smallest and largest scenario value
    pub fn range(&self) -> (f64, f64) {
        self.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| {
            (lo.min(v), hi.max(v))
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Run the DCF model over the perturbed growth/discount scenarios of `base`.
///
/// Only constant-growth mode is perturbed; a per-year schedule on `base` is
/// not carried into the scenarios.
pub fn compute_sensitivity_grid(base: &ValuationInput) -> Result<SensitivityGrid> {
    let growth_rates = GROWTH_MULTIPLIERS.map(|m| base.growth_rate * m);
    let discount_rates =
        DISCOUNT_MULTIPLIERS.map(|m| (base.discount_rate * m).max(base.terminal_growth + MIN_DISCOUNT_SPREAD));

    let mut values = [[0.0; 3]; 3];
    for (row, &growth_rate) in values.iter_mut().zip(&growth_rates) {
        for (cell, &discount_rate) in row.iter_mut().zip(&discount_rates) {
            let scenario = ValuationInput::new(
                base.fcf,
                growth_rate,
                discount_rate,
                base.terminal_growth,
                base.years,
            );
            *cell = round2(compute_intrinsic_value(&scenario)?);
        }
    }

    Ok(SensitivityGrid {
        growth_rates,
        discount_rates,
        values,
    })
}
