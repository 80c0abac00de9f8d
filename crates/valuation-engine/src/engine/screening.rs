//! Value-investing screening score
//!
//! Five fundamental ratios are mapped onto point ladders and combined into a
//! weighted score. Valuation (PER + PBV) is halved before weighting, so the
//! highest reachable score is 85 rather than 100.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValuationError};

const VALUATION_WEIGHT: f64 = 0.3;
const PROFITABILITY_WEIGHT: f64 = 0.3;
const GROWTH_WEIGHT: f64 = 0.2;
const LEVERAGE_WEIGHT: f64 = 0.2;

/// Highest score the weighting can produce
pub const MAX_ACHIEVABLE_SCORE: f64 = 85.0;

/// Ratios as delivered by a data source; any of them may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreeningInput {
    #[serde(rename = "PER")]
    pub per: Option<f64>,
    #[serde(rename = "PBV")]
    pub pbv: Option<f64>,
    /// Return on equity in percent (15.0 = 15%)
    #[serde(rename = "ROE")]
    pub roe: Option<f64>,
    #[serde(rename = "DER")]
    pub der: Option<f64>,
    /// EPS growth in percent
    #[serde(rename = "EPSGrowth", alias = "EPS_Growth")]
    pub eps_growth: Option<f64>,
}

/// A complete set of screening ratios
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreeningRatios {
    pub per: f64,
    pub pbv: f64,
    pub roe: f64,
    pub der: f64,
    pub eps_growth: f64,
}

fn required(value: Option<f64>, field: &'static str) -> Result<f64> {
    value
        .filter(|v| v.is_finite())
        .ok_or(ValuationError::MissingData { field })
}

impl ScreeningInput {
    pub fn new(per: f64, pbv: f64, roe: f64, der: f64, eps_growth: f64) -> Self {
        Self {
            per: Some(per),
            pbv: Some(pbv),
            roe: Some(roe),
            der: Some(der),
            eps_growth: Some(eps_growth),
        }
    }

    /// Reject the first absent or non-finite ratio, in PER, PBV, ROE, DER,
    /// EPSGrowth order
    pub fn validate(&self) -> Result<ScreeningRatios> {
        Ok(ScreeningRatios {
            per: required(self.per, "PER")?,
            pbv: required(self.pbv, "PBV")?,
            roe: required(self.roe, "ROE")?,
            der: required(self.der, "DER")?,
            eps_growth: required(self.eps_growth, "EPSGrowth")?,
        })
    }
}

/// Points earned by each ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub per: f64,
    pub pbv: f64,
    pub roe: f64,
    pub der: f64,
    pub eps_growth: f64,
}

impl SubScores {
    /// PER points plus PBV points, 0 to 100
    pub fn valuation(&self) -> f64 {
        self.per + self.pbv
    }
}

/// Outcome of screening one equity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    /// Weighted score, rounded to 2 decimals
    pub score: f64,
    pub breakdown: SubScores,
    /// Criteria passed on the five-point checklist
    pub checklist_passed: u8,
}

fn per_points(per: f64) -> f64 {
    if per <= 8.0 {
        50.0
    } else if per <= 12.0 {
        30.0
    } else if per <= 15.0 {
        10.0
    } else {
        0.0
    }
}

fn pbv_points(pbv: f64) -> f64 {
    if pbv < 0.8 {
        50.0
    } else if pbv < 1.2 {
        30.0
    } else if pbv < 2.0 {
        10.0
    } else {
        0.0
    }
}

fn roe_points(roe: f64) -> f64 {
    if roe >= 20.0 {
        100.0
    } else if roe >= 15.0 {
        80.0
    } else if roe >= 10.0 {
        40.0
    } else {
        0.0
    }
}

fn eps_growth_points(growth: f64) -> f64 {
    if growth >= 15.0 {
        100.0
    } else if growth >= 10.0 {
        70.0
    } else if growth >= 5.0 {
        40.0
    } else {
        0.0
    }
}

fn der_points(der: f64) -> f64 {
    if der < 0.3 {
        100.0
    } else if der < 0.8 {
        80.0
    } else if der < 1.0 {
        30.0
    } else {
        0.0
    }
}

/// Points per ratio for a complete set of ratios
pub fn sub_scores(ratios: &ScreeningRatios) -> SubScores {
    SubScores {
        per: per_points(ratios.per),
        pbv: pbv_points(ratios.pbv),
        roe: roe_points(ratios.roe),
        der: der_points(ratios.der),
        eps_growth: eps_growth_points(ratios.eps_growth),
    }
}

/// Weighted score for a complete set of ratios
pub fn weighted_score(scores: &SubScores) -> f64 {
    let raw = VALUATION_WEIGHT * (scores.valuation() / 2.0)
        + PROFITABILITY_WEIGHT * scores.roe
        + GROWTH_WEIGHT * scores.eps_growth
        + LEVERAGE_WEIGHT * scores.der;
    (raw * 100.0).round() / 100.0
}

/// Pass/fail checklist: cheap earnings, below book, decent ROE, moderate debt,
/// growing EPS
pub fn checklist_score(ratios: &ScreeningRatios) -> u8 {
    [
        ratios.per < 10.0,
        ratios.pbv < 1.0,
        ratios.roe >= 10.0,
        ratios.der < 1.0,
        ratios.eps_growth > 0.0,
    ]
    .into_iter()
    .map(u8::from)
    .sum()
}

/// Score an equity against the value-investing rubric
pub fn compute_screening_score(input: &ScreeningInput) -> Result<ScreeningResult> {
    let ratios = input.validate()?;
    let breakdown = sub_scores(&ratios);

    Ok(ScreeningResult {
        score: weighted_score(&breakdown),
        breakdown,
        checklist_passed: checklist_score(&ratios),
    })
}
