//! Valuation and scoring engines
//!
//! Everything in this module is pure and synchronous: no I/O, no shared state.

pub mod dcf;
pub mod screening;
pub mod sensitivity;
pub mod verdict;

pub use dcf::{DcfBreakdown, ProjectedYear, ValuationInput, compute_intrinsic_value, project_cash_flows};
pub use screening::{
    MAX_ACHIEVABLE_SCORE, ScreeningInput, ScreeningRatios, ScreeningResult, SubScores,
    checklist_score, compute_screening_score,
};
pub use sensitivity::{SensitivityGrid, compute_sensitivity_grid};
pub use verdict::{Valuation, Verdict, margin_of_safety, per_share};
