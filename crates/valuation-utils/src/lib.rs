//! Shared utilities for the valuation workspace
//!
//! Currently this is the tracing setup shared by the binaries.

pub mod logging;

pub use logging::{LogFormat, init_tracing};
