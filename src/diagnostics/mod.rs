//! Distributional diagnostics of the complaint counts.
//!
//! - **Summary**: mean, variance and the variance/mean ratio
//! - **Dispersion**: Cameron-Trivedi test on a Poisson GLM
//! - **Zero inflation**: observed zeros against `exp(-mean)`
//! - **Group tests**: Wilcoxon rank-sum and Welch t-test across gender
//! - **Correlations**: continuous predictors against `ln(complaints + 1)`
//! - **Collinearity**: auxiliary OLS and VIF
//! - **Separation**: predictors that perfectly split zeros from non-zeros
//!
//! # Example
//!
//! ```rust,ignore
//! use complaint_zinb::diagnostics::{run_diagnostics, DiagnosticOptions};
//!
//! let report = run_diagnostics(&dataset, &DiagnosticOptions::default())?;
//! if report.zero_inflation.flagged && report.overdispersion.overdispersed {
//!     // fit zero-inflated negative binomial models
//! }
//! ```

mod correlation;
mod dispersion;
mod options;
mod report;
mod separation;
mod summary;
mod vif;

use thiserror::Error;

pub use correlation::{correlation_test, log_count_correlations, pearson, CorrelationTest};
pub use dispersion::{
    dispersion_test, overdispersion_verdict, DispersionTest, OverdispersionVerdict,
};
pub use group_tests::{
    compare_by_gender, welch_t_test, wilcoxon_rank_sum, GroupComparison, WelchTest, WilcoxonTest,
};
pub use options::{DiagnosticOptions, DiagnosticOptionsBuilder, DispersionTrafo};
pub use report::{run_diagnostics, DiagnosticReport};
pub use separation::{detect_separation, detect_zero_levels, SeparationFinding};
pub use summary::{summarize_counts, zero_inflation_check, CountSummary, ZeroInflationCheck};
pub use vif::{
    collinearity, variance_inflation_factor, CollinearityReport, VifEntry, VifSeverity,
};

/// Errors raised by the diagnostic engine.
#[derive(Debug, Error)]
pub enum DiagnosticError {
    #[error("insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("one of the groups is empty")]
    EmptyGroup,

    #[error("'{0}' has zero variance")]
    ZeroVariance(String),

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] crate::core::OptionsError),

    #[error("auxiliary regression failed: {0}")]
    Regression(#[from] crate::solvers::RegressionError),

    #[error("numerical error: {0}")]
    Numerical(String),
}
