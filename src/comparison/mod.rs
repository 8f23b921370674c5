//! Comparison of fitted candidate models.
//!
//! Candidates are ranked by AIC or BIC with Akaike weights; failed fits are
//! reported instead of aborting the comparison. Pairs of fits can further be
//! tested with a likelihood-ratio test (nested) or a Vuong test (non-nested).

mod criterion;
mod hypothesis;
mod ranking;

use thiserror::Error;

pub use criterion::InformationCriterion;
pub use hypothesis::{likelihood_ratio_test, vuong_test, LikelihoodRatioTest, VuongTest};
pub use ranking::{ExcludedModel, FitOutcome, ModelComparison, RankedModel};

/// Errors raised by pairwise model tests.
#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("models were fitted on different observations ({first} vs {second})")]
    ObservationMismatch { first: usize, second: usize },

    #[error("full model must have more parameters than the restricted one ({full} <= {restricted})")]
    NotNested { restricted: usize, full: usize },

    #[error("numerical error: {0}")]
    Numerical(String),
}
