//! Statistical inference (standard errors, p-values).

mod coefficient;

pub use coefficient::CoefficientInference;
pub(crate) use coefficient::{normal_quantile, normal_two_sided, normal_upper_tail};
