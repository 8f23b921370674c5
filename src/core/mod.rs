//! Core types: families, model specifications, design matrices, options, results.

mod binomial;
mod design;
mod family;
mod negative_binomial;
mod options;
mod poisson;
mod result;
mod spec;

pub use binomial::BinomialFamily;
pub use design::{build_design, DesignError, DesignMatrix, Standardization, INTERCEPT_LABEL};
pub use family::GlmFamily;
pub use negative_binomial::NegativeBinomialFamily;
pub use options::{OptionsError, RegressionOptions, RegressionOptionsBuilder, SeparationPolicy};
pub use poisson::PoissonFamily;
pub use result::{significance_stars, CoefficientRow, CoefficientTable, RegressionResult};
pub use spec::{ModelSpec, Predictor, SpecError, Term};
