//! Zero-inflated negative binomial analysis of doctor complaint counts.
//!
//! The crate runs a strictly forward pipeline: a TSV table is loaded and
//! cleaned, the complaint counts are checked for overdispersion and excess
//! zeros, a sequence of zero-inflated negative binomial (ZINB) models is
//! fitted by maximum likelihood, and the fits are ranked by AIC or BIC.
//!
//! # Example
//!
//! ```rust,ignore
//! use complaint_zinb::prelude::*;
//!
//! let raw = load_tsv("data/complaints.tsv")?;
//! let (dataset, _) = clean(raw);
//!
//! let spec = ModelSpec::new("full")
//!     .count(Predictor::ALL)
//!     .zero(Predictor::ALL);
//! let fitted = ZinbRegressor::builder()
//!     .separation_policy(SeparationPolicy::DropFromZeroModel)
//!     .build()
//!     .fit(&dataset, &spec)?;
//!
//! println!("{fitted}");
//! println!("θ = {:.3}, AIC = {:.2}", fitted.theta, fitted.aic);
//! ```

pub mod comparison;
pub mod core;
pub mod data;
pub mod diagnostics;
pub mod inference;
pub mod pipeline;
pub mod solvers;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::comparison::{
        likelihood_ratio_test, vuong_test, FitOutcome, InformationCriterion, ModelComparison,
    };
    pub use crate::core::{
        ModelSpec, Predictor, RegressionOptions, RegressionOptionsBuilder, SeparationPolicy, Term,
    };
    pub use crate::data::{clean, load_tsv, parse_tsv, Dataset, Gender, Observation, Residency};
    pub use crate::diagnostics::{run_diagnostics, DiagnosticOptions, DiagnosticReport};
    pub use crate::pipeline::{AnalysisPipeline, AnalysisReport, PipelineConfig};
    pub use crate::solvers::{
        FittedRegressor, FittedZinb, OlsRegressor, PoissonRegressor, RegressionError, Regressor,
        ZinbRegressor,
    };
}

pub use crate::core::{ModelSpec, Predictor, RegressionOptions, SeparationPolicy};
pub use crate::solvers::{FittedZinb, RegressionError, ZinbRegressor};
