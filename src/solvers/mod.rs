//! Regression solvers: auxiliary OLS and GLMs, and the ZINB engine.

mod bfgs;
mod binomial;
mod irls;
mod ols;
mod poisson;
mod traits;
mod zinb;

pub use bfgs::{minimize, BfgsConfig, BfgsOutcome, Objective};
pub use binomial::{BinomialRegressor, BinomialRegressorBuilder, FittedBinomial};
pub use ols::{FittedOls, OlsRegressor, OlsRegressorBuilder};
pub use poisson::{FittedPoisson, PoissonRegressor, PoissonRegressorBuilder};
pub use traits::{FittedRegressor, RegressionError, Regressor};
pub use zinb::{
    FittedZinb, RootogramBin, SeparationAdjustment, ZinbRegressor, ZinbRegressorBuilder,
};
