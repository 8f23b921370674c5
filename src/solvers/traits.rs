//! Core traits for regression estimators.

use crate::core::RegressionResult;
use faer::{Col, Mat};
use thiserror::Error;

/// Errors that can occur during regression fitting.
#[derive(Debug, Error)]
pub enum RegressionError {
    #[error("dimension mismatch: X has {x_rows} rows but y has {y_len} elements")]
    DimensionMismatch { x_rows: usize, y_len: usize },

    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    #[error("matrix is singular or nearly singular")]
    SingularMatrix,

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] crate::core::OptionsError),

    #[error("model '{spec}' did not converge after {iterations} iterations")]
    ConvergenceFailure { spec: String, iterations: usize },

    #[error("invalid specification for model '{spec}': {reason}")]
    InvalidSpecification { spec: String, reason: String },

    #[error("perfect separation in model '{spec}' on predictor '{predictor}': {reason}")]
    PerfectSeparation {
        spec: String,
        predictor: String,
        reason: String,
    },

    #[error("numerical error: {0}")]
    NumericalError(String),
}

impl RegressionError {
    /// Shorthand for [`RegressionError::InvalidSpecification`].
    pub fn invalid(spec: &str, reason: impl Into<String>) -> Self {
        RegressionError::InvalidSpecification {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }
}

/// A regression estimator that can be fit to a design matrix.
///
/// Fitting returns a fitted model that can then make predictions.
pub trait Regressor {
    /// The type of the fitted model.
    type Fitted: FittedRegressor;

    /// Fit the model to the data.
    ///
    /// # Arguments
    /// * `x` - Design matrix of shape (n_samples, n_features), without intercept column
    /// * `y` - Target vector of length n_samples
    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError>;
}

/// A fitted regression model that can make predictions.
pub trait FittedRegressor {
    /// Predict the mean response for new rows.
    fn predict(&self, x: &Mat<f64>) -> Col<f64>;

    /// Access the regression results (coefficients, statistics, etc.).
    fn result(&self) -> &RegressionResult;

    /// Get the coefficients (convenience method).
    fn coefficients(&self) -> &Col<f64> {
        &self.result().coefficients
    }

    /// Get the intercept (convenience method).
    fn intercept(&self) -> Option<f64> {
        self.result().intercept
    }

    /// Get R² (convenience method).
    fn r_squared(&self) -> f64 {
        self.result().r_squared
    }
}

/// Validate shapes shared by every solver.
pub(crate) fn check_dimensions(
    x: &Mat<f64>,
    y: &Col<f64>,
    n_params: usize,
) -> Result<(), RegressionError> {
    if x.nrows() != y.nrows() {
        return Err(RegressionError::DimensionMismatch {
            x_rows: x.nrows(),
            y_len: y.nrows(),
        });
    }
    let needed = n_params.max(2);
    if x.nrows() < needed {
        return Err(RegressionError::InsufficientObservations {
            needed,
            got: x.nrows(),
        });
    }
    Ok(())
}
