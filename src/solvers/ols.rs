//! Ordinary Least Squares regression solver.
//!
//! Serves the auxiliary regressions: variance inflation factors, the
//! collinearity check on the complaint counts and the trafo variants of the
//! dispersion test.

use crate::core::{RegressionOptions, RegressionOptionsBuilder, RegressionResult};
use crate::inference::CoefficientInference;
use crate::solvers::traits::{check_dimensions, FittedRegressor, RegressionError, Regressor};
use crate::utils::{invert_square, solve_least_squares, with_intercept};
use faer::{Col, Mat};

/// Ordinary Least Squares regression estimator.
///
/// Uses QR decomposition with column pivoting; columns beyond the numerical
/// rank receive a zero coefficient.
///
/// # Example
///
/// ```rust,ignore
/// use complaint_zinb::solvers::{FittedRegressor, OlsRegressor, Regressor};
/// use faer::{Col, Mat};
///
/// let x = Mat::from_fn(100, 2, |i, j| (i + j) as f64);
/// let y = Col::from_fn(100, |i| 1.0 + 2.0 * i as f64);
///
/// let fitted = OlsRegressor::builder().build().fit(&x, &y)?;
/// println!("R² = {}", fitted.r_squared());
/// ```
#[derive(Debug, Clone)]
pub struct OlsRegressor {
    options: RegressionOptions,
}

impl OlsRegressor {
    /// Create a new OLS regressor with the given options.
    pub fn new(options: RegressionOptions) -> Self {
        Self { options }
    }

    /// Create a builder for configuring the regressor.
    pub fn builder() -> OlsRegressorBuilder {
        OlsRegressorBuilder::default()
    }
}

impl Regressor for OlsRegressor {
    type Fitted = FittedOls;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        let n_features = x.ncols();
        let n_params = n_features + usize::from(self.options.with_intercept);
        check_dimensions(x, y, n_params)?;

        let design = if self.options.with_intercept {
            with_intercept(x)
        } else {
            x.clone()
        };
        let beta = solve_least_squares(&design, y, self.options.rank_tolerance);
        let fitted_values = &design * &beta;
        let residuals = Col::from_fn(y.nrows(), |i| y[i] - fitted_values[i]);

        let result = self.compute_statistics(&design, y, &beta, residuals, fitted_values);
        Ok(FittedOls {
            options: self.options.clone(),
            result,
        })
    }
}

impl OlsRegressor {
    /// Fit statistics and, when requested, classical standard errors.
    fn compute_statistics(
        &self,
        design: &Mat<f64>,
        y: &Col<f64>,
        beta: &Col<f64>,
        residuals: Col<f64>,
        fitted_values: Col<f64>,
    ) -> RegressionResult {
        let n = y.nrows();
        let n_params = design.ncols();
        let offset = usize::from(self.options.with_intercept);
        let n_features = n_params - offset;

        let y_mean = y.iter().sum::<f64>() / n as f64;
        // Without an intercept R² is measured against zero, as R does.
        let tss: f64 = if self.options.with_intercept {
            y.iter().map(|&yi| (yi - y_mean).powi(2)).sum()
        } else {
            y.iter().map(|&yi| yi * yi).sum()
        };
        let rss: f64 = residuals.iter().map(|&r| r * r).sum();

        let r_squared = if tss > 0.0 {
            (1.0 - rss / tss).clamp(0.0, 1.0)
        } else if rss < 1e-10 {
            1.0
        } else {
            0.0
        };

        let df_resid = n.saturating_sub(n_params) as f64;
        let df_total = (n - offset) as f64;
        let adj_r_squared = if df_resid > 0.0 {
            1.0 - (1.0 - r_squared) * df_total / df_resid
        } else {
            f64::NAN
        };
        let mse = if df_resid > 0.0 {
            rss / df_resid
        } else {
            f64::NAN
        };

        let log_likelihood = if rss > 0.0 {
            -0.5 * n as f64 * (1.0 + (2.0 * std::f64::consts::PI).ln() + (rss / n as f64).ln())
        } else {
            f64::NAN
        };
        let k = (n_params + 1) as f64;
        let aic = 2.0 * k - 2.0 * log_likelihood;
        let bic = k * (n as f64).ln() - 2.0 * log_likelihood;

        let mut result = RegressionResult::empty(n_features, n);
        result.intercept = self.options.with_intercept.then(|| beta[0]);
        result.coefficients = Col::from_fn(n_features, |j| beta[j + offset]);
        result.residuals = residuals;
        result.fitted_values = fitted_values;
        result.n_parameters = n_params;
        result.r_squared = r_squared;
        result.adj_r_squared = adj_r_squared;
        result.mse = mse;
        result.log_likelihood = log_likelihood;
        result.aic = aic;
        result.bic = bic;

        if self.options.compute_inference && mse.is_finite() {
            let xtx = design.transpose() * design;
            if let Some(xtx_inv) = invert_square(&xtx) {
                let cov = Mat::from_fn(n_params, n_params, |i, j| mse * xtx_inv[(i, j)]);
                let se = CoefficientInference::standard_errors(&cov);
                let t = CoefficientInference::t_statistics(beta, &se);
                let p = CoefficientInference::p_values(&t, df_resid);

                result.std_errors = Some(Col::from_fn(n_features, |j| se[j + offset]));
                result.t_statistics = Some(Col::from_fn(n_features, |j| t[j + offset]));
                result.p_values = Some(Col::from_fn(n_features, |j| p[j + offset]));
                if self.options.with_intercept {
                    result.intercept_std_error = Some(se[0]);
                    result.intercept_p_value = Some(p[0]);
                }
            }
        }

        result
    }
}

/// A fitted OLS regression model.
#[derive(Debug, Clone)]
pub struct FittedOls {
    options: RegressionOptions,
    result: RegressionResult,
}

impl FittedOls {
    /// Get the options used to fit this model.
    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }
}

impl FittedRegressor for FittedOls {
    fn predict(&self, x: &Mat<f64>) -> Col<f64> {
        let intercept = self.result.intercept.unwrap_or(0.0);
        Col::from_fn(x.nrows(), |i| {
            intercept
                + (0..x.ncols())
                    .map(|j| x[(i, j)] * self.result.coefficients[j])
                    .sum::<f64>()
        })
    }

    fn result(&self) -> &RegressionResult {
        &self.result
    }
}

/// Builder for `OlsRegressor`.
#[derive(Debug, Clone, Default)]
pub struct OlsRegressorBuilder {
    builder: RegressionOptionsBuilder,
}

impl OlsRegressorBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to include an intercept term.
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.builder = self.builder.with_intercept(include);
        self
    }

    /// Set whether to compute inference statistics.
    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.builder = self.builder.compute_inference(compute);
        self
    }

    /// Set the rank tolerance for QR decomposition.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.builder = self.builder.rank_tolerance(tol);
        self
    }

    /// Build the OLS regressor.
    pub fn build(self) -> OlsRegressor {
        OlsRegressor::new(self.builder.build_unchecked())
    }
}
