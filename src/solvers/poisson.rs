//! Poisson regression solver.
//!
//! Implements the log-link Poisson GLM using Iteratively Reweighted Least
//! Squares. The dispersion test fits this model to the complaint counts and
//! the ZINB engine takes its count starting values from it.
//!
//! # Example
//!
//! ```rust,ignore
//! use complaint_zinb::solvers::{FittedRegressor, PoissonRegressor, Regressor};
//! use faer::{Col, Mat};
//!
//! let x = Mat::from_fn(100, 2, |i, j| ((i + j) % 2) as f64);
//! let y = Col::from_fn(100, |i| (i % 4) as f64);
//!
//! let fitted = PoissonRegressor::builder().build().fit(&x, &y)?;
//! let mu = fitted.fitted_mean();
//! ```

use super::irls::{glm_standard_errors, irls};
use crate::core::{
    GlmFamily, PoissonFamily, RegressionOptions, RegressionOptionsBuilder, RegressionResult,
};
use crate::inference::CoefficientInference;
use crate::solvers::traits::{check_dimensions, FittedRegressor, RegressionError, Regressor};
use crate::utils::with_intercept;
use faer::{Col, Mat};

/// Poisson GLM regression estimator.
///
/// # Model
///
/// - `E[Y] = μ = exp(Xβ)`
/// - `Var[Y] = μ`
#[derive(Debug, Clone)]
pub struct PoissonRegressor {
    options: RegressionOptions,
    family: PoissonFamily,
}

impl PoissonRegressor {
    /// Create a new Poisson regressor with the given options.
    pub fn new(options: RegressionOptions) -> Self {
        Self {
            options,
            family: PoissonFamily,
        }
    }

    /// Create a builder.
    pub fn builder() -> PoissonRegressorBuilder {
        PoissonRegressorBuilder::default()
    }
}

impl Regressor for PoissonRegressor {
    type Fitted = FittedPoisson;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        let n_features = x.ncols();
        let n_params = n_features + usize::from(self.options.with_intercept);
        check_dimensions(x, y, n_params)?;

        if y.iter().any(|&v| v < 0.0) {
            return Err(RegressionError::NumericalError(
                "Poisson response must be non-negative".to_string(),
            ));
        }

        let design = if self.options.with_intercept {
            with_intercept(x)
        } else {
            x.clone()
        };
        let y_vec: Vec<f64> = y.iter().copied().collect();

        let fit = irls(
            &self.family,
            &design,
            &y_vec,
            self.options.max_iterations,
            self.options.tolerance,
            self.options.rank_tolerance,
        );
        if !fit.converged {
            return Err(RegressionError::ConvergenceFailure {
                spec: "poisson".to_string(),
                iterations: fit.iterations,
            });
        }

        let n = y_vec.len();
        let offset = usize::from(self.options.with_intercept);
        let null_deviance = self.family.null_deviance(&y_vec);
        let log_likelihood: f64 = y_vec
            .iter()
            .zip(fit.mu.iter())
            .map(|(&yi, &mi)| PoissonFamily::log_pmf(yi, mi))
            .sum();

        let mut result = RegressionResult::empty(n_features, n);
        result.intercept = self.options.with_intercept.then(|| fit.beta[0]);
        result.coefficients = Col::from_fn(n_features, |j| fit.beta[j + offset]);
        result.fitted_values = Col::from_fn(n, |i| fit.mu[i]);
        result.residuals = Col::from_fn(n, |i| y_vec[i] - fit.mu[i]);
        result.n_parameters = n_params;
        result.r_squared = if null_deviance > 0.0 {
            1.0 - fit.deviance / null_deviance
        } else {
            f64::NAN
        };
        result.log_likelihood = log_likelihood;
        result.aic = 2.0 * n_params as f64 - 2.0 * log_likelihood;
        result.bic = n_params as f64 * (n as f64).ln() - 2.0 * log_likelihood;

        if self.options.compute_inference {
            if let Some(se) = glm_standard_errors(&self.family, &design, &fit.mu) {
                let z = CoefficientInference::t_statistics(&fit.beta, &se);
                let p = CoefficientInference::normal_p_values(&z);
                result.std_errors = Some(Col::from_fn(n_features, |j| se[j + offset]));
                result.t_statistics = Some(Col::from_fn(n_features, |j| z[j + offset]));
                result.p_values = Some(Col::from_fn(n_features, |j| p[j + offset]));
                if self.options.with_intercept {
                    result.intercept_std_error = Some(se[0]);
                    result.intercept_p_value = Some(p[0]);
                }
            }
        }

        Ok(FittedPoisson {
            result,
            deviance: fit.deviance,
            null_deviance,
            iterations: fit.iterations,
        })
    }
}

/// A fitted Poisson GLM.
#[derive(Debug, Clone)]
pub struct FittedPoisson {
    result: RegressionResult,
    /// Residual deviance.
    pub deviance: f64,
    /// Deviance of the intercept-only model.
    pub null_deviance: f64,
    /// IRLS iterations used.
    pub iterations: usize,
}

impl FittedPoisson {
    /// Fitted means μ̂ on the training rows.
    pub fn fitted_mean(&self) -> &Col<f64> {
        &self.result.fitted_values
    }

    /// Pearson χ² divided by residual degrees of freedom.
    pub fn pearson_dispersion(&self) -> f64 {
        let df = self.result.residual_df() as f64;
        if df <= 0.0 {
            return f64::NAN;
        }
        let chi2: f64 = self
            .result
            .residuals
            .iter()
            .zip(self.result.fitted_values.iter())
            .map(|(&r, &mu)| r * r / mu.max(1e-10))
            .sum();
        chi2 / df
    }
}

impl FittedRegressor for FittedPoisson {
    fn predict(&self, x: &Mat<f64>) -> Col<f64> {
        let intercept = self.result.intercept.unwrap_or(0.0);
        Col::from_fn(x.nrows(), |i| {
            let eta = intercept
                + (0..x.ncols())
                    .map(|j| x[(i, j)] * self.result.coefficients[j])
                    .sum::<f64>();
            PoissonFamily.link_inverse(eta)
        })
    }

    fn result(&self) -> &RegressionResult {
        &self.result
    }
}

/// Builder for `PoissonRegressor`.
#[derive(Debug, Clone, Default)]
pub struct PoissonRegressorBuilder {
    builder: RegressionOptionsBuilder,
}

impl PoissonRegressorBuilder {
    /// Set whether to include an intercept term.
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.builder = self.builder.with_intercept(include);
        self
    }

    /// Set whether to compute standard errors.
    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.builder = self.builder.compute_inference(compute);
        self
    }

    /// Set the maximum number of IRLS iterations.
    pub fn max_iterations(mut self, max_iter: usize) -> Self {
        self.builder = self.builder.max_iterations(max_iter);
        self
    }

    /// Set the relative deviance tolerance.
    pub fn tolerance(mut self, tol: f64) -> Self {
        self.builder = self.builder.tolerance(tol);
        self
    }

    /// Build the Poisson regressor.
    pub fn build(self) -> PoissonRegressor {
        PoissonRegressor::new(self.builder.build_unchecked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_means_recovered() {
        // With a single indicator the fitted means equal the group means.
        let x = Mat::from_fn(8, 1, |i, _| (i % 2) as f64);
        let y = Col::from_fn(8, |i| [1.0, 4.0, 2.0, 6.0, 0.0, 5.0, 1.0, 5.0][i]);

        let fitted = PoissonRegressor::builder().build().fit(&x, &y).expect("fit");

        let mu = fitted.fitted_mean();
        assert!((mu[0] - 1.0).abs() < 1e-6);
        assert!((mu[1] - 5.0).abs() < 1e-6);
        assert!((fitted.coefficients()[0] - 5.0_f64.ln()).abs() < 1e-6);
    }

    #[test]
    fn test_predict_exponentiates() {
        let x = Mat::from_fn(6, 1, |i, _| i as f64);
        let y = Col::from_fn(6, |i| [1.0, 1.0, 2.0, 3.0, 5.0, 8.0][i]);
        let fitted = PoissonRegressor::builder().build().fit(&x, &y).expect("fit");

        let x_new = Mat::from_fn(1, 1, |_, _| 0.0);
        let pred = fitted.predict(&x_new);
        let intercept = fitted.intercept().expect("intercept");
        assert!((pred[0] - intercept.exp()).abs() < 1e-10);
    }

    #[test]
    fn test_negative_response_rejected() {
        let x = Mat::from_fn(4, 1, |i, _| i as f64);
        let y = Col::from_fn(4, |i| i as f64 - 1.0);
        assert!(PoissonRegressor::builder().build().fit(&x, &y).is_err());
    }
}
