//! Logistic regression solver.
//!
//! Fits the binomial GLM with logit link by IRLS. The ZINB engine regresses
//! the zero indicator with it to seed the zero-inflation coefficients.

use super::irls::{glm_standard_errors, irls};
use crate::core::{
    BinomialFamily, GlmFamily, RegressionOptions, RegressionOptionsBuilder, RegressionResult,
};
use crate::inference::CoefficientInference;
use crate::solvers::traits::{check_dimensions, FittedRegressor, RegressionError, Regressor};
use crate::utils::with_intercept;
use faer::{Col, Mat};

/// Logistic (binomial, logit link) regression estimator.
///
/// The response must be coded 0/1.
#[derive(Debug, Clone)]
pub struct BinomialRegressor {
    options: RegressionOptions,
    family: BinomialFamily,
}

impl BinomialRegressor {
    /// Create a new logistic regressor with the given options.
    pub fn new(options: RegressionOptions) -> Self {
        Self {
            options,
            family: BinomialFamily,
        }
    }

    /// Create a builder.
    pub fn builder() -> BinomialRegressorBuilder {
        BinomialRegressorBuilder::default()
    }
}

impl Regressor for BinomialRegressor {
    type Fitted = FittedBinomial;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        let n_features = x.ncols();
        let n_params = n_features + usize::from(self.options.with_intercept);
        check_dimensions(x, y, n_params)?;

        if y.iter().any(|&v| v != 0.0 && v != 1.0) {
            return Err(RegressionError::NumericalError(
                "binomial response must be 0 or 1".to_string(),
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
                spec: "logistic".to_string(),
                iterations: fit.iterations,
            });
        }

        let n = y_vec.len();
        let offset = usize::from(self.options.with_intercept);
        let null_deviance = self.family.null_deviance(&y_vec);
        // For 0/1 data the log-likelihood is -D/2.
        let log_likelihood = -fit.deviance / 2.0;

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

        Ok(FittedBinomial {
            result,
            deviance: fit.deviance,
            iterations: fit.iterations,
        })
    }
}

/// A fitted logistic regression.
#[derive(Debug, Clone)]
pub struct FittedBinomial {
    result: RegressionResult,
    /// Residual deviance.
    pub deviance: f64,
    /// IRLS iterations used.
    pub iterations: usize,
}

impl FittedRegressor for FittedBinomial {
    /// Predicted probabilities.
    fn predict(&self, x: &Mat<f64>) -> Col<f64> {
        let intercept = self.result.intercept.unwrap_or(0.0);
        Col::from_fn(x.nrows(), |i| {
            let eta = intercept
                + (0..x.ncols())
                    .map(|j| x[(i, j)] * self.result.coefficients[j])
                    .sum::<f64>();
            BinomialFamily::logistic(eta)
        })
    }

    fn result(&self) -> &RegressionResult {
        &self.result
    }
}

/// Builder for `BinomialRegressor`.
#[derive(Debug, Clone, Default)]
pub struct BinomialRegressorBuilder {
    builder: RegressionOptionsBuilder,
}

impl BinomialRegressorBuilder {
    /// Set whether to include an intercept term.
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.builder = self.builder.with_intercept(include);
        self
    }

    /// Set the maximum number of IRLS iterations.
    pub fn max_iterations(mut self, max_iter: usize) -> Self {
        self.builder = self.builder.max_iterations(max_iter);
        self
    }

    /// Build the logistic regressor.
    pub fn build(self) -> BinomialRegressor {
        BinomialRegressor::new(self.builder.build_unchecked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_proportions_recovered() {
        // group 0: 1 of 4 successes, group 1: 3 of 4
        let x = Mat::from_fn(8, 1, |i, _| (i % 2) as f64);
        let y = Col::from_fn(8, |i| [1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0][i]);

        let fitted = BinomialRegressor::builder().build().fit(&x, &y).expect("fit");

        let p = fitted.predict(&Mat::from_fn(2, 1, |i, _| i as f64));
        assert!((p[0] - 0.25).abs() < 1e-6);
        assert!((p[1] - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_non_binary_response_rejected() {
        let x = Mat::from_fn(4, 1, |i, _| i as f64);
        let y = Col::from_fn(4, |i| i as f64);
        assert!(BinomialRegressor::builder().build().fit(&x, &y).is_err());
    }
}
