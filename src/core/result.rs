//! Result structures shared by the solvers.

use faer::Col;
use serde::Serialize;
use std::fmt;

/// Result from an auxiliary (OLS / GLM) fit.
///
/// Contains coefficients, fit statistics, and optionally inference statistics.
#[derive(Debug, Clone)]
pub struct RegressionResult {
    // ========== Core Results ==========
    /// Estimated coefficients (excluding intercept).
    pub coefficients: Col<f64>,

    /// Intercept term (if model was fit with intercept).
    pub intercept: Option<f64>,

    /// Residuals (y - fitted_values).
    pub residuals: Col<f64>,

    /// Fitted values (predictions on training data).
    pub fitted_values: Col<f64>,

    /// Number of parameters (including intercept if present).
    pub n_parameters: usize,

    /// Number of observations.
    pub n_observations: usize,

    // ========== Fit Statistics ==========
    /// Coefficient of determination (R², or 1 - D/D₀ for GLMs).
    pub r_squared: f64,

    /// Adjusted R².
    pub adj_r_squared: f64,

    /// Mean squared error.
    pub mse: f64,

    /// Log-likelihood.
    pub log_likelihood: f64,

    /// Akaike Information Criterion.
    pub aic: f64,

    /// Bayesian Information Criterion.
    pub bic: f64,

    // ========== Inference Statistics (Optional) ==========
    /// Standard errors of coefficients.
    pub std_errors: Option<Col<f64>>,

    /// Standard error of intercept.
    pub intercept_std_error: Option<f64>,

    /// t (OLS) or z (GLM) statistics for coefficients.
    pub t_statistics: Option<Col<f64>>,

    /// P-values for coefficient significance tests.
    pub p_values: Option<Col<f64>>,

    /// P-value for intercept.
    pub intercept_p_value: Option<f64>,
}

impl RegressionResult {
    /// Create a new empty result (used internally by solvers).
    pub(crate) fn empty(n_features: usize, n_observations: usize) -> Self {
        Self {
            coefficients: Col::zeros(n_features),
            intercept: None,
            residuals: Col::zeros(n_observations),
            fitted_values: Col::zeros(n_observations),
            n_parameters: 0,
            n_observations,
            r_squared: 0.0,
            adj_r_squared: 0.0,
            mse: 0.0,
            log_likelihood: 0.0,
            aic: 0.0,
            bic: 0.0,
            std_errors: None,
            intercept_std_error: None,
            t_statistics: None,
            p_values: None,
            intercept_p_value: None,
        }
    }

    /// Residual degrees of freedom (n - p).
    pub fn residual_df(&self) -> usize {
        self.n_observations.saturating_sub(self.n_parameters)
    }

    /// Coefficients with the intercept (if any) first.
    pub fn full_coefficients(&self) -> Vec<f64> {
        self.intercept
            .into_iter()
            .chain(self.coefficients.iter().copied())
            .collect()
    }
}

/// One row of a coefficient table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoefficientRow {
    pub term: String,
    pub estimate: f64,
    /// NaN when the information matrix could not be inverted.
    pub std_error: f64,
    pub z_value: f64,
    pub p_value: f64,
}

impl CoefficientRow {
    /// Whether inference for this coefficient is undefined.
    pub fn is_undefined(&self) -> bool {
        !self.estimate.is_finite() || !self.std_error.is_finite()
    }
}

/// Wald inference for the coefficients of one sub-model.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CoefficientTable {
    pub rows: Vec<CoefficientRow>,
}

impl CoefficientTable {
    /// Find a row by term label.
    pub fn get(&self, term: &str) -> Option<&CoefficientRow> {
        self.rows.iter().find(|r| r.term == term)
    }

    /// Estimates in row order.
    pub fn estimates(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.estimate).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for CoefficientTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|r| r.term.len())
            .max()
            .unwrap_or(0)
            .max(4);
        writeln!(
            f,
            "{:<width$}  {:>11}  {:>11}  {:>8}  {:>10}",
            "term", "estimate", "std.error", "z", "p",
        )?;
        for r in &self.rows {
            writeln!(
                f,
                "{:<width$}  {:>11.5}  {:>11.5}  {:>8.3}  {:>10.4e}{}",
                r.term,
                r.estimate,
                r.std_error,
                r.z_value,
                r.p_value,
                significance_stars(r.p_value),
            )?;
        }
        Ok(())
    }
}

/// R-style significance codes.
pub fn significance_stars(p: f64) -> &'static str {
    if !p.is_finite() {
        ""
    } else if p < 0.001 {
        " ***"
    } else if p < 0.01 {
        " **"
    } else if p < 0.05 {
        " *"
    } else if p < 0.1 {
        " ."
    } else {
        ""
    }
}
