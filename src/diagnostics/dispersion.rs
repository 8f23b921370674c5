//! Cameron-Trivedi test for overdispersion in a Poisson GLM.
//!
//! The Poisson fit regresses complaints on the categorical covariates. With
//! `aux = ((y - μ)² - y) / μ`, the null "Var = μ" is tested against the
//! one-sided alternative of extra variance.

use super::options::{DiagnosticOptions, DispersionTrafo};
use super::summary::CountSummary;
use super::DiagnosticError;
use crate::core::Predictor;
use crate::data::Dataset;
use crate::inference::normal_upper_tail;
use crate::solvers::{FittedRegressor, OlsRegressor, PoissonRegressor, Regressor};
use crate::utils::mean_and_sd;
use faer::{Col, Mat};
use log::debug;
use serde::Serialize;
use std::fmt;

/// Outcome of the dispersion test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispersionTest {
    pub trafo: DispersionTrafo,
    /// z (default) or t statistic of the auxiliary regression.
    pub statistic: f64,
    /// One-sided p-value, alternative "greater".
    pub p_value: f64,
    /// Estimated dispersion `1 + mean(aux)` (default and linear variants) or
    /// α of `Var = μ + α·μ²` (quadratic variant).
    pub estimate: f64,
    /// Pearson χ² / df of the Poisson fit, for reference.
    pub pearson_dispersion: f64,
    pub rejects: bool,
}

/// Run the test at `options.alpha`.
pub fn dispersion_test(
    data: &Dataset,
    options: &DiagnosticOptions,
) -> Result<DispersionTest, DiagnosticError> {
    let n = data.len();
    if n < 3 {
        return Err(DiagnosticError::InsufficientData { needed: 3, got: n });
    }

    let covariates = Predictor::CATEGORICAL;
    let x = Mat::from_fn(n, covariates.len(), |i, j| {
        covariates[j].value(&data.observations()[i])
    });
    let y = data.complaints();

    let poisson = PoissonRegressor::builder()
        .compute_inference(false)
        .build()
        .fit(&x, &y)?;
    let mu = poisson.fitted_mean();

    let aux: Vec<f64> = (0..n)
        .map(|i| ((y[i] - mu[i]).powi(2) - y[i]) / mu[i])
        .collect();

    let (statistic, estimate) = match options.dispersion_trafo {
        DispersionTrafo::None => {
            let (mean, sd) = mean_and_sd(&aux);
            ((n as f64).sqrt() * mean / sd, 1.0 + mean)
        }
        DispersionTrafo::Linear => {
            let (t, alpha) = auxiliary_regression(&aux, |_| 1.0)?;
            (t, 1.0 + alpha)
        }
        DispersionTrafo::Quadratic => auxiliary_regression(&aux, |i| mu[i])?,
    };

    let p_value = normal_upper_tail(statistic);
    debug!(
        "dispersion test ({:?}): statistic {:.4}, p {:.4e}, estimate {:.4}",
        options.dispersion_trafo, statistic, p_value, estimate
    );

    Ok(DispersionTest {
        trafo: options.dispersion_trafo,
        statistic,
        p_value,
        estimate,
        pearson_dispersion: poisson.pearson_dispersion(),
        rejects: p_value < options.alpha,
    })
}

/// OLS of `aux` on a single regressor without intercept; returns (t, slope).
fn auxiliary_regression(
    aux: &[f64],
    regressor: impl Fn(usize) -> f64,
) -> Result<(f64, f64), DiagnosticError> {
    let n = aux.len();
    let x = Mat::from_fn(n, 1, |i, _| regressor(i));
    let y = Col::from_fn(n, |i| aux[i]);

    let fitted = OlsRegressor::builder().with_intercept(false).build().fit(&x, &y)?;
    let slope = fitted.coefficients()[0];
    let t = fitted
        .result()
        .t_statistics
        .as_ref()
        .map_or(f64::NAN, |t| t[0]);
    Ok((t, slope))
}

/// Combined verdict of the variance/mean comparison and the formal test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverdispersionVerdict {
    pub variance_exceeds_mean: bool,
    pub test_rejects: bool,
    pub overdispersed: bool,
    /// Negative binomial is only recommended when both criteria agree.
    pub recommend_negative_binomial: bool,
}

/// Overdispersed iff the sample variance exceeds the mean and the
/// dispersion test rejects.
pub fn overdispersion_verdict(
    summary: &CountSummary,
    test: &DispersionTest,
) -> OverdispersionVerdict {
    let overdispersed = summary.variance_exceeds_mean && test.rejects;
    OverdispersionVerdict {
        variance_exceeds_mean: summary.variance_exceeds_mean,
        test_rejects: test.rejects,
        overdispersed,
        recommend_negative_binomial: overdispersed,
    }
}

impl fmt::Display for DispersionTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.trafo {
            DispersionTrafo::Quadratic => "alpha",
            _ => "dispersion",
        };
        writeln!(
            f,
            "dispersion test: statistic = {:.4}, p = {:.4e}, {} = {:.4}{}",
            self.statistic,
            self.p_value,
            label,
            self.estimate,
            if self.rejects { " (rejects equidispersion)" } else { "" }
        )
    }
}
