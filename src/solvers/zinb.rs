//! Zero-inflated negative binomial regression.
//!
//! Each complaint count comes either from a structural zero (probability π)
//! or from a negative binomial count process:
//!
//! - `P(Y = 0) = π + (1 - π)·NB(0; μ, θ)`
//! - `P(Y = y) = (1 - π)·NB(y; μ, θ)` for `y > 0`
//!
//! with `μ = exp(Xβ)` and `π = logistic(Zγ)`. All parameters, including
//! `log θ`, are estimated jointly by maximum likelihood using BFGS with the
//! analytic gradient. A specification without a zero model fits plain
//! negative binomial (`π = 0`).
//!
//! # Example
//!
//! ```rust,ignore
//! use complaint_zinb::core::{ModelSpec, Predictor};
//! use complaint_zinb::solvers::ZinbRegressor;
//!
//! let spec = ModelSpec::new("full").count(Predictor::ALL).zero(Predictor::ALL);
//! let fitted = ZinbRegressor::builder().build().fit(&dataset, &spec)?;
//! println!("{fitted}");
//! ```

use super::bfgs::{minimize, BfgsConfig, Objective};
use super::binomial::BinomialRegressor;
use super::poisson::PoissonRegressor;
use super::traits::{FittedRegressor, RegressionError, Regressor};
use crate::core::{
    build_design, BinomialFamily, CoefficientTable, ModelSpec, NegativeBinomialFamily,
    Predictor, RegressionOptions, RegressionOptionsBuilder, SeparationPolicy,
    Standardization,
};
use crate::data::Dataset;
use crate::diagnostics::{detect_separation, detect_zero_levels};
use crate::inference::CoefficientInference;
use crate::utils::invert_square;
use faer::{Col, Mat};
use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;

/// Bound on |η| and |ζ| when exponentiating.
const LINEAR_PREDICTOR_BOUND: f64 = 50.0;
/// Bound on |coefficient| for IRLS starting values.
const START_BOUND: f64 = 10.0;
const START_ITERATIONS: usize = 50;

/// A zero-model predictor removed because it separated the zero indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeparationAdjustment {
    pub predictor: Predictor,
    pub reason: String,
}

/// Observed and expected frequency of one count value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RootogramBin {
    pub count: u64,
    pub observed: f64,
    pub expected: f64,
}

/// ZINB estimator.
#[derive(Debug, Clone, Default)]
pub struct ZinbRegressor {
    options: RegressionOptions,
    separation_policy: SeparationPolicy,
}

impl ZinbRegressor {
    /// Create a regressor with the given options and separation policy.
    pub fn new(options: RegressionOptions, separation_policy: SeparationPolicy) -> Self {
        Self {
            options,
            separation_policy,
        }
    }

    /// Create a builder.
    pub fn builder() -> ZinbRegressorBuilder {
        ZinbRegressorBuilder::default()
    }

    /// Options used for every fit.
    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }

    /// Fit `spec` to `data`.
    pub fn fit(&self, data: &Dataset, spec: &ModelSpec) -> Result<FittedZinb, RegressionError> {
        self.options.validate()?;
        spec.validate()
            .map_err(|e| RegressionError::invalid(&spec.name, e.to_string()))?;

        let n = data.len();
        if n == 0 {
            return Err(RegressionError::invalid(&spec.name, "dataset is empty"));
        }
        let y = data.complaints_vec();
        if y.iter().all(|&v| v == 0.0) {
            return Err(RegressionError::invalid(
                &spec.name,
                "response is zero for every observation",
            ));
        }

        let (effective, adjustments) = self.resolve_separation(data, spec)?;

        let k = effective.n_parameters();
        if k > n {
            return Err(RegressionError::invalid(
                &spec.name,
                format!("{k} parameters but only {n} observations"),
            ));
        }

        let standardize = effective.standardize_interactions;
        let count_design = build_design(data, &effective.count_terms, standardize)
            .map_err(|e| RegressionError::invalid(&spec.name, format!("count model: {e}")))?;
        let zero_design = effective
            .zero_terms
            .as_ref()
            .map(|terms| build_design(data, terms, standardize))
            .transpose()
            .map_err(|e| RegressionError::invalid(&spec.name, format!("zero model: {e}")))?;

        let likelihood = ZinbLikelihood {
            x: &count_design.matrix,
            z: zero_design.as_ref().map(|d| &d.matrix),
            y: &y,
        };
        let start = self.starting_values(&likelihood);
        debug!(
            "model '{}': starting values {:?}",
            spec.name,
            start.iter().collect::<Vec<_>>()
        );

        let config = BfgsConfig {
            max_iterations: self.options.max_iterations,
            tolerance: self.options.tolerance,
            gradient_tolerance: self.options.gradient_tolerance,
        };
        let outcome = minimize(&likelihood, start, &config).ok_or_else(|| {
            RegressionError::NumericalError(format!(
                "log-likelihood of model '{}' is not finite at the starting values",
                spec.name
            ))
        })?;

        if !outcome.converged {
            warn!(
                "model '{}' did not converge after {} iterations",
                spec.name, outcome.iterations
            );
            return Err(RegressionError::ConvergenceFailure {
                spec: spec.name.clone(),
                iterations: outcome.iterations,
            });
        }
        if likelihood.reaches_bound(&outcome.params) {
            warn!(
                "model '{}': a linear predictor reached ±{}, the coefficients diverge",
                spec.name, LINEAR_PREDICTOR_BOUND
            );
            return Err(RegressionError::ConvergenceFailure {
                spec: spec.name.clone(),
                iterations: outcome.iterations,
            });
        }

        let params = outcome.params;
        let p_count = likelihood.p_count();
        let p_zero = likelihood.p_zero();

        let covariance = if self.options.compute_inference {
            let hessian = likelihood.numerical_hessian(&params);
            let inverse = invert_square(&hessian);
            if inverse.is_none() {
                warn!(
                    "model '{}': Hessian is singular, standard errors are undefined",
                    spec.name
                );
            }
            inverse
        } else {
            None
        };

        let block = |offset: usize, len: usize| -> Option<Mat<f64>> {
            covariance
                .as_ref()
                .map(|c| Mat::from_fn(len, len, |i, j| c[(offset + i, offset + j)]))
        };
        let estimates: Vec<f64> = params.iter().copied().collect();

        let count = CoefficientInference::wald_table(
            &count_design.labels,
            &estimates[..p_count],
            block(0, p_count).as_ref(),
        );
        let zero = zero_design.as_ref().map(|design| {
            CoefficientInference::wald_table(
                &design.labels,
                &estimates[p_count..p_count + p_zero],
                block(p_count, p_zero).as_ref(),
            )
        });

        let log_theta = params[p_count + p_zero];
        let log_theta_std_error = covariance
            .as_ref()
            .map(|c| c[(p_count + p_zero, p_count + p_zero)])
            .filter(|v| v.is_finite() && *v > 0.0)
            .map_or(f64::NAN, f64::sqrt);
        let theta = log_theta.exp();

        let state = likelihood.state(&params);
        let contributions = state.contributions.clone();
        let log_likelihood: f64 = contributions.iter().sum();
        let k = (p_count + p_zero + 1) as f64;
        let aic = 2.0 * k - 2.0 * log_likelihood;
        let bic = k * (n as f64).ln() - 2.0 * log_likelihood;

        let mut standardizations = count_design.standardized.clone();
        if let Some(design) = &zero_design {
            for s in &design.standardized {
                if !standardizations.iter().any(|t| t.predictor == s.predictor) {
                    standardizations.push(*s);
                }
            }
        }

        info!(
            "model '{}' converged in {} iterations: logLik {:.4}, AIC {:.3}, theta {:.4}",
            spec.name, outcome.iterations, log_likelihood, aic, theta
        );

        Ok(FittedZinb {
            name: spec.name.clone(),
            spec: effective,
            count,
            zero,
            theta,
            theta_std_error: theta * log_theta_std_error,
            log_theta,
            log_theta_std_error,
            log_likelihood,
            n_parameters: p_count + p_zero + 1,
            n_observations: n,
            iterations: outcome.iterations,
            converged: outcome.converged,
            aic,
            bic,
            separation_adjustments: adjustments,
            standardizations,
            loglik_contributions: contributions,
            response: y,
            fitted_mean: state.mu,
            zero_probability: state.pi,
        })
    }

    /// Apply the separation policy.
    ///
    /// Only the zero model is ever adjusted. A categorical count predictor
    /// with an all-zero level cannot be estimated, so it is an error under
    /// every policy but `Ignore`.
    fn resolve_separation(
        &self,
        data: &Dataset,
        spec: &ModelSpec,
    ) -> Result<(ModelSpec, Vec<SeparationAdjustment>), RegressionError> {
        for finding in detect_zero_levels(data, &spec.count_predictors()) {
            if self.separation_policy == SeparationPolicy::Ignore {
                warn!(
                    "model '{}': count predictor '{}' separates the response, fitting anyway ({})",
                    spec.name, finding.predictor, finding.reason
                );
            } else {
                return Err(RegressionError::PerfectSeparation {
                    spec: spec.name.clone(),
                    predictor: finding.predictor.to_string(),
                    reason: format!("count model: {}", finding.reason),
                });
            }
        }

        let mut effective = spec.clone();
        let mut adjustments = Vec::new();
        if !spec.is_zero_inflated() {
            return Ok((effective, adjustments));
        }

        for finding in detect_separation(data, &spec.zero_predictors()) {
            match self.separation_policy {
                SeparationPolicy::Fail => {
                    return Err(RegressionError::PerfectSeparation {
                        spec: spec.name.clone(),
                        predictor: finding.predictor.to_string(),
                        reason: finding.reason,
                    });
                }
                SeparationPolicy::DropFromZeroModel => {
                    warn!(
                        "model '{}': dropping '{}' from the zero model ({})",
                        spec.name, finding.predictor, finding.reason
                    );
                    effective = effective.without_zero_predictor(finding.predictor);
                    adjustments.push(SeparationAdjustment {
                        predictor: finding.predictor,
                        reason: finding.reason,
                    });
                }
                SeparationPolicy::Ignore => {
                    warn!(
                        "model '{}': '{}' separates the zero indicator, fitting anyway ({})",
                        spec.name, finding.predictor, finding.reason
                    );
                }
            }
        }

        Ok((effective, adjustments))
    }

    /// Poisson GLM for β, logistic GLM of the zero indicator for γ, θ = 1.
    ///
    /// A GLM that fails to converge falls back to an intercept-only start.
    fn starting_values(&self, likelihood: &ZinbLikelihood<'_>) -> Col<f64> {
        let p_count = likelihood.p_count();
        let p_zero = likelihood.p_zero();
        let n = likelihood.y.len();
        let mut start = Col::zeros(p_count + p_zero + 1);

        let glm_options = RegressionOptions {
            with_intercept: true,
            compute_inference: false,
            max_iterations: START_ITERATIONS,
            ..self.options.clone()
        };
        let y = Col::from_fn(n, |i| likelihood.y[i]);

        match PoissonRegressor::new(glm_options.clone()).fit(&drop_intercept(likelihood.x), &y) {
            Ok(fitted) => seed_block(&mut start, 0, &fitted),
            Err(err) => {
                debug!("Poisson starting values unavailable ({err}); using the log mean");
                let mean = likelihood.y.iter().sum::<f64>() / n as f64;
                start[0] = mean.max(1e-3).ln();
            }
        }

        if let Some(z) = likelihood.z {
            let indicator = Col::from_fn(n, |i| if likelihood.y[i] == 0.0 { 1.0 } else { 0.0 });
            match BinomialRegressor::new(glm_options).fit(&drop_intercept(z), &indicator) {
                Ok(fitted) => seed_block(&mut start, p_count, &fitted),
                Err(err) => {
                    debug!("logistic starting values unavailable ({err}); using the zero share");
                    let share = (indicator.iter().sum::<f64>() / n as f64).clamp(1e-3, 1.0 - 1e-3);
                    start[p_count] = (share / (1.0 - share)).ln();
                }
            }
        }

        start
    }
}

/// Design columns after the leading intercept.
fn drop_intercept(design: &Mat<f64>) -> Mat<f64> {
    Mat::from_fn(design.nrows(), design.ncols().saturating_sub(1), |i, j| {
        design[(i, j + 1)]
    })
}

/// Copy a GLM's intercept and slopes into `start` from `offset` on.
fn seed_block<F: FittedRegressor>(start: &mut Col<f64>, offset: usize, fitted: &F) {
    start[offset] = bounded_start(fitted.intercept().unwrap_or(0.0));
    let slopes = fitted.coefficients();
    for j in 0..slopes.nrows() {
        start[offset + 1 + j] = bounded_start(slopes[j]);
    }
}

fn bounded_start(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-START_BOUND, START_BOUND)
    } else {
        0.0
    }
}

/// Per-observation quantities at one parameter vector.
struct LikelihoodState {
    mu: Vec<f64>,
    pi: Vec<f64>,
    contributions: Vec<f64>,
}

/// Negative ZINB log-likelihood over `(β, γ, log θ)`.
struct ZinbLikelihood<'a> {
    x: &'a Mat<f64>,
    z: Option<&'a Mat<f64>>,
    y: &'a [f64],
}

impl ZinbLikelihood<'_> {
    fn p_count(&self) -> usize {
        self.x.ncols()
    }

    fn p_zero(&self) -> usize {
        self.z.map_or(0, |z| z.ncols())
    }

    /// Linear predictor of row `i`, clamped to the bound, and whether the
    /// clamp was active.
    fn linear_predictor(m: &Mat<f64>, params: &Col<f64>, offset: usize, i: usize) -> (f64, bool) {
        let eta: f64 = (0..m.ncols()).map(|j| m[(i, j)] * params[offset + j]).sum();
        let clamped = eta.clamp(-LINEAR_PREDICTOR_BOUND, LINEAR_PREDICTOR_BOUND);
        (clamped, clamped != eta)
    }

    /// True when some observation's η or ζ sits on the bound, i.e. the
    /// coefficients are running off to infinity.
    fn reaches_bound(&self, params: &Col<f64>) -> bool {
        let p_count = self.p_count();
        (0..self.y.len()).any(|i| {
            let at_bound = |(value, clamped): (f64, bool)| {
                clamped || value.abs() >= LINEAR_PREDICTOR_BOUND
            };
            at_bound(Self::linear_predictor(self.x, params, 0, i))
                || self
                    .z
                    .is_some_and(|z| at_bound(Self::linear_predictor(z, params, p_count, i)))
        })
    }

    fn state(&self, params: &Col<f64>) -> LikelihoodState {
        let n = self.y.len();
        let p_count = self.p_count();
        let theta = params[p_count + self.p_zero()].exp();
        let nb = NegativeBinomialFamily { theta };

        let mut mu = Vec::with_capacity(n);
        let mut pi = Vec::with_capacity(n);
        let mut contributions = Vec::with_capacity(n);

        for i in 0..n {
            let mu_i = Self::linear_predictor(self.x, params, 0, i).0.exp();
            let zeta = self
                .z
                .map(|z| Self::linear_predictor(z, params, p_count, i).0);

            let ll = match zeta {
                None if self.y[i] == 0.0 => nb.log_prob_zero(mu_i),
                None => nb.log_pmf(self.y[i], mu_i),
                Some(zeta) if self.y[i] == 0.0 => log_add_exp(
                    BinomialFamily::log_logistic(zeta),
                    BinomialFamily::log_one_minus_logistic(zeta) + nb.log_prob_zero(mu_i),
                ),
                Some(zeta) => {
                    BinomialFamily::log_one_minus_logistic(zeta) + nb.log_pmf(self.y[i], mu_i)
                }
            };

            mu.push(mu_i);
            pi.push(zeta.map_or(0.0, BinomialFamily::logistic));
            contributions.push(ll);
        }

        LikelihoodState {
            mu,
            pi,
            contributions,
        }
    }

    /// Gradient of the log-likelihood (not its negative).
    fn score(&self, params: &Col<f64>) -> Col<f64> {
        let p_count = self.p_count();
        let p_zero = self.p_zero();
        let theta_index = p_count + p_zero;
        let theta = params[theta_index].exp();
        let nb = NegativeBinomialFamily { theta };

        let mut grad = Col::zeros(theta_index + 1);
        for i in 0..self.y.len() {
            let y = self.y[i];
            let (eta, eta_clamped) = Self::linear_predictor(self.x, params, 0, i);
            let mu = eta.exp();
            let zeta = self.z.map(|z| Self::linear_predictor(z, params, p_count, i));

            let (d_eta, d_zeta, d_log_theta) = match zeta.map(|(zeta, _)| zeta) {
                Some(zeta) if y == 0.0 => {
                    let log_pi = BinomialFamily::log_logistic(zeta);
                    let log_one_minus_pi = BinomialFamily::log_one_minus_logistic(zeta);
                    let log_p0 = nb.log_prob_zero(mu);
                    let ll = log_add_exp(log_pi, log_one_minus_pi + log_p0);
                    // share of P(Y = 0) coming from the count process
                    let w_count = (log_one_minus_pi + log_p0 - ll).exp();
                    let w_zeta = (log_pi + log_one_minus_pi - ll).exp() * -log_p0.exp_m1();
                    (
                        w_count * nb.score_eta(0.0, mu),
                        w_zeta,
                        w_count * theta * nb.score_theta(0.0, mu),
                    )
                }
                Some(zeta) => (
                    nb.score_eta(y, mu),
                    -BinomialFamily::logistic(zeta),
                    theta * nb.score_theta(y, mu),
                ),
                None => (nb.score_eta(y, mu), 0.0, theta * nb.score_theta(y, mu)),
            };

            // the value is flat in a clamped predictor, so is its gradient
            if !eta_clamped {
                for j in 0..p_count {
                    grad[j] += d_eta * self.x[(i, j)];
                }
            }
            if let (Some(z), Some((_, false))) = (self.z, zeta) {
                for j in 0..p_zero {
                    grad[p_count + j] += d_zeta * z[(i, j)];
                }
            }
            grad[theta_index] += d_log_theta;
        }
        grad
    }

    /// Hessian of the negative log-likelihood by central differences of the
    /// analytic gradient, symmetrized.
    fn numerical_hessian(&self, params: &Col<f64>) -> Mat<f64> {
        let p = params.nrows();
        let mut hessian = Mat::zeros(p, p);

        for k in 0..p {
            let h = 1e-5 * params[k].abs().max(1.0);
            let mut forward = params.clone();
            let mut backward = params.clone();
            forward[k] += h;
            backward[k] -= h;
            let g_forward = self.gradient(&forward);
            let g_backward = self.gradient(&backward);
            for j in 0..p {
                hessian[(j, k)] = (g_forward[j] - g_backward[j]) / (2.0 * h);
            }
        }

        Mat::from_fn(p, p, |i, j| 0.5 * (hessian[(i, j)] + hessian[(j, i)]))
    }
}

impl Objective for ZinbLikelihood<'_> {
    fn value(&self, params: &Col<f64>) -> f64 {
        let theta = params[self.p_count() + self.p_zero()].exp();
        if !theta.is_finite() || theta <= 0.0 {
            return f64::INFINITY;
        }
        -self.state(params).contributions.iter().sum::<f64>()
    }

    fn gradient(&self, params: &Col<f64>) -> Col<f64> {
        let score = self.score(params);
        Col::from_fn(score.nrows(), |j| -score[j])
    }
}

/// ln(e^a + e^b) without overflow.
fn log_add_exp(a: f64, b: f64) -> f64 {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if lo == f64::NEG_INFINITY {
        hi
    } else {
        hi + (lo - hi).exp().ln_1p()
    }
}

/// A fitted zero-inflated (or plain) negative binomial model.
#[derive(Debug, Clone, Serialize)]
pub struct FittedZinb {
    /// Name of the requested specification.
    pub name: String,
    /// Specification actually fitted, after separation adjustments.
    pub spec: ModelSpec,
    /// Count sub-model coefficients (log scale).
    pub count: CoefficientTable,
    /// Zero sub-model coefficients (logit scale); `None` for plain NB.
    pub zero: Option<CoefficientTable>,
    pub theta: f64,
    /// Delta-method standard error of θ.
    pub theta_std_error: f64,
    pub log_theta: f64,
    pub log_theta_std_error: f64,
    pub log_likelihood: f64,
    /// Number of estimated parameters `k`, θ included.
    pub n_parameters: usize,
    pub n_observations: usize,
    pub iterations: usize,
    pub converged: bool,
    pub aic: f64,
    pub bic: f64,
    pub separation_adjustments: Vec<SeparationAdjustment>,
    /// Centering and scaling applied to interaction predictors.
    pub standardizations: Vec<Standardization>,
    #[serde(skip)]
    loglik_contributions: Vec<f64>,
    #[serde(skip)]
    response: Vec<f64>,
    #[serde(skip)]
    fitted_mean: Vec<f64>,
    #[serde(skip)]
    zero_probability: Vec<f64>,
}

impl FittedZinb {
    /// Per-observation log-likelihood contributions.
    pub fn loglik_contributions(&self) -> &[f64] {
        &self.loglik_contributions
    }

    /// Mean of the count component, μᵢ.
    pub fn fitted_mean(&self) -> &[f64] {
        &self.fitted_mean
    }

    /// Probability of a structural zero, πᵢ (zero for plain NB).
    pub fn zero_probability(&self) -> &[f64] {
        &self.zero_probability
    }

    /// E[Yᵢ] = (1 - πᵢ)·μᵢ.
    pub fn expected_response(&self) -> Vec<f64> {
        self.fitted_mean
            .iter()
            .zip(&self.zero_probability)
            .map(|(&mu, &pi)| (1.0 - pi) * mu)
            .collect()
    }

    /// (yᵢ - E[Yᵢ]) / sqrt(Var[Yᵢ]) with
    /// `Var = (1-π)·μ·(1 + π·μ + μ/θ)`.
    pub fn pearson_residuals(&self) -> Vec<f64> {
        self.response
            .iter()
            .zip(self.fitted_mean.iter().zip(&self.zero_probability))
            .map(|(&y, (&mu, &pi))| {
                let mean = (1.0 - pi) * mu;
                let variance = (1.0 - pi) * mu * (1.0 + pi * mu + mu / self.theta);
                (y - mean) / variance.max(1e-300).sqrt()
            })
            .collect()
    }

    /// Model probability of `count` for each observation.
    pub fn probability(&self, count: u64) -> Vec<f64> {
        let nb = NegativeBinomialFamily { theta: self.theta };
        let y = count as f64;
        self.fitted_mean
            .iter()
            .zip(&self.zero_probability)
            .map(|(&mu, &pi)| {
                let p = nb.log_pmf(y, mu).exp();
                if count == 0 {
                    pi + (1.0 - pi) * p
                } else {
                    (1.0 - pi) * p
                }
            })
            .collect()
    }

    /// Observed against expected frequencies for counts `0..=max_count`
    /// (default: the largest observed count).
    pub fn rootogram(&self, max_count: Option<u64>) -> Vec<RootogramBin> {
        let observed_max = self.response.iter().fold(0.0_f64, |m, &y| m.max(y)) as u64;
        let max_count = max_count.unwrap_or(observed_max);
        (0..=max_count)
            .map(|count| RootogramBin {
                count,
                observed: self.response.iter().filter(|&&y| y == count as f64).count() as f64,
                expected: self.probability(count).iter().sum(),
            })
            .collect()
    }

    /// Whether any zero-model predictor was dropped for separation.
    pub fn was_adjusted(&self) -> bool {
        !self.separation_adjustments.is_empty()
    }

    /// A fit carrying only likelihood summaries, for comparator tests.
    #[cfg(test)]
    pub(crate) fn from_likelihood(
        name: &str,
        n_parameters: usize,
        loglik_contributions: Vec<f64>,
    ) -> Self {
        let n = loglik_contributions.len();
        let log_likelihood: f64 = loglik_contributions.iter().sum();
        let k = n_parameters as f64;
        Self {
            name: name.to_string(),
            spec: ModelSpec::new(name),
            count: CoefficientTable { rows: Vec::new() },
            zero: None,
            theta: 1.0,
            theta_std_error: f64::NAN,
            log_theta: 0.0,
            log_theta_std_error: f64::NAN,
            log_likelihood,
            n_parameters,
            n_observations: n,
            iterations: 1,
            converged: true,
            aic: 2.0 * k - 2.0 * log_likelihood,
            bic: k * (n as f64).ln() - 2.0 * log_likelihood,
            separation_adjustments: Vec::new(),
            standardizations: Vec::new(),
            response: vec![0.0; n],
            fitted_mean: vec![1.0; n],
            zero_probability: vec![0.0; n],
            loglik_contributions,
        }
    }
}

impl fmt::Display for FittedZinb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model '{}': {}", self.name, self.spec)?;
        for adjustment in &self.separation_adjustments {
            writeln!(
                f,
                "  dropped '{}' from zero model: {}",
                adjustment.predictor, adjustment.reason
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Count model coefficients (negbin with log link):")?;
        write!(f, "{}", self.count)?;
        writeln!(
            f,
            "Log(theta) {:.5} (SE {:.5}); theta = {:.4}",
            self.log_theta, self.log_theta_std_error, self.theta
        )?;
        if let Some(zero) = &self.zero {
            writeln!(f)?;
            writeln!(f, "Zero-inflation model coefficients (binomial with logit link):")?;
            write!(f, "{zero}")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Log-likelihood: {:.4} on {} Df; AIC {:.3}; BIC {:.3}; {} iterations",
            self.log_likelihood, self.n_parameters, self.aic, self.bic, self.iterations
        )
    }
}

/// Builder for `ZinbRegressor`.
#[derive(Debug, Clone, Default)]
pub struct ZinbRegressorBuilder {
    builder: RegressionOptionsBuilder,
    separation_policy: SeparationPolicy,
}

impl ZinbRegressorBuilder {
    /// Start from existing options.
    pub fn options(mut self, options: RegressionOptions) -> Self {
        self.builder = RegressionOptionsBuilder::from(options);
        self
    }

    /// Set the maximum number of BFGS iterations.
    pub fn max_iterations(mut self, max_iter: usize) -> Self {
        self.builder = self.builder.max_iterations(max_iter);
        self
    }

    /// Set the relative objective tolerance.
    pub fn tolerance(mut self, tol: f64) -> Self {
        self.builder = self.builder.tolerance(tol);
        self
    }

    /// Set the gradient max-norm tolerance.
    pub fn gradient_tolerance(mut self, tol: f64) -> Self {
        self.builder = self.builder.gradient_tolerance(tol);
        self
    }

    /// Set whether to compute standard errors.
    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.builder = self.builder.compute_inference(compute);
        self
    }

    /// Set how separated zero-model predictors are handled.
    pub fn separation_policy(mut self, policy: SeparationPolicy) -> Self {
        self.separation_policy = policy;
        self
    }

    /// Build the regressor. Options are validated at fit time.
    pub fn build(self) -> ZinbRegressor {
        ZinbRegressor::new(self.builder.build_unchecked(), self.separation_policy)
    }
}
