//! Descriptive statistics of the complaint counts and the zero-inflation
//! check.

use super::options::DiagnosticOptions;
use super::DiagnosticError;
use crate::data::Dataset;
use crate::inference::{normal_quantile, normal_upper_tail};
use serde::Serialize;
use std::fmt;

/// Location and spread of the response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountSummary {
    pub n: usize,
    pub mean: f64,
    /// Sample variance with the n - 1 denominator.
    pub variance: f64,
    pub variance_to_mean: f64,
    pub variance_exceeds_mean: bool,
    pub min: u64,
    pub max: u64,
    pub n_zero: usize,
}

/// Summarize the complaint counts.
pub fn summarize_counts(data: &Dataset) -> Result<CountSummary, DiagnosticError> {
    let n = data.len();
    if n < 2 {
        return Err(DiagnosticError::InsufficientData { needed: 2, got: n });
    }

    let counts: Vec<u64> = data.observations().iter().map(|o| o.complaints).collect();
    let mean = counts.iter().map(|&c| c as f64).sum::<f64>() / n as f64;
    let variance = counts
        .iter()
        .map(|&c| (c as f64 - mean).powi(2))
        .sum::<f64>()
        / (n - 1) as f64;

    Ok(CountSummary {
        n,
        mean,
        variance,
        variance_to_mean: if mean > 0.0 { variance / mean } else { f64::NAN },
        variance_exceeds_mean: variance > mean,
        min: counts.iter().copied().min().unwrap_or(0),
        max: counts.iter().copied().max().unwrap_or(0),
        n_zero: counts.iter().filter(|&&c| c == 0).count(),
    })
}

/// Observed zeros compared with a Poisson of the same mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZeroInflationCheck {
    pub observed_zero_fraction: f64,
    /// `exp(-mean)`.
    pub expected_zero_fraction: f64,
    /// Observed over expected; infinite when no zeros are expected.
    pub ratio: f64,
    /// `(observed - expected) / sqrt(expected·(1 - expected)/n)`.
    pub z_score: f64,
    /// One-sided p-value of the z-score.
    pub p_value: f64,
    pub ratio_threshold: f64,
    pub flagged: bool,
}

/// Compare the observed zero proportion against `exp(-mean)`.
///
/// Flags zero inflation when the ratio reaches the configured threshold
/// and the one-sided z-score exceeds the normal critical value.
pub fn zero_inflation_check(
    summary: &CountSummary,
    options: &DiagnosticOptions,
) -> ZeroInflationCheck {
    let n = summary.n as f64;
    let observed = summary.n_zero as f64 / n;
    let expected = (-summary.mean).exp();

    let ratio = if expected > 0.0 {
        observed / expected
    } else {
        f64::INFINITY
    };
    let se = (expected * (1.0 - expected) / n).sqrt();
    let z_score = if se > 0.0 {
        (observed - expected) / se
    } else {
        f64::NAN
    };
    let p_value = normal_upper_tail(z_score);
    let critical = normal_quantile(1.0 - options.alpha);

    ZeroInflationCheck {
        observed_zero_fraction: observed,
        expected_zero_fraction: expected,
        ratio,
        z_score,
        p_value,
        ratio_threshold: options.zero_inflation_ratio,
        flagged: ratio >= options.zero_inflation_ratio && z_score > critical,
    }
}

impl fmt::Display for CountSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "n = {}, mean = {:.4}, variance = {:.4} (ratio {:.3}), range {}..{}, zeros = {}",
            self.n,
            self.mean,
            self.variance,
            self.variance_to_mean,
            self.min,
            self.max,
            self.n_zero
        )
    }
}

impl fmt::Display for ZeroInflationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "zeros: observed {:.3}, expected {:.3} (ratio {:.2}, z = {:.3}, p = {:.4}){}",
            self.observed_zero_fraction,
            self.expected_zero_fraction,
            self.ratio,
            self.z_score,
            self.p_value,
            if self.flagged { " -> zero-inflated" } else { "" }
        )
    }
}
