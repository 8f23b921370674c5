//! Information criteria used to rank fitted models.

use serde::Serialize;
use std::fmt;

/// Information criterion type for model ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum InformationCriterion {
    /// Akaike Information Criterion
    #[default]
    Aic,
    /// Bayesian Information Criterion
    Bic,
}

impl InformationCriterion {
    /// Compute the criterion from a total log-likelihood.
    ///
    /// # Arguments
    /// * `log_lik` - Log-likelihood of the whole sample
    /// * `k` - Number of parameters in the model
    /// * `n` - Number of observations (BIC penalty)
    pub fn compute(&self, log_lik: f64, k: usize, n: usize) -> f64 {
        let k_f = k as f64;
        match self {
            InformationCriterion::Aic => 2.0 * k_f - 2.0 * log_lik,
            InformationCriterion::Bic => k_f * (n as f64).ln() - 2.0 * log_lik,
        }
    }
}

impl std::str::FromStr for InformationCriterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aic" => Ok(InformationCriterion::Aic),
            "bic" => Ok(InformationCriterion::Bic),
            other => Err(format!("unknown criterion '{other}' (expected aic or bic)")),
        }
    }
}

impl fmt::Display for InformationCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InformationCriterion::Aic => write!(f, "AIC"),
            InformationCriterion::Bic => write!(f, "BIC"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute() {
        assert!((InformationCriterion::Aic.compute(-100.0, 5, 50) - 210.0).abs() < 1e-12);
        let bic = InformationCriterion::Bic.compute(-100.0, 5, 50);
        assert!((bic - (5.0 * 50f64.ln() + 200.0)).abs() < 1e-12);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("AIC".parse::<InformationCriterion>(), Ok(InformationCriterion::Aic));
        assert_eq!(" bic ".parse::<InformationCriterion>(), Ok(InformationCriterion::Bic));
        assert!("aicc".parse::<InformationCriterion>().is_err());
    }
}
