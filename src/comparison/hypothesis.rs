//! Likelihood-based tests between two fitted models.

use super::ComparisonError;
use crate::inference::normal_upper_tail;
use crate::solvers::FittedZinb;
use crate::utils::mean_and_sd;
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};
use std::fmt;

/// Likelihood-ratio test of a restricted model nested in a full one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LikelihoodRatioTest {
    pub restricted: String,
    pub full: String,
    /// `2·(logL_full - logL_restricted)`, floored at 0.
    pub statistic: f64,
    pub df: usize,
    pub p_value: f64,
}

/// Vuong test of two non-nested models fitted on the same observations.
///
/// Positive statistics favour `first`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VuongTest {
    pub first: String,
    pub second: String,
    pub statistic: f64,
    /// Statistic with the AIC penalty `k1 - k2` subtracted from the sum.
    pub aic_corrected: f64,
    /// Statistic with the BIC penalty `(k1 - k2)·ln(n)/2` subtracted.
    pub bic_corrected: f64,
    /// `P(Z > statistic)`: evidence that `first` is closer to the truth.
    pub p_first_better: f64,
    /// `P(Z < statistic)`: evidence that `second` is closer.
    pub p_second_better: f64,
    pub n: usize,
}

/// Chi-square test with `k_full - k_restricted` degrees of freedom.
///
/// The caller is responsible for the models being nested; only the
/// parameter counts and sample sizes are checked.
pub fn likelihood_ratio_test(
    restricted: &FittedZinb,
    full: &FittedZinb,
) -> Result<LikelihoodRatioTest, ComparisonError> {
    if restricted.n_observations != full.n_observations {
        return Err(ComparisonError::ObservationMismatch {
            first: restricted.n_observations,
            second: full.n_observations,
        });
    }
    if full.n_parameters <= restricted.n_parameters {
        return Err(ComparisonError::NotNested {
            restricted: restricted.n_parameters,
            full: full.n_parameters,
        });
    }

    let df = full.n_parameters - restricted.n_parameters;
    let statistic = (2.0 * (full.log_likelihood - restricted.log_likelihood)).max(0.0);
    let dist =
        ChiSquared::new(df as f64).map_err(|e| ComparisonError::Numerical(e.to_string()))?;

    Ok(LikelihoodRatioTest {
        restricted: restricted.name.clone(),
        full: full.name.clone(),
        statistic,
        df,
        p_value: 1.0 - dist.cdf(statistic),
    })
}

/// Vuong non-nested test from per-observation log-likelihoods.
pub fn vuong_test(first: &FittedZinb, second: &FittedZinb) -> Result<VuongTest, ComparisonError> {
    let l1 = first.loglik_contributions();
    let l2 = second.loglik_contributions();
    if l1.len() != l2.len() {
        return Err(ComparisonError::ObservationMismatch {
            first: l1.len(),
            second: l2.len(),
        });
    }
    let n = l1.len();
    if n < 2 {
        return Err(ComparisonError::Numerical(
            "at least two observations are needed".to_string(),
        ));
    }

    let m: Vec<f64> = l1.iter().zip(l2).map(|(a, b)| a - b).collect();
    let (mean, sd) = mean_and_sd(&m);
    if !(sd.is_finite() && sd > 0.0) {
        return Err(ComparisonError::Numerical(
            "log-likelihood differences have zero variance".to_string(),
        ));
    }

    let nf = n as f64;
    let denom = sd * nf.sqrt();
    let sum = mean * nf;
    let dk = first.n_parameters as f64 - second.n_parameters as f64;
    let statistic = sum / denom;

    Ok(VuongTest {
        first: first.name.clone(),
        second: second.name.clone(),
        statistic,
        aic_corrected: (sum - dk) / denom,
        bic_corrected: (sum - dk * nf.ln() / 2.0) / denom,
        p_first_better: normal_upper_tail(statistic),
        p_second_better: normal_upper_tail(-statistic),
        n,
    })
}

impl fmt::Display for LikelihoodRatioTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LR test '{}' within '{}': chisq = {:.4} on {} df, p = {:.4}",
            self.restricted, self.full, self.statistic, self.df, self.p_value
        )
    }
}

impl fmt::Display for VuongTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vuong test '{}' vs '{}' (n = {}):", self.first, self.second, self.n)?;
        writeln!(
            f,
            "  raw {:.4}  AIC-corrected {:.4}  BIC-corrected {:.4}",
            self.statistic, self.aic_corrected, self.bic_corrected
        )?;
        write!(
            f,
            "  p('{}' better) = {:.4}  p('{}' better) = {:.4}",
            self.first, self.p_first_better, self.second, self.p_second_better
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lr_test() {
        let restricted = FittedZinb::from_likelihood("nb", 4, vec![-2.0; 10]);
        let full = FittedZinb::from_likelihood("zinb", 6, vec![-1.8; 10]);
        let lr = likelihood_ratio_test(&restricted, &full).unwrap();

        assert_eq!(lr.df, 2);
        assert!((lr.statistic - 4.0).abs() < 1e-9);
        // chi-square(2) survival is exp(-x/2)
        assert!((lr.p_value - (-2.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_lr_test_requires_more_parameters() {
        let a = FittedZinb::from_likelihood("a", 4, vec![-2.0; 10]);
        let b = FittedZinb::from_likelihood("b", 4, vec![-1.0; 10]);
        assert!(matches!(
            likelihood_ratio_test(&a, &b),
            Err(ComparisonError::NotNested { .. })
        ));
    }

    #[test]
    fn test_vuong_direction() {
        let first: Vec<f64> = (0..20).map(|i| -1.0 + 0.01 * (i % 3) as f64).collect();
        let second: Vec<f64> = (0..20).map(|i| -1.2 + 0.02 * (i % 4) as f64).collect();
        let a = FittedZinb::from_likelihood("a", 5, first);
        let b = FittedZinb::from_likelihood("b", 5, second);

        let v = vuong_test(&a, &b).unwrap();
        assert!(v.statistic > 0.0);
        assert!(v.p_first_better < 0.05);
        assert!((v.p_first_better + v.p_second_better - 1.0).abs() < 1e-12);
        // equal k: corrections vanish
        assert!((v.aic_corrected - v.statistic).abs() < 1e-12);

        let reversed = vuong_test(&b, &a).unwrap();
        assert!((reversed.statistic + v.statistic).abs() < 1e-12);
    }

    #[test]
    fn test_vuong_identical_models() {
        let a = FittedZinb::from_likelihood("a", 5, vec![-1.0; 10]);
        let b = FittedZinb::from_likelihood("b", 4, vec![-1.0; 10]);
        assert!(matches!(vuong_test(&a, &b), Err(ComparisonError::Numerical(_))));
    }

    #[test]
    fn test_vuong_length_mismatch() {
        let a = FittedZinb::from_likelihood("a", 5, vec![-1.0; 10]);
        let b = FittedZinb::from_likelihood("b", 4, vec![-1.0; 12]);
        assert!(matches!(
            vuong_test(&a, &b),
            Err(ComparisonError::ObservationMismatch { first: 10, second: 12 })
        ));
    }
}
