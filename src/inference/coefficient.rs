//! Coefficient inference calculations.

use crate::core::{CoefficientRow, CoefficientTable};
use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Computes inference statistics for regression coefficients.
pub struct CoefficientInference;

impl CoefficientInference {
    /// Standard errors from the diagonal of a covariance matrix.
    ///
    /// Non-positive or non-finite variances give NaN.
    pub fn standard_errors(covariance: &Mat<f64>) -> Col<f64> {
        Col::from_fn(covariance.nrows(), |j| {
            let var = covariance[(j, j)];
            if var.is_finite() && var > 0.0 {
                var.sqrt()
            } else {
                f64::NAN
            }
        })
    }

    /// Compute t (or z) statistics: β_j / SE(β_j).
    pub fn t_statistics(coefficients: &Col<f64>, std_errors: &Col<f64>) -> Col<f64> {
        Col::from_fn(coefficients.nrows(), |j| {
            if std_errors[j].is_nan() || std_errors[j] == 0.0 {
                f64::NAN
            } else {
                coefficients[j] / std_errors[j]
            }
        })
    }

    /// Two-sided p-values from t-statistics with `df` degrees of freedom.
    pub fn p_values(t_statistics: &Col<f64>, df: f64) -> Col<f64> {
        let n = t_statistics.nrows();
        let t_dist = match StudentsT::new(0.0, 1.0, df) {
            Ok(d) if df > 0.0 => d,
            _ => return Col::from_fn(n, |_| f64::NAN),
        };

        Col::from_fn(n, |j| {
            if t_statistics[j].is_nan() {
                f64::NAN
            } else {
                2.0 * (1.0 - t_dist.cdf(t_statistics[j].abs()))
            }
        })
    }

    /// Two-sided p-values from z-statistics (standard normal reference).
    pub fn normal_p_values(z_statistics: &Col<f64>) -> Col<f64> {
        Col::from_fn(z_statistics.nrows(), |j| normal_two_sided(z_statistics[j]))
    }

    /// Wald table for labelled estimates and their covariance.
    ///
    /// Without a covariance matrix every standard error is NaN.
    pub fn wald_table(
        labels: &[String],
        estimates: &[f64],
        covariance: Option<&Mat<f64>>,
    ) -> CoefficientTable {
        let n = estimates.len();
        let beta = Col::from_fn(n, |j| estimates[j]);
        let se = match covariance {
            Some(cov) => Self::standard_errors(cov),
            None => Col::from_fn(n, |_| f64::NAN),
        };
        let z = Self::t_statistics(&beta, &se);
        let p = Self::normal_p_values(&z);

        CoefficientTable {
            rows: (0..n)
                .map(|j| CoefficientRow {
                    term: labels[j].clone(),
                    estimate: beta[j],
                    std_error: se[j],
                    z_value: z[j],
                    p_value: p[j],
                })
                .collect(),
        }
    }
}

/// 2·P(Z > |z|) for a standard normal Z.
pub(crate) fn normal_two_sided(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    Normal::new(0.0, 1.0)
        .map(|d| 2.0 * (1.0 - d.cdf(z.abs())))
        .unwrap_or(f64::NAN)
}

/// P(Z > z) for a standard normal Z.
pub(crate) fn normal_upper_tail(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    Normal::new(0.0, 1.0)
        .map(|d| 1.0 - d.cdf(z))
        .unwrap_or(f64::NAN)
}

/// Standard normal quantile.
pub(crate) fn normal_quantile(p: f64) -> f64 {
    Normal::new(0.0, 1.0)
        .map(|d| d.inverse_cdf(p))
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_errors_from_covariance() {
        let mut cov = Mat::zeros(2, 2);
        cov[(0, 0)] = 4.0;
        cov[(1, 1)] = -1.0;

        let se = CoefficientInference::standard_errors(&cov);
        assert!((se[0] - 2.0).abs() < 1e-12);
        assert!(se[1].is_nan());
    }

    #[test]
    fn test_p_values_t_distribution() {
        let t = Col::from_fn(2, |j| if j == 0 { 0.0 } else { 10.0 });
        let p = CoefficientInference::p_values(&t, 20.0);
        assert!((p[0] - 1.0).abs() < 1e-12);
        assert!(p[1] < 1e-6);
    }

    #[test]
    fn test_wald_table() {
        let labels = vec!["(Intercept)".to_string(), "visits".to_string()];
        let mut cov = Mat::zeros(2, 2);
        cov[(0, 0)] = 0.25;
        cov[(1, 1)] = 0.01;

        let table = CoefficientInference::wald_table(&labels, &[1.0, 0.196], Some(&cov));
        let visits = table.get("visits").unwrap();
        assert!((visits.std_error - 0.1).abs() < 1e-12);
        assert!((visits.z_value - 1.96).abs() < 1e-12);
        assert!((visits.p_value - 0.05).abs() < 1e-3);
    }

    #[test]
    fn test_wald_table_without_covariance() {
        let labels = vec!["(Intercept)".to_string()];
        let table = CoefficientInference::wald_table(&labels, &[0.3], None);
        assert!(table.rows[0].is_undefined());
        assert!(table.rows[0].p_value.is_nan());
    }

    #[test]
    fn test_normal_helpers() {
        assert!((normal_two_sided(1.959964) - 0.05).abs() < 1e-6);
        assert!((normal_upper_tail(1.644854) - 0.05).abs() < 1e-6);
        assert!((normal_quantile(0.975) - 1.959964).abs() < 1e-5);
    }
}
