//! Pearson correlation of each continuous predictor with `ln(complaints + 1)`.

use super::options::DiagnosticOptions;
use super::DiagnosticError;
use crate::core::Predictor;
use crate::data::Dataset;
use crate::inference::normal_quantile;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::fmt;

/// Correlation test for one predictor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationTest {
    pub predictor: Predictor,
    pub r: f64,
    /// `r·sqrt((n-2)/(1-r²))` on `n - 2` degrees of freedom.
    pub t: f64,
    pub df: f64,
    pub p_value: f64,
    /// Fisher-z interval.
    pub conf_low: f64,
    pub conf_high: f64,
}

/// Pearson product-moment correlation; NaN when either input is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len()) as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Test `x` against `y` with a two-sided t-test and a Fisher-z interval.
pub fn correlation_test(
    predictor: Predictor,
    x: &[f64],
    y: &[f64],
    confidence_level: f64,
) -> Result<CorrelationTest, DiagnosticError> {
    let n = x.len();
    if n < 4 {
        return Err(DiagnosticError::InsufficientData { needed: 4, got: n });
    }
    let r = pearson(x, y);
    if r.is_nan() {
        return Err(DiagnosticError::ZeroVariance(predictor.to_string()));
    }

    let df = (n - 2) as f64;
    let (t, p_value) = if r.abs() < 1.0 {
        let t = r * (df / (1.0 - r * r)).sqrt();
        let dist =
            StudentsT::new(0.0, 1.0, df).map_err(|e| DiagnosticError::Numerical(e.to_string()))?;
        (t, 2.0 * (1.0 - dist.cdf(t.abs())))
    } else {
        (r.signum() * f64::INFINITY, 0.0)
    };

    let z = r.atanh();
    let half_width =
        normal_quantile(1.0 - (1.0 - confidence_level) / 2.0) / ((n - 3) as f64).sqrt();

    Ok(CorrelationTest {
        predictor,
        r,
        t,
        df,
        p_value,
        conf_low: (z - half_width).tanh(),
        conf_high: (z + half_width).tanh(),
    })
}

/// Correlate every continuous predictor with the log-transformed counts.
pub fn log_count_correlations(
    data: &Dataset,
    options: &DiagnosticOptions,
) -> Result<Vec<CorrelationTest>, DiagnosticError> {
    let log_counts: Vec<f64> = data
        .observations()
        .iter()
        .map(|o| (o.complaints as f64).ln_1p())
        .collect();

    Predictor::CONTINUOUS
        .iter()
        .map(|&predictor| {
            let values: Vec<f64> = data
                .observations()
                .iter()
                .map(|o| predictor.value(o))
                .collect();
            correlation_test(predictor, &values, &log_counts, options.confidence_level)
        })
        .collect()
}

impl fmt::Display for CorrelationTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<8} r = {:>7.4}  t = {:>7.3}  p = {:.4}  CI [{:.3}, {:.3}]",
            self.predictor.name(),
            self.r,
            self.t,
            self.p_value,
            self.conf_low,
            self.conf_high
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson_perfect() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
        assert!(pearson(&x, &[1.0; 4]).is_nan());
    }

    #[test]
    fn test_correlation_against_reference() {
        // R: cor.test(1:6, c(2, 1, 4, 3, 7, 5))
        // r = 0.7918, t = 2.5927, df = 4, p = 0.06051, CI [-0.0553, 0.9761]
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [2.0, 1.0, 4.0, 3.0, 7.0, 5.0];
        let test = correlation_test(Predictor::Visits, &x, &y, 0.95).unwrap();

        assert!((test.r - 0.7918).abs() < 1e-4);
        assert!((test.t - 2.5927).abs() < 1e-4);
        assert!((test.p_value - 0.06051).abs() < 1e-4);
        assert!((test.conf_low + 0.0553).abs() < 1e-3);
        assert!((test.conf_high - 0.9761).abs() < 1e-3);
    }

    #[test]
    fn test_constant_predictor_rejected() {
        let err = correlation_test(Predictor::Hours, &[1.0; 5], &[1.0, 2.0, 3.0, 4.0, 5.0], 0.95)
            .unwrap_err();
        assert!(matches!(err, DiagnosticError::ZeroVariance(_)));
    }
}
