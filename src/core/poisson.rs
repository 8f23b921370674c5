//! Poisson family with the canonical log link.
//!
//! Used by the dispersion test and to seed the count sub-model of a ZINB fit.

use super::family::GlmFamily;

/// Poisson family for count data, log link.
///
/// # Variance Function
///
/// V(μ) = μ
///
/// # Unit Deviance
///
/// d(y, μ) = 2[y·log(y/μ) - (y - μ)], with d(0, μ) = 2μ.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoissonFamily;

impl PoissonFamily {
    /// Log-probability of `y` under Poisson(μ).
    pub fn log_pmf(y: f64, mu: f64) -> f64 {
        let mu = mu.max(1e-300);
        y * mu.ln() - mu - statrs::function::gamma::ln_gamma(y + 1.0)
    }
}

impl GlmFamily for PoissonFamily {
    fn variance(&self, mu: f64) -> f64 {
        mu.max(1e-10)
    }

    fn link(&self, mu: f64) -> f64 {
        mu.max(1e-10).ln()
    }

    fn link_inverse(&self, eta: f64) -> f64 {
        eta.clamp(-30.0, 30.0).exp().max(1e-14)
    }

    fn link_derivative(&self, mu: f64) -> f64 {
        1.0 / mu.max(1e-10)
    }

    fn unit_deviance(&self, y: f64, mu: f64) -> f64 {
        let mu_clamped = mu.max(1e-10);

        if y < 1e-10 {
            2.0 * mu_clamped
        } else {
            2.0 * (y * (y / mu_clamped).ln() - (y - mu_clamped))
        }
    }

    /// Uses (y + ȳ) / 2 to keep starting values positive.
    fn initialize_mu(&self, y: &[f64]) -> Vec<f64> {
        let y_mean = y.iter().sum::<f64>() / y.len() as f64;
        let y_mean = y_mean.max(1e-3);

        y.iter()
            .map(|&yi| ((yi + y_mean) / 2.0).max(1e-3))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variance_and_link() {
        let family = PoissonFamily;
        assert_eq!(family.variance(3.0), 3.0);
        assert!((family.link_inverse(family.link(2.5)) - 2.5).abs() < 1e-12);
        assert!((family.irls_weight(4.0) - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_unit_deviance() {
        let family = PoissonFamily;
        assert!(family.unit_deviance(3.0, 3.0).abs() < 1e-12);
        assert!((family.unit_deviance(0.0, 1.5) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_log_pmf() {
        // P(Y = 2 | μ = 1) = e^-1 / 2
        let expected = (-1.0_f64).exp() / 2.0;
        assert!((PoissonFamily::log_pmf(2.0, 1.0).exp() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_null_deviance() {
        let family = PoissonFamily;
        let y = [2.0, 2.0, 2.0];
        assert!(family.null_deviance(&y).abs() < 1e-12);
    }
}
