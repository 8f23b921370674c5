//! Binomial family with the logit link.
//!
//! The zero-inflation sub-model of a ZINB fit is a logistic regression; this
//! family seeds it and provides the logistic helpers shared with the
//! likelihood.

use super::family::GlmFamily;

/// Binomial family for binary outcomes, logit link.
///
/// # Variance Function
///
/// V(μ) = μ(1 - μ)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BinomialFamily;

impl BinomialFamily {
    /// Logistic function 1 / (1 + e^-η).
    pub fn logistic(eta: f64) -> f64 {
        if eta >= 0.0 {
            1.0 / (1.0 + (-eta).exp())
        } else {
            let e = eta.exp();
            e / (1.0 + e)
        }
    }

    /// ln(logistic(η)) without underflow.
    pub fn log_logistic(eta: f64) -> f64 {
        -softplus(-eta)
    }

    /// ln(1 - logistic(η)) without underflow.
    pub fn log_one_minus_logistic(eta: f64) -> f64 {
        -softplus(eta)
    }
}

/// ln(1 + e^x), stable for large |x|.
fn softplus(x: f64) -> f64 {
    if x > 35.0 {
        x
    } else if x < -35.0 {
        x.exp()
    } else {
        x.exp().ln_1p()
    }
}

impl GlmFamily for BinomialFamily {
    fn variance(&self, mu: f64) -> f64 {
        let mu_clamped = mu.clamp(1e-10, 1.0 - 1e-10);
        mu_clamped * (1.0 - mu_clamped)
    }

    fn link(&self, mu: f64) -> f64 {
        let mu_clamped = mu.clamp(1e-10, 1.0 - 1e-10);
        (mu_clamped / (1.0 - mu_clamped)).ln()
    }

    fn link_inverse(&self, eta: f64) -> f64 {
        Self::logistic(eta).clamp(1e-14, 1.0 - 1e-14)
    }

    fn link_derivative(&self, mu: f64) -> f64 {
        let mu_clamped = mu.clamp(1e-10, 1.0 - 1e-10);
        1.0 / (mu_clamped * (1.0 - mu_clamped))
    }

    /// d(y, μ) = 2[y·log(y/μ) + (1-y)·log((1-y)/(1-μ))], with limits at 0 and 1.
    fn unit_deviance(&self, y: f64, mu: f64) -> f64 {
        let mu_clamped = mu.clamp(1e-10, 1.0 - 1e-10);

        let term1 = if y > 1e-10 {
            y * (y / mu_clamped).ln()
        } else {
            0.0
        };

        let term2 = if y < 1.0 - 1e-10 {
            (1.0 - y) * ((1.0 - y) / (1.0 - mu_clamped)).ln()
        } else {
            0.0
        };

        (2.0 * (term1 + term2)).max(0.0)
    }

    /// (y + 0.5) / 2 keeps starting values away from 0 and 1.
    fn initialize_mu(&self, y: &[f64]) -> Vec<f64> {
        y.iter().map(|&yi| (yi + 0.5) / 2.0).collect()
    }
}
