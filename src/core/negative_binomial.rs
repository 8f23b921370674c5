//! Negative binomial distribution in the (μ, θ) parameterization.
//!
//! This is the count component of the zero-inflated model.
//!
//! # Example
//!
//! ```ignore
//! use complaint_zinb::core::NegativeBinomialFamily;
//!
//! let nb = NegativeBinomialFamily::new(2.0);
//! // V(5) = 5 + 5²/2 = 17.5
//! let var = nb.variance(5.0);
//! ```

use statrs::function::gamma::{digamma, ln_gamma};

/// Largest count whose pmf is summed term by term.
const RISING_SUM_LIMIT: f64 = 10_000.0;

/// Negative binomial family with size parameter θ (R's `size`).
///
/// - P(Y = y) = Γ(y+θ) / (Γ(θ) y!) · (θ/(θ+μ))^θ · (μ/(θ+μ))^y
/// - V(μ) = μ + μ²/θ
///
/// As θ → ∞ this approaches Poisson.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegativeBinomialFamily {
    /// Size / dispersion parameter. Smaller means more overdispersion.
    pub theta: f64,
}

impl Default for NegativeBinomialFamily {
    fn default() -> Self {
        Self { theta: 1.0 }
    }
}

impl NegativeBinomialFamily {
    /// Create a family with the given θ.
    ///
    /// # Panics
    ///
    /// Panics if `theta` is not strictly positive.
    pub fn new(theta: f64) -> Self {
        assert!(theta > 0.0, "theta must be positive");
        Self { theta }
    }

    /// Variance V(μ) = μ + μ²/θ.
    pub fn variance(&self, mu: f64) -> f64 {
        let mu_safe = mu.max(1e-10);
        mu_safe + mu_safe * mu_safe / self.theta
    }

    /// V(μ)/μ = 1 + μ/θ.
    pub fn overdispersion_ratio(&self, mu: f64) -> f64 {
        1.0 + mu / self.theta
    }

    /// ln P(Y = y).
    ///
    /// Written in terms of ln(1 + x) so that it stays accurate as θ grows
    /// towards the Poisson limit.
    pub fn log_pmf(&self, y: f64, mu: f64) -> f64 {
        let mu = mu.max(1e-300);
        let mut value = self.log_prob_zero(mu);
        if y > 0.0 {
            value += y * mu.ln() - ln_gamma(y + 1.0) + self.log_rising_ratio(y, mu);
        }
        value
    }

    /// ln Γ(y+θ) − ln Γ(θ) − y·ln(θ+μ).
    ///
    /// For integer y up to [`RISING_SUM_LIMIT`] this is Σₖ ln((θ+k)/(θ+μ)),
    /// which avoids the cancellation between two huge ln Γ values.
    fn log_rising_ratio(&self, y: f64, mu: f64) -> f64 {
        let theta = self.theta;
        if y.fract() != 0.0 || y > RISING_SUM_LIMIT {
            return ln_gamma(y + theta) - ln_gamma(theta) - y * (theta + mu).ln();
        }
        (0..y as u64)
            .map(|k| {
                let x = (k as f64 - mu) / (theta + mu);
                if x.abs() < 0.5 {
                    x.ln_1p()
                } else {
                    ((theta + k as f64) / (theta + mu)).ln()
                }
            })
            .sum()
    }

    /// ln P(Y = 0) = θ·ln(θ/(θ+μ)).
    pub fn log_prob_zero(&self, mu: f64) -> f64 {
        -self.theta * (mu.max(0.0) / self.theta).ln_1p()
    }

    /// ∂ ln P(Y = y) / ∂η for the log link η = ln μ.
    pub fn score_eta(&self, y: f64, mu: f64) -> f64 {
        y - mu * (y + self.theta) / (mu + self.theta)
    }

    /// ∂ ln P(Y = y) / ∂θ.
    pub fn score_theta(&self, y: f64, mu: f64) -> f64 {
        let theta = self.theta;
        let base = (theta / (theta + mu)).ln() + 1.0 - (y + theta) / (mu + theta);
        if y > 0.0 {
            base + digamma(y + theta) - digamma(theta)
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variance() {
        let nb = NegativeBinomialFamily::new(2.0);
        assert!((nb.variance(5.0) - 17.5).abs() < 1e-12);
        assert!((nb.overdispersion_ratio(4.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_pmf_sums_to_one() {
        let nb = NegativeBinomialFamily::new(1.7);
        let total: f64 = (0..400).map(|y| nb.log_pmf(y as f64, 3.2).exp()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_large_theta_matches_poisson() {
        // the NB-Poisson gap shrinks like (y² + μ²)/θ
        let nb = NegativeBinomialFamily::new(1e12);
        for &(y, mu) in &[(0.0, 2.5), (3.0, 2.5), (11.0, 0.7)] {
            let poisson = y * f64::ln(mu) - mu - ln_gamma(y + 1.0);
            assert!(
                (nb.log_pmf(y, mu) - poisson).abs() < 1e-9,
                "y = {y}, mu = {mu}: {} vs {poisson}",
                nb.log_pmf(y, mu)
            );
        }
    }

    #[test]
    fn test_small_theta_stays_finite() {
        let nb = NegativeBinomialFamily::new(1e-12);
        let value = nb.log_pmf(4.0, 3.0);
        assert!(value.is_finite());
        let reference = ln_gamma(4.0 + 1e-12) - ln_gamma(1e-12) - ln_gamma(5.0)
            + 1e-12 * (1e-12_f64 / (3.0 + 1e-12)).ln()
            + 4.0 * (3.0_f64 / (3.0 + 1e-12)).ln();
        assert!((value - reference).abs() < 1e-6, "{value} vs {reference}");
    }

    #[test]
    fn test_geometric_case() {
        // θ = 1 is geometric with p = 1/(1+μ)
        let nb = NegativeBinomialFamily::new(1.0);
        let mu = 3.0;
        let expected = 0.25 * 0.75_f64.powi(2);
        assert!((nb.log_pmf(2.0, mu).exp() - expected).abs() < 1e-12);
        assert!((nb.log_prob_zero(mu).exp() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_scores_match_finite_differences() {
        let nb = NegativeBinomialFamily::new(1.3);
        let (y, mu): (f64, f64) = (4.0, 2.2);
        let h = 1e-6;

        let eta = mu.ln();
        let num_eta =
            (nb.log_pmf(y, (eta + h).exp()) - nb.log_pmf(y, (eta - h).exp())) / (2.0 * h);
        assert!((nb.score_eta(y, mu) - num_eta).abs() < 1e-6);

        let up = NegativeBinomialFamily::new(1.3 + h);
        let down = NegativeBinomialFamily::new(1.3 - h);
        let num_theta = (up.log_pmf(y, mu) - down.log_pmf(y, mu)) / (2.0 * h);
        assert!((nb.score_theta(y, mu) - num_theta).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "theta must be positive")]
    fn test_invalid_theta() {
        NegativeBinomialFamily::new(0.0);
    }
}
