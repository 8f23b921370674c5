//! GLM family abstraction shared by the IRLS solvers.

/// Variance and link functions of a GLM family.
///
/// The IRLS solvers only need these pieces; everything else (weights,
/// deviance) is derived from them.
pub trait GlmFamily {
    /// Variance function V(μ).
    fn variance(&self, mu: f64) -> f64;

    /// Link function g(μ) = η.
    fn link(&self, mu: f64) -> f64;

    /// Inverse link g⁻¹(η) = μ.
    fn link_inverse(&self, eta: f64) -> f64;

    /// Derivative of the link dη/dμ.
    fn link_derivative(&self, mu: f64) -> f64;

    /// Unit deviance d(y, μ).
    fn unit_deviance(&self, y: f64, mu: f64) -> f64;

    /// Starting values of μ for IRLS.
    fn initialize_mu(&self, y: &[f64]) -> Vec<f64>;

    /// IRLS working weight 1 / (V(μ) g'(μ)²).
    fn irls_weight(&self, mu: f64) -> f64 {
        let d = self.link_derivative(mu);
        let w = 1.0 / (self.variance(mu) * d * d);
        w.clamp(1e-10, 1e10)
    }

    /// Total deviance Σ d(y_i, μ_i).
    fn deviance(&self, y: &[f64], mu: &[f64]) -> f64 {
        y.iter()
            .zip(mu.iter())
            .map(|(&yi, &mui)| self.unit_deviance(yi, mui))
            .sum()
    }

    /// Deviance of the intercept-only model.
    fn null_deviance(&self, y: &[f64]) -> f64 {
        let y_mean = y.iter().sum::<f64>() / y.len() as f64;
        y.iter().map(|&yi| self.unit_deviance(yi, y_mean)).sum()
    }
}
