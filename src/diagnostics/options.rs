//! Configuration of the diagnostic engine.

use crate::core::OptionsError;
use serde::Serialize;

/// Variant of the Cameron-Trivedi auxiliary regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DispersionTrafo {
    /// `sqrt(n)·mean(aux)/sd(aux)`, estimate reported as dispersion.
    #[default]
    None,
    /// NB1: `Var = (1 + α)·μ`, aux regressed on a constant.
    Linear,
    /// NB2: `Var = μ + α·μ²`, aux regressed on μ.
    Quadratic,
}

/// Thresholds used by the diagnostic engine.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticOptions {
    /// Significance level of all one- and two-sided tests.
    pub alpha: f64,
    /// Observed/expected zero ratio at which zero inflation is considered.
    pub zero_inflation_ratio: f64,
    /// Level of the Welch and correlation confidence intervals.
    pub confidence_level: f64,
    pub dispersion_trafo: DispersionTrafo,
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            zero_inflation_ratio: 1.5,
            confidence_level: 0.95,
            dispersion_trafo: DispersionTrafo::None,
        }
    }
}

impl DiagnosticOptions {
    /// Create a builder.
    pub fn builder() -> DiagnosticOptionsBuilder {
        DiagnosticOptionsBuilder::default()
    }

    /// Validate the options.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.alpha.is_nan() || self.alpha <= 0.0 || self.alpha >= 1.0 {
            return Err(OptionsError::InvalidAlpha(self.alpha));
        }
        if !self.zero_inflation_ratio.is_finite() || self.zero_inflation_ratio <= 0.0 {
            return Err(OptionsError::InvalidThreshold(self.zero_inflation_ratio));
        }
        if self.confidence_level <= 0.0 || self.confidence_level >= 1.0 {
            return Err(OptionsError::InvalidConfidenceLevel(self.confidence_level));
        }
        Ok(())
    }
}

/// Builder for [`DiagnosticOptions`].
#[derive(Debug, Clone, Default)]
pub struct DiagnosticOptionsBuilder {
    options: DiagnosticOptions,
}

impl DiagnosticOptionsBuilder {
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.options.alpha = alpha;
        self
    }

    pub fn zero_inflation_ratio(mut self, ratio: f64) -> Self {
        self.options.zero_inflation_ratio = ratio;
        self
    }

    pub fn confidence_level(mut self, level: f64) -> Self {
        self.options.confidence_level = level;
        self
    }

    pub fn dispersion_trafo(mut self, trafo: DispersionTrafo) -> Self {
        self.options.dispersion_trafo = trafo;
        self
    }

    /// Build and validate.
    pub fn build(self) -> Result<DiagnosticOptions, OptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let opts = DiagnosticOptions::default();
        assert!(opts.validate().is_ok());
        assert_eq!(opts.dispersion_trafo, DispersionTrafo::None);
    }

    #[test]
    fn test_invalid_alpha() {
        let result = DiagnosticOptions::builder().alpha(0.0).build();
        assert!(matches!(result, Err(OptionsError::InvalidAlpha(_))));
    }

    #[test]
    fn test_invalid_ratio() {
        let result = DiagnosticOptions::builder().zero_inflation_ratio(-1.0).build();
        assert!(matches!(result, Err(OptionsError::InvalidThreshold(_))));
    }
}
