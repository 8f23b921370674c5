//! Fitting options and configuration.

use serde::Serialize;
use thiserror::Error;

/// What to do when a zero-model predictor perfectly separates zero from
/// non-zero outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SeparationPolicy {
    /// Remove the predictor (and interactions using it) from the zero model,
    /// keeping it in the count model.
    #[default]
    DropFromZeroModel,
    /// Refuse to fit.
    Fail,
    /// Fit as specified. Affected coefficients diverge.
    Ignore,
}

impl std::str::FromStr for SeparationPolicy {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" | "drop-from-zero-model" => Ok(SeparationPolicy::DropFromZeroModel),
            "fail" => Ok(SeparationPolicy::Fail),
            "ignore" => Ok(SeparationPolicy::Ignore),
            other => Err(OptionsError::UnknownSeparationPolicy(other.to_string())),
        }
    }
}

/// Configuration options for the regression solvers.
#[derive(Debug, Clone, Serialize)]
pub struct RegressionOptions {
    /// Whether to include an intercept term (default: true).
    pub with_intercept: bool,
    /// Whether to compute standard errors and inference statistics (default: true).
    pub compute_inference: bool,
    /// Confidence level for intervals (default: 0.95).
    pub confidence_level: f64,
    /// Maximum iterations for iterative solvers (default: 1000).
    pub max_iterations: usize,
    /// Convergence tolerance: coefficient change for IRLS, relative
    /// objective change for BFGS (default: 1e-8).
    pub tolerance: f64,
    /// Gradient max-norm at which BFGS stops (default: 1e-6).
    pub gradient_tolerance: f64,
    /// Rank tolerance for QR decomposition.
    pub rank_tolerance: f64,
}

impl Default for RegressionOptions {
    fn default() -> Self {
        Self {
            with_intercept: true,
            compute_inference: true,
            confidence_level: 0.95,
            max_iterations: 1000,
            tolerance: 1e-8,
            gradient_tolerance: 1e-6,
            rank_tolerance: 1e-10,
        }
    }
}

/// Errors that can occur when validating options.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("confidence_level must be in (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),
    #[error("tolerance must be positive, got {0}")]
    InvalidTolerance(f64),
    #[error("max_iterations must be at least 1, got {0}")]
    InvalidMaxIterations(usize),
    #[error("significance level must be in (0, 1), got {0}")]
    InvalidAlpha(f64),
    #[error("threshold must be positive, got {0}")]
    InvalidThreshold(f64),
    #[error("unknown separation policy '{0}' (expected drop, fail or ignore)")]
    UnknownSeparationPolicy(String),
}

impl RegressionOptions {
    /// Create a new builder for regression options.
    pub fn builder() -> RegressionOptionsBuilder {
        RegressionOptionsBuilder::default()
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.confidence_level <= 0.0 || self.confidence_level >= 1.0 {
            return Err(OptionsError::InvalidConfidenceLevel(self.confidence_level));
        }
        if self.tolerance <= 0.0 {
            return Err(OptionsError::InvalidTolerance(self.tolerance));
        }
        if self.gradient_tolerance <= 0.0 {
            return Err(OptionsError::InvalidTolerance(self.gradient_tolerance));
        }
        if self.max_iterations < 1 {
            return Err(OptionsError::InvalidMaxIterations(self.max_iterations));
        }
        Ok(())
    }
}

/// Builder for `RegressionOptions`.
#[derive(Debug, Clone, Default)]
pub struct RegressionOptionsBuilder {
    options: RegressionOptions,
}

impl RegressionOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to include an intercept term.
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.options.with_intercept = include;
        self
    }

    /// Set whether to compute inference statistics.
    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.options.compute_inference = compute;
        self
    }

    /// Set the confidence level for intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.options.confidence_level = level;
        self
    }

    /// Set the maximum iterations for iterative solvers.
    pub fn max_iterations(mut self, max_iter: usize) -> Self {
        self.options.max_iterations = max_iter;
        self
    }

    /// Set the convergence tolerance.
    pub fn tolerance(mut self, tol: f64) -> Self {
        self.options.tolerance = tol;
        self
    }

    /// Set the gradient tolerance for BFGS.
    pub fn gradient_tolerance(mut self, tol: f64) -> Self {
        self.options.gradient_tolerance = tol;
        self
    }

    /// Set the rank tolerance for QR decomposition.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.options.rank_tolerance = tol;
        self
    }

    /// Build and validate the options.
    pub fn build(self) -> Result<RegressionOptions, OptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }

    /// Build the options without validation.
    pub fn build_unchecked(self) -> RegressionOptions {
        self.options
    }
}

impl From<RegressionOptions> for RegressionOptionsBuilder {
    fn from(options: RegressionOptions) -> Self {
        Self { options }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = RegressionOptions::default();
        assert!(opts.with_intercept);
        assert!(opts.compute_inference);
        assert!((opts.confidence_level - 0.95).abs() < 1e-10);
        assert_eq!(opts.max_iterations, 1000);
    }

    #[test]
    fn test_builder() {
        let opts = RegressionOptions::builder()
            .with_intercept(false)
            .max_iterations(50)
            .build()
            .unwrap();

        assert!(!opts.with_intercept);
        assert_eq!(opts.max_iterations, 50);
    }

    #[test]
    fn test_validation_invalid_confidence() {
        let result = RegressionOptions::builder().confidence_level(1.5).build();
        assert!(matches!(result, Err(OptionsError::InvalidConfidenceLevel(_))));
    }

    #[test]
    fn test_validation_invalid_tolerance() {
        let result = RegressionOptions::builder().tolerance(0.0).build();
        assert!(matches!(result, Err(OptionsError::InvalidTolerance(_))));
    }

    #[test]
    fn test_validation_invalid_max_iterations() {
        let result = RegressionOptions::builder().max_iterations(0).build();
        assert!(matches!(result, Err(OptionsError::InvalidMaxIterations(0))));
    }

    #[test]
    fn test_separation_policy_from_str() {
        assert_eq!(
            "drop".parse::<SeparationPolicy>().unwrap(),
            SeparationPolicy::DropFromZeroModel
        );
        assert_eq!("FAIL".parse::<SeparationPolicy>().unwrap(), SeparationPolicy::Fail);
        assert!("sometimes".parse::<SeparationPolicy>().is_err());
    }
}
