//! All diagnostics of one dataset, collected into a serializable record.

use super::correlation::{log_count_correlations, CorrelationTest};
use super::dispersion::{dispersion_test, overdispersion_verdict, DispersionTest, OverdispersionVerdict};
use super::group_tests::{compare_by_gender, GroupComparison};
use super::options::DiagnosticOptions;
use super::separation::{detect_separation, SeparationFinding};
use super::summary::{summarize_counts, zero_inflation_check, CountSummary, ZeroInflationCheck};
use super::vif::{collinearity, CollinearityReport};
use super::DiagnosticError;
use crate::core::Predictor;
use crate::data::Dataset;
use log::info;
use serde::Serialize;
use std::fmt;

/// Output of [`run_diagnostics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticReport {
    pub summary: CountSummary,
    pub dispersion: DispersionTest,
    pub overdispersion: OverdispersionVerdict,
    pub zero_inflation: ZeroInflationCheck,
    pub gender_comparison: GroupComparison,
    pub correlations: Vec<CorrelationTest>,
    pub collinearity: CollinearityReport,
    /// Predictors that separate the zero indicator on their own.
    pub separation: Vec<SeparationFinding>,
}

/// Run every diagnostic on `data`. The dataset is not modified.
pub fn run_diagnostics(
    data: &Dataset,
    options: &DiagnosticOptions,
) -> Result<DiagnosticReport, DiagnosticError> {
    options.validate()?;

    let summary = summarize_counts(data)?;
    let dispersion = dispersion_test(data, options)?;
    let overdispersion = overdispersion_verdict(&summary, &dispersion);
    let zero_inflation = zero_inflation_check(&summary, options);

    info!(
        "diagnostics: mean {:.3}, variance {:.3}, overdispersed: {}, zero-inflated: {}",
        summary.mean, summary.variance, overdispersion.overdispersed, zero_inflation.flagged
    );

    Ok(DiagnosticReport {
        dispersion,
        overdispersion,
        zero_inflation,
        gender_comparison: compare_by_gender(data, options)?,
        correlations: log_count_correlations(data, options)?,
        collinearity: collinearity(data)?,
        separation: detect_separation(data, &Predictor::ALL),
        summary,
    })
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Complaint counts ==")?;
        write!(f, "{}", self.summary)?;
        write!(f, "{}", self.dispersion)?;
        writeln!(
            f,
            "overdispersed: {} (negative binomial recommended: {})",
            self.overdispersion.overdispersed, self.overdispersion.recommend_negative_binomial
        )?;
        write!(f, "{}", self.zero_inflation)?;

        writeln!(f, "\n== Gender comparison ==")?;
        write!(f, "{}", self.gender_comparison)?;

        writeln!(f, "\n== Correlation with ln(complaints + 1) ==")?;
        for c in &self.correlations {
            writeln!(f, "{c}")?;
        }

        writeln!(f, "\n== Collinearity ==")?;
        write!(f, "{}", self.collinearity)?;

        if !self.separation.is_empty() {
            writeln!(f, "\n== Separation of the zero indicator ==")?;
            for s in &self.separation {
                writeln!(f, "{s}")?;
            }
        }
        Ok(())
    }
}
