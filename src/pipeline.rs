//! End-to-end analysis: load, clean, diagnose, fit every candidate, compare.
//!
//! # Example
//!
//! ```rust,ignore
//! use complaint_zinb::pipeline::{AnalysisPipeline, PipelineConfig};
//!
//! let report = AnalysisPipeline::new(PipelineConfig::default()).run("data/complaints.tsv")?;
//! println!("{report}");
//! ```

use crate::comparison::{
    likelihood_ratio_test, vuong_test, FitOutcome, InformationCriterion, LikelihoodRatioTest,
    ModelComparison, VuongTest,
};
use crate::core::{ModelSpec, OptionsError, RegressionOptions, SeparationPolicy};
use crate::data::{clean, load_tsv, CleaningReport, DataError, Dataset, RawObservation};
use crate::diagnostics::{run_diagnostics, DiagnosticError, DiagnosticOptions, DiagnosticReport};
use crate::solvers::{FittedZinb, ZinbRegressor};
use log::{info, warn};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors that stop the pipeline. Individual fit failures never do.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("invalid options: {0}")]
    Options(#[from] OptionsError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no observations left after cleaning ({0} rows read)")]
    EmptyDataset(usize),

    #[error("diagnostics failed: {0}")]
    Diagnostics(#[from] DiagnosticError),
}

/// Everything the pipeline needs besides the data.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub diagnostics: DiagnosticOptions,
    pub regression: RegressionOptions,
    pub separation_policy: SeparationPolicy,
    pub candidates: Vec<ModelSpec>,
    pub criterion: InformationCriterion,
    /// `(restricted, full)` candidate names tested by likelihood ratio.
    pub nested_pairs: Vec<(String, String)>,
    /// Candidate the best model is tested against with the Vuong test.
    pub vuong_baseline: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            diagnostics: DiagnosticOptions::default(),
            regression: RegressionOptions::default(),
            separation_policy: SeparationPolicy::default(),
            candidates: ModelSpec::report_candidates(),
            criterion: InformationCriterion::Aic,
            nested_pairs: vec![
                ("zero_without_visits".to_string(), "full".to_string()),
                ("reduced".to_string(), "full".to_string()),
            ],
            vuong_baseline: Some("negbin".to_string()),
        }
    }
}

impl PipelineConfig {
    /// Validate every option set and the candidate list.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.diagnostics.validate()?;
        self.regression.validate()?;
        if self.candidates.is_empty() {
            return Err(PipelineError::Config("no candidate models".to_string()));
        }
        for (i, spec) in self.candidates.iter().enumerate() {
            if self.candidates[..i].iter().any(|s| s.name == spec.name) {
                return Err(PipelineError::Config(format!(
                    "candidate name '{}' is used twice",
                    spec.name
                )));
            }
        }
        Ok(())
    }
}

/// Output of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub cleaning: CleaningReport,
    pub diagnostics: DiagnosticReport,
    /// Successful fits in candidate order.
    pub fits: Vec<FittedZinb>,
    pub comparison: ModelComparison,
    pub likelihood_ratio_tests: Vec<LikelihoodRatioTest>,
    pub vuong: Option<VuongTest>,
}

impl AnalysisReport {
    pub fn fit(&self, name: &str) -> Option<&FittedZinb> {
        self.fits.iter().find(|f| f.name == name)
    }

    /// The fit ranked first by the comparator.
    pub fn best_fit(&self) -> Option<&FittedZinb> {
        self.comparison.best().and_then(|r| self.fit(&r.name))
    }
}

/// Runs the stages in order: clean, diagnostics, fitting, comparison.
#[derive(Debug, Clone, Default)]
pub struct AnalysisPipeline {
    config: PipelineConfig,
}

impl AnalysisPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load a TSV file and run the analysis on it.
    pub fn run<P: AsRef<Path>>(&self, path: P) -> Result<AnalysisReport, PipelineError> {
        let path = path.as_ref();
        info!("loading {}", path.display());
        let raw = load_tsv(path)?;
        self.run_raw(raw)
    }

    /// Clean already parsed rows and run the analysis.
    pub fn run_raw(&self, raw: Vec<RawObservation>) -> Result<AnalysisReport, PipelineError> {
        self.config.validate()?;
        let (dataset, cleaning) = clean(raw);
        if dataset.is_empty() {
            return Err(PipelineError::EmptyDataset(cleaning.rows_read));
        }
        info!(
            "kept {} of {} rows ({} dropped)",
            cleaning.rows_kept, cleaning.rows_read, cleaning.rows_dropped
        );
        self.analyze(&dataset, cleaning)
    }

    /// Run the analysis on a cleaned dataset.
    pub fn run_dataset(&self, dataset: &Dataset) -> Result<AnalysisReport, PipelineError> {
        self.config.validate()?;
        if dataset.is_empty() {
            return Err(PipelineError::EmptyDataset(0));
        }
        let cleaning = CleaningReport {
            rows_read: dataset.len(),
            rows_kept: dataset.len(),
            rows_dropped: 0,
        };
        self.analyze(dataset, cleaning)
    }

    fn analyze(
        &self,
        dataset: &Dataset,
        cleaning: CleaningReport,
    ) -> Result<AnalysisReport, PipelineError> {
        let diagnostics = run_diagnostics(dataset, &self.config.diagnostics)?;

        let regressor =
            ZinbRegressor::new(self.config.regression.clone(), self.config.separation_policy);
        let outcomes: Vec<FitOutcome> = self
            .config
            .candidates
            .iter()
            .map(|spec| {
                let result = regressor.fit(dataset, spec);
                if let Err(err) = &result {
                    warn!("candidate '{}' failed: {}", spec.name, err);
                }
                FitOutcome::new(spec.name.clone(), result)
            })
            .collect();

        let comparison = ModelComparison::compare(&outcomes, self.config.criterion);
        let likelihood_ratio_tests = self.nested_tests(&outcomes);
        let vuong = self.vuong_against_baseline(&outcomes, &comparison);

        let fits = outcomes
            .into_iter()
            .filter_map(|o| o.result.ok())
            .collect();

        Ok(AnalysisReport {
            cleaning,
            diagnostics,
            fits,
            comparison,
            likelihood_ratio_tests,
            vuong,
        })
    }

    fn nested_tests(&self, outcomes: &[FitOutcome]) -> Vec<LikelihoodRatioTest> {
        let find = |name: &str| outcomes.iter().find(|o| o.name == name).and_then(|o| o.fitted());

        self.config
            .nested_pairs
            .iter()
            .filter_map(|(restricted, full)| {
                let (r, f) = (find(restricted)?, find(full)?);
                match likelihood_ratio_test(r, f) {
                    Ok(test) => Some(test),
                    Err(err) => {
                        warn!("LR test '{restricted}' vs '{full}' skipped: {err}");
                        None
                    }
                }
            })
            .collect()
    }

    fn vuong_against_baseline(
        &self,
        outcomes: &[FitOutcome],
        comparison: &ModelComparison,
    ) -> Option<VuongTest> {
        let baseline_name = self.config.vuong_baseline.as_deref()?;
        let best_name = comparison.best()?.name.as_str();
        let candidate_name = if best_name != baseline_name {
            best_name
        } else {
            // baseline won; test it against the runner-up instead
            comparison.ranked.get(1)?.name.as_str()
        };

        let find = |name: &str| outcomes.iter().find(|o| o.name == name).and_then(|o| o.fitted());
        let (candidate, baseline) = (find(candidate_name)?, find(baseline_name)?);
        match vuong_test(candidate, baseline) {
            Ok(test) => Some(test),
            Err(err) => {
                warn!("Vuong test '{candidate_name}' vs '{baseline_name}' skipped: {err}");
                None
            }
        }
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Rows read: {}, kept: {}, dropped: {}\n",
            self.cleaning.rows_read, self.cleaning.rows_kept, self.cleaning.rows_dropped
        )?;
        writeln!(f, "{}", self.diagnostics)?;

        for fit in &self.fits {
            writeln!(f, "{fit}")?;
        }

        write!(f, "{}", self.comparison)?;
        for test in &self.likelihood_ratio_tests {
            writeln!(f, "{test}")?;
        }
        if let Some(vuong) = &self.vuong {
            writeln!(f, "{vuong}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_duplicate_candidate_rejected() {
        let config = PipelineConfig {
            candidates: vec![ModelSpec::new("a"), ModelSpec::new("a")],
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = AnalysisPipeline::default().run_raw(Vec::new()).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyDataset(0)));
    }
}
