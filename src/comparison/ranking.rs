//! Ranking of candidate fits by information criterion.

use super::criterion::InformationCriterion;
use crate::solvers::{FittedZinb, RegressionError};
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Outcome of fitting one candidate specification.
#[derive(Debug)]
pub struct FitOutcome {
    pub name: String,
    pub result: Result<FittedZinb, RegressionError>,
}

impl FitOutcome {
    pub fn new(name: impl Into<String>, result: Result<FittedZinb, RegressionError>) -> Self {
        Self {
            name: name.into(),
            result,
        }
    }

    pub fn fitted(&self) -> Option<&FittedZinb> {
        self.result.as_ref().ok()
    }
}

/// One row of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedModel {
    /// 1 for the preferred model.
    pub rank: usize,
    pub name: String,
    pub log_likelihood: f64,
    pub n_parameters: usize,
    pub n_observations: usize,
    pub aic: f64,
    pub bic: f64,
    /// Difference to the best model on the ranking criterion.
    pub delta: f64,
    /// Akaike weight `exp(-delta/2)` normalized over the ranked models.
    pub weight: f64,
    pub was_adjusted: bool,
}

/// A candidate left out of the ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedModel {
    pub name: String,
    pub reason: String,
}

/// Candidates ranked ascending by criterion, plus the ones excluded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelComparison {
    pub criterion: InformationCriterion,
    pub ranked: Vec<RankedModel>,
    pub excluded: Vec<ExcludedModel>,
}

impl ModelComparison {
    /// Rank the successful fits among `outcomes`.
    ///
    /// Failed fits are listed with their error message. Fits whose `n`
    /// differs from the most common `n` among successful fits are excluded,
    /// since their criteria are not comparable. Never fails.
    pub fn compare(outcomes: &[FitOutcome], criterion: InformationCriterion) -> Self {
        let mut excluded = Vec::new();
        let mut fits = Vec::new();
        for outcome in outcomes {
            match &outcome.result {
                Ok(fit) => fits.push((outcome.name.as_str(), fit)),
                Err(err) => {
                    warn!("excluding '{}' from comparison: {}", outcome.name, err);
                    excluded.push(ExcludedModel {
                        name: outcome.name.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let reference_n = majority_n(fits.iter().map(|(_, fit)| fit.n_observations));

        let mut rows: Vec<RankedModel> = Vec::with_capacity(fits.len());
        for (name, fit) in fits {
            if Some(fit.n_observations) != reference_n {
                excluded.push(ExcludedModel {
                    name: name.to_string(),
                    reason: format!(
                        "fitted on {} observations, other candidates on {}",
                        fit.n_observations,
                        reference_n.unwrap_or(0)
                    ),
                });
                continue;
            }
            if !fit.log_likelihood.is_finite() {
                excluded.push(ExcludedModel {
                    name: name.to_string(),
                    reason: "log-likelihood is not finite".to_string(),
                });
                continue;
            }
            let (k, n) = (fit.n_parameters, fit.n_observations);
            rows.push(RankedModel {
                rank: 0,
                name: name.to_string(),
                log_likelihood: fit.log_likelihood,
                n_parameters: k,
                n_observations: n,
                aic: InformationCriterion::Aic.compute(fit.log_likelihood, k, n),
                bic: InformationCriterion::Bic.compute(fit.log_likelihood, k, n),
                delta: 0.0,
                weight: 0.0,
                was_adjusted: fit.was_adjusted(),
            });
        }

        let value = |row: &RankedModel| match criterion {
            InformationCriterion::Aic => row.aic,
            InformationCriterion::Bic => row.bic,
        };
        // stable: ties keep the candidate order
        rows.sort_by(|a, b| value(a).total_cmp(&value(b)));

        if let Some(best) = rows.first().map(value) {
            let mut total = 0.0;
            for row in rows.iter_mut() {
                row.delta = value(row) - best;
                row.weight = (-0.5 * row.delta).exp();
                total += row.weight;
            }
            for (i, row) in rows.iter_mut().enumerate() {
                row.rank = i + 1;
                row.weight /= total;
            }
            info!(
                "best model by {}: '{}' ({:.3})",
                criterion, rows[0].name, best
            );
        }

        Self {
            criterion,
            ranked: rows,
            excluded,
        }
    }

    /// The preferred model, if any fit succeeded.
    pub fn best(&self) -> Option<&RankedModel> {
        self.ranked.first()
    }

    pub fn get(&self, name: &str) -> Option<&RankedModel> {
        self.ranked.iter().find(|r| r.name == name)
    }
}

/// Most common value; ties resolved towards the larger `n`.
fn majority_n(values: impl Iterator<Item = usize>) -> Option<usize> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for n in values {
        *counts.entry(n).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(n, count)| (count, n))
        .map(|(n, _)| n)
}

impl fmt::Display for ModelComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .ranked
            .iter()
            .map(|r| r.name.len())
            .chain(self.excluded.iter().map(|e| e.name.len()))
            .max()
            .unwrap_or(5)
            .max(5);

        writeln!(f, "Models ranked by {}:", self.criterion)?;
        writeln!(
            f,
            "{:>4}  {:<width$}  {:>3}  {:>12}  {:>10}  {:>10}  {:>8}  {:>7}",
            "rank", "model", "k", "logLik", "AIC", "BIC", "delta", "weight"
        )?;
        for r in &self.ranked {
            writeln!(
                f,
                "{:>4}  {:<width$}  {:>3}  {:>12.3}  {:>10.3}  {:>10.3}  {:>8.3}  {:>7.4}{}",
                r.rank,
                r.name,
                r.n_parameters,
                r.log_likelihood,
                r.aic,
                r.bic,
                r.delta,
                r.weight,
                if r.was_adjusted { "  (adjusted)" } else { "" }
            )?;
        }
        for e in &self.excluded {
            writeln!(f, "   -  {:<width$}  excluded: {}", e.name, e.reason)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(name: &str, k: usize, per_obs: f64, n: usize) -> FitOutcome {
        FitOutcome::new(name, Ok(FittedZinb::from_likelihood(name, k, vec![per_obs; n])))
    }

    #[test]
    fn test_ranking_and_weights() {
        let outcomes = vec![
            fit("a", 4, -2.0, 50),
            fit("b", 4, -1.9, 50),
            fit("c", 6, -1.9, 50),
        ];
        let cmp = ModelComparison::compare(&outcomes, InformationCriterion::Aic);

        let names: Vec<&str> = cmp.ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
        assert_eq!(cmp.ranked[0].rank, 1);
        assert_eq!(cmp.ranked[0].delta, 0.0);
        // c pays 2 extra parameters
        assert!((cmp.ranked[1].delta - 4.0).abs() < 1e-9);
        let total: f64 = cmp.ranked.iter().map(|r| r.weight).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(cmp.ranked[0].weight > cmp.ranked[1].weight);
    }

    #[test]
    fn test_failures_and_mismatched_n_are_excluded() {
        let outcomes = vec![
            fit("a", 4, -2.0, 50),
            FitOutcome::new(
                "broken",
                Err(RegressionError::ConvergenceFailure {
                    spec: "broken".to_string(),
                    iterations: 3,
                }),
            ),
            fit("b", 4, -1.5, 50),
            fit("short", 4, -1.0, 40),
        ];
        let cmp = ModelComparison::compare(&outcomes, InformationCriterion::Bic);

        assert_eq!(cmp.ranked.len(), 2);
        assert_eq!(cmp.best().map(|r| r.name.as_str()), Some("b"));
        assert_eq!(cmp.excluded.len(), 2);
        assert!(cmp.excluded[0].reason.contains("did not converge"));
        assert_eq!(cmp.excluded[1].name, "short");
    }

    #[test]
    fn test_all_failed() {
        let outcomes = vec![FitOutcome::new(
            "x",
            Err(RegressionError::NumericalError("bad".to_string())),
        )];
        let cmp = ModelComparison::compare(&outcomes, InformationCriterion::Aic);
        assert!(cmp.best().is_none());
        assert_eq!(cmp.excluded.len(), 1);
    }

    #[test]
    fn test_majority_n() {
        assert_eq!(majority_n([50, 40, 50].into_iter()), Some(50));
        assert_eq!(majority_n([40, 50].into_iter()), Some(50));
        assert_eq!(majority_n(std::iter::empty()), None);
    }
}
